use serde::Serialize;

/// Query parameters for the contracts API award endpoint.
///
/// Every field is optional; unset fields are omitted from the query string
/// entirely (absence adds no constraint). Pagination and the API key are
/// appended by the client, not carried here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AwardParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awardee_key: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awardee_key_parent: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awardee_uei: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awardee_uei_parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awarding_agency_key: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_agency_key: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naics_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_award_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psc_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_key: Option<i64>,
}

/// Query parameters for the contracts API opportunity endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpportunityParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_key: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opp_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_key: Option<String>,
}
