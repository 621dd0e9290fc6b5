use serde_json::{Map, Value};

/// A record from either backing source.
///
/// Schemas are not modeled structurally: both the record store and the
/// contracts API return wide government-data rows, and only a configurable
/// subset of fields is ever read. A missing field reads as `None`.
pub type Record = Map<String, Value>;

/// Resolve a dot-notation path against a record.
///
/// Path segments traverse nested objects; a numeric segment indexes into an
/// array (e.g. `transactions.0.action_date`). Returns `None` when any segment
/// is absent or the value shape does not allow further descent.
pub fn nested_value<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = record.get(first)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}
