//! Custom deserializers for flexible site payload parsing.
//!
//! Dashboards send site records in whatever shape their data files use, so
//! identifiers and hints arrive as numbers or strings. These helpers accept
//! both while keeping the typed record strict about what it stores.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a site identifier given either as a string or a number.
///
/// # Accepted Formats
///
/// * **String**: `"DAL-0042"` → `"DAL-0042"` (blank strings give `None`)
/// * **Integer / float**: `42` → `"42"`
/// * **Anything else**: `None`
pub fn site_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Deserializes a list of site identifiers, keeping one entry per element.
///
/// Strings and numbers go through [`site_id`]; other elements keep their JSON
/// text so the list length is preserved. `null` becomes an empty list.
pub fn de_site_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .iter()
        .map(|v| site_id(v).unwrap_or_else(|| v.to_string()))
        .collect())
}

/// Interpret a JSON value as a finite number, accepting numeric strings.
pub fn numeric_value(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Loose truthiness for optional context blobs like `sectorInfo`: null, false, 0, "" and empty containers are falsy.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
