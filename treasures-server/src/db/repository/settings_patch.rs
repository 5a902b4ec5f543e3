//! Settings patch normalization
//!
//! Turns an incoming partial document into a nested object that can be
//! merged onto the stored settings:
//! - dotted keys (`"facebook.enabled"`) become nested objects
//! - `fontSize` / `titleSize` values become integers
//! - server-owned fields (`updatedAt`) are dropped
//! - keys that are not part of the settings schema are rejected

use serde_json::{Map, Value};
use shared::models::{LogoSettings, SettingsDocument, merge_json};
use shared::{AppError, AppResult, ErrorCode};

/// Fields stored as integers that the admin form sends as text
const INTEGER_FIELDS: &[&str] = &["fontSize", "titleSize"];

/// Top-level fields written by the server, ignored when sent back
const SERVER_OWNED_FIELDS: &[&str] = &["updatedAt"];

/// Normalize a raw patch. Fails without side effects on the first bad field.
pub fn normalize_patch(patch: &Value) -> AppResult<Value> {
    let Value::Object(map) = patch else {
        return Err(invalid("Settings patch must be a JSON object"));
    };
    let mut expanded = expand_object(map, "")?;
    if let Value::Object(fields) = &mut expanded {
        fields.retain(|key, _| !SERVER_OWNED_FIELDS.contains(&key.as_str()));
    }
    check_known_fields(&expanded, &schema_template(), "")?;
    Ok(expanded)
}

fn expand_object(map: &Map<String, Value>, path: &str) -> AppResult<Value> {
    let mut out = Value::Object(Map::new());
    for (raw_key, raw_value) in map {
        let segments: Vec<&str> = raw_key.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid(format!("Invalid settings key '{}'", join(path, raw_key))));
        }
        let full_path = join(path, raw_key);
        let leaf = segments[segments.len() - 1];

        let value = match raw_value {
            Value::Object(inner) => expand_object(inner, &full_path)?,
            other if INTEGER_FIELDS.contains(&leaf) => coerce_integer(other, &full_path)?,
            other => other.clone(),
        };

        // "a.b": v  ->  {"a": {"b": v}}
        let nested = segments
            .iter()
            .rev()
            .fold(value, |acc, segment| {
                Value::Object(Map::from_iter([(segment.to_string(), acc)]))
            });
        merge_json(&mut out, &nested);
    }
    Ok(out)
}

/// Numbers are truncated, numeric strings parsed
fn coerce_integer(value: &Value, path: &str) -> AppResult<Value> {
    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
        }
        _ => None,
    };
    parsed.map(Value::from).ok_or_else(|| {
        invalid(format!("'{}' must be a non-negative integer", path)).with_detail("field", path)
    })
}

/// Default document plus an example logo, so optional sections are known
fn schema_template() -> Value {
    let mut template = SettingsDocument::default_value();
    if let (Value::Object(map), Ok(logo)) = (
        &mut template,
        serde_json::to_value(LogoSettings::default()),
    ) {
        map.insert("logo".to_string(), logo);
    }
    template
}

fn check_known_fields(patch: &Value, template: &Value, path: &str) -> AppResult<()> {
    let (Value::Object(patch_map), Value::Object(template_map)) = (patch, template) else {
        return Ok(());
    };
    for (key, value) in patch_map {
        let full_path = join(path, key);
        match template_map.get(key) {
            Some(Value::Object(_)) if !value.is_object() => {
                return Err(invalid(format!("'{}' must be an object", full_path))
                    .with_detail("field", full_path));
            }
            Some(expected) => check_known_fields(value, expected, &full_path)?,
            None => {
                return Err(invalid(format!("Unknown settings field '{}'", full_path))
                    .with_detail("field", full_path));
            }
        }
    }
    Ok(())
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::SettingsInvalid, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dotted_social_key_is_nested() {
        let patch = json!({ "footer": { "socialMedia": { "facebook.enabled": true } } });
        let normalized = normalize_patch(&patch).unwrap();
        assert_eq!(
            normalized,
            json!({ "footer": { "socialMedia": { "facebook": { "enabled": true } } } })
        );
    }

    #[test]
    fn test_dotted_top_level_path() {
        let patch = json!({ "texts.header.text": "Hi", "texts.header.color": "#fff" });
        let normalized = normalize_patch(&patch).unwrap();
        assert_eq!(
            normalized,
            json!({ "texts": { "header": { "text": "Hi", "color": "#fff" } } })
        );
    }

    #[test]
    fn test_font_size_coercion() {
        let patch = json!({
            "texts": {
                "header": { "fontSize": "24" },
                "heading": { "fontSize": 30.9 },
                "about": { "titleSize": " 18 " }
            }
        });
        let normalized = normalize_patch(&patch).unwrap();
        assert_eq!(normalized["texts"]["header"]["fontSize"], json!(24));
        assert_eq!(normalized["texts"]["heading"]["fontSize"], json!(30));
        assert_eq!(normalized["texts"]["about"]["titleSize"], json!(18));
    }

    #[test]
    fn test_unparsable_font_size_rejected() {
        let patch = json!({ "texts": { "header": { "fontSize": "large" } } });
        let err = normalize_patch(&patch).unwrap_err();
        assert_eq!(err.code, ErrorCode::SettingsInvalid);

        let negative = json!({ "texts": { "header": { "fontSize": -3 } } });
        assert!(normalize_patch(&negative).is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = normalize_patch(&json!({ "colour": "red" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::SettingsInvalid);

        let nested = json!({ "footer": { "socialMedia": { "myspace.enabled": true } } });
        assert!(normalize_patch(&nested).is_err());
    }

    #[test]
    fn test_server_owned_fields_dropped() {
        let patch = json!({ "updatedAt": 1_700_000_000_000_i64, "autoplay": false });
        let normalized = normalize_patch(&patch).unwrap();
        assert!(normalized.get("updatedAt").is_none());
        assert_eq!(normalized["autoplay"], false);
    }

    #[test]
    fn test_section_must_stay_object() {
        let err = normalize_patch(&json!({ "effects": true })).unwrap_err();
        assert_eq!(err.code, ErrorCode::SettingsInvalid);
    }

    #[test]
    fn test_logo_section_accepted() {
        let patch = json!({ "logo": { "enabled": true, "path": "/api/blob/logo.png" } });
        assert!(normalize_patch(&patch).is_ok());
    }

    #[test]
    fn test_non_object_patch_rejected() {
        assert!(normalize_patch(&json!([1, 2])).is_err());
        assert!(normalize_patch(&json!("x")).is_err());
    }

    #[test]
    fn test_empty_key_segment_rejected() {
        assert!(normalize_patch(&json!({ "texts..header": {} })).is_err());
    }
}
