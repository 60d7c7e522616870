// src/record/raw.rs

//! Raw record layouts as stored by each provider
//!
//! Fields are optional here so that canonicalization can report exactly
//! which required field is missing instead of failing inside serde.

use serde::Deserialize;
use serde_json::Value;

/// Item record from the legacy provider
#[derive(Debug, Clone, Deserialize)]
pub struct MidasRecord {
    pub item_id: Option<Value>,
    pub name: Option<String>,
    pub arch: Option<String>,
    /// Number or numeric string
    pub revision: Option<Value>,
    pub os: Option<String>,
    pub codebase: Option<String>,
    pub package: Option<String>,
    pub date_creation: Option<String>,
    pub checkoutdate: Option<String>,
    pub productname: Option<String>,
    pub release: Option<String>,
    pub pre_release: Option<Value>,
    #[serde(default)]
    pub bitstreams: Vec<MidasBitstream>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MidasBitstream {
    pub bitstream_id: Option<Value>,
    pub size: Option<Value>,
    pub md5: Option<String>,
}

/// Item record from the current provider
#[derive(Debug, Clone, Deserialize)]
pub struct GirderRecord {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub size: Option<Value>,
    pub created: Option<String>,
    #[serde(rename = "folderId")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub meta: GirderMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GirderMeta {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub revision: Option<Value>,
    pub build_date: Option<String>,
    pub release: Option<String>,
    pub pre_release: Option<Value>,
    #[serde(rename = "baseName")]
    pub base_name: Option<String>,
    pub version: Option<String>,
    pub sha512: Option<String>,
}

/// Integer held either as a JSON number or as decimal text
pub(crate) fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean held as a JSON bool, number, or text such as `"False"`
pub(crate) fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => super::parse_bool(s),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_as_i64() {
        assert_eq!(value_as_i64(&json!(31337)), Some(31337));
        assert_eq!(value_as_i64(&json!("31337")), Some(31337));
        assert_eq!(value_as_i64(&json!(" 42 ")), Some(42));
        assert_eq!(value_as_i64(&json!("r42")), None);
        assert_eq!(value_as_i64(&json!(1.5)), None);
        assert_eq!(value_as_i64(&Value::Null), None);
    }

    #[test]
    fn test_value_as_bool() {
        assert!(value_as_bool(&json!(true)));
        assert!(value_as_bool(&json!("True")));
        assert!(value_as_bool(&json!(1)));
        assert!(!value_as_bool(&json!("False")));
        assert!(!value_as_bool(&json!(0)));
        assert!(!value_as_bool(&Value::Null));
    }

    #[test]
    fn test_girder_record_without_meta() {
        let record: GirderRecord = serde_json::from_value(json!({"_id": "abc"})).unwrap();
        assert_eq!(record.id.as_deref(), Some("abc"));
        assert!(record.meta.os.is_none());
    }
}
