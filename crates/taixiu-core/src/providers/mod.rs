use crate::errors::FetchError;
use async_trait::async_trait;
use serde_json::Value;

/// Upstream source of raw round records.
#[async_trait]
pub trait RoundFeed: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Value>, FetchError>;
    fn feed_name(&self) -> &str;
}

const WRAPPER_KEYS: &[&str] = &["data", "list", "history", "items", "results"];

/// Unwraps the record list from an upstream payload.
///
/// Accepts a bare array, an object wrapping the array under a known key, or a
/// single record object.
pub fn extract_records(payload: Value) -> Result<Vec<Value>, FetchError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => {
            for key in WRAPPER_KEYS {
                match obj.remove(*key) {
                    Some(Value::Array(items)) => return Ok(items),
                    Some(Value::Object(inner)) => return Ok(vec![Value::Object(inner)]),
                    Some(other) => {
                        obj.insert((*key).to_string(), other);
                    }
                    None => {}
                }
            }
            Ok(vec![Value::Object(obj)])
        }
        other => Err(FetchError::Decode {
            message: format!("expected array or object, got {}", kind(&other)),
        }),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub mod http;
pub mod replay;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_shapes() {
        assert_eq!(extract_records(json!([{"id": 1}, {"id": 2}])).unwrap().len(), 2);
        assert_eq!(
            extract_records(json!({"data": [{"id": 1}], "ok": true}))
                .unwrap()
                .len(),
            1
        );
        let single = extract_records(json!({"phien": 9, "dice": [1, 2, 3]})).unwrap();
        assert_eq!(single[0]["phien"], 9);

        let nested = extract_records(json!({"data": {"id": 4}})).unwrap();
        assert_eq!(nested[0]["id"], 4);
    }

    #[test]
    fn test_extract_rejects_scalars() {
        assert!(matches!(
            extract_records(json!("nope")),
            Err(FetchError::Decode { .. })
        ));
        assert!(extract_records(Value::Null).is_err());
    }
}
