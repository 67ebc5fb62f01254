//! Serialization Adapter
//!
//! JSON encoding of stored values. Missing payloads decode to `None`.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, StoreError};

/// Encodes a value to its stored JSON form.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a stored payload.
///
/// `key` is only used to label a decoding failure.
pub fn decode<T: DeserializeOwned>(key: &str, raw: Option<&str>) -> Result<Option<T>> {
    raw.map(|raw| decode_present(key, raw)).transpose()
}

/// Decodes a payload known to exist.
pub fn decode_present<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| StoreError::Deserialization {
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    #[test]
    fn test_decode_missing_is_none() {
        let decoded: Option<Value> = decode("k", None).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_decode_json_null_is_some_null() {
        let decoded: Option<Value> = decode("k", Some("null")).unwrap();
        assert_eq!(decoded, Some(Value::Null));
    }

    #[test]
    fn test_decode_invalid_payload() {
        let result: Result<Option<Value>> = decode("ns^books", Some("not json"));
        match result {
            Err(StoreError::Deserialization { key, .. }) => assert_eq!(key, "ns^books"),
            other => panic!("expected deserialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_nested() {
        let value = json!({"title": "Dune", "tags": ["sf", 1965]});
        let raw = encode(&value).unwrap();
        let back: Option<Value> = decode("k", Some(&raw)).unwrap();
        assert_eq!(back, Some(value));
    }

    fn json_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[ -~]{0,32}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map("[a-z]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_json_values_survive_encoding(value in json_strategy()) {
            let raw = encode(&value).unwrap();
            let back: Option<Value> = decode("k", Some(&raw)).unwrap();
            prop_assert_eq!(back, Some(value));
        }
    }
}
