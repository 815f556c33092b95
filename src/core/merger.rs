//! Merges query-string, path and body parameters into one argument bag
//!
//! Sources are applied in a fixed order and later sources overwrite earlier
//! ones at the same key: query < path < body. Two bags are built side by side:
//! the argument bag itself and an `input` bag that collects everything for
//! operations taking a single `input` object. The `input` bag always ends up
//! under the `input` key of the argument bag, even when empty.

use crate::core::error::RequestError;
use crate::core::value::{ParamValue, ParameterBag};
use indexmap::IndexMap;
use serde_json::Value;

/// Key whose object value is flattened into the `input` bag
pub const INPUT_KEY: &str = "input";

/// Stateless parameter merger
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterMerger;

impl ParameterMerger {
    /// Merge raw request parts into an argument bag
    ///
    /// `body` is the raw request body. An empty (or whitespace-only) body is
    /// treated as `{}`; anything else must decode as a JSON object.
    pub fn merge(
        query_pairs: &[(String, String)],
        path_params: &[(String, String)],
        body: &[u8],
    ) -> Result<ParameterBag, RequestError> {
        let body = decode_body(body)?;
        Ok(Self::merge_decoded(query_pairs, path_params, body))
    }

    /// Merge with an already decoded body object
    pub fn merge_decoded(
        query_pairs: &[(String, String)],
        path_params: &[(String, String)],
        body: serde_json::Map<String, Value>,
    ) -> ParameterBag {
        let mut query_bag = ParameterBag::new();
        let mut input_bag = ParameterBag::new();

        // repeated keys are joined with ','
        let mut joined: IndexMap<&str, String> = IndexMap::new();
        for (key, value) in query_pairs {
            joined
                .entry(key.as_str())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        for (key, value) in joined {
            set_both(&mut query_bag, &mut input_bag, key, ParamValue::string(value));
        }

        for (key, value) in path_params {
            set_both(&mut query_bag, &mut input_bag, key, ParamValue::string(value.as_str()));
        }

        for (key, value) in body {
            if key == INPUT_KEY {
                match ParamValue::from(value) {
                    ParamValue::Object(fields) => input_bag.extend(fields),
                    other => {
                        tracing::debug!(shape = other.shape(), "ignoring non-object input body key");
                    }
                }
            } else {
                set_both(&mut query_bag, &mut input_bag, &key, ParamValue::from(value));
            }
        }

        query_bag.insert(INPUT_KEY.to_string(), ParamValue::Object(input_bag));
        query_bag
    }
}

fn set_both(query_bag: &mut ParameterBag, input_bag: &mut ParameterBag, key: &str, value: ParamValue) {
    input_bag.insert(key.to_string(), value.clone());
    query_bag.insert(key.to_string(), value);
}

/// Decode a request body into a JSON object
pub fn decode_body(body: &[u8]) -> Result<serde_json::Map<String, Value>, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(RequestError::InvalidJson {
            what: "json body",
            message: "expected a JSON object".to_string(),
        }),
        Err(e) => Err(RequestError::InvalidJson {
            what: "json body",
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Scalar;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn input(bag: &ParameterBag) -> &ParameterBag {
        bag[INPUT_KEY].as_object().unwrap()
    }

    #[test]
    fn test_precedence_query_path_body() {
        let bag = ParameterMerger::merge(
            &pairs(&[("id", "1")]),
            &pairs(&[("id", "2")]),
            br#"{"id":3}"#,
        )
        .unwrap();

        let three = ParamValue::Scalar(Scalar::Number(3.into()));
        assert_eq!(bag["id"], three);
        assert_eq!(input(&bag)["id"], three);
    }

    #[test]
    fn test_path_overrides_query() {
        let bag =
            ParameterMerger::merge(&pairs(&[("id", "1")]), &pairs(&[("id", "2")]), b"").unwrap();
        assert_eq!(bag["id"], ParamValue::string("2"));
        assert_eq!(input(&bag)["id"], ParamValue::string("2"));
    }

    #[test]
    fn test_repeated_query_keys_are_joined() {
        let bag = ParameterMerger::merge(
            &pairs(&[("ids", "a"), ("done", "true"), ("ids", "b")]),
            &[],
            b"",
        )
        .unwrap();
        assert_eq!(bag["ids"], ParamValue::string("a,b"));
        assert_eq!(bag["done"], ParamValue::string("true"));
    }

    #[test]
    fn test_input_key_is_flattened_into_input_bag_only() {
        let bag = ParameterMerger::merge(
            &[],
            &pairs(&[("id", "T1")]),
            br#"{"input":{"text":"buy milk"},"done":false}"#,
        )
        .unwrap();

        let input = input(&bag);
        assert_eq!(input["text"], ParamValue::string("buy milk"));
        assert_eq!(input["id"], ParamValue::string("T1"));
        assert_eq!(input["done"], ParamValue::Scalar(Scalar::Bool(false)));
        assert!(!bag.contains_key("text"));
        assert_eq!(bag["done"], ParamValue::Scalar(Scalar::Bool(false)));
    }

    #[test]
    fn test_input_bag_is_always_present() {
        let bag = ParameterMerger::merge(&[], &[], b"  ").unwrap();
        assert_eq!(bag.len(), 1);
        assert!(input(&bag).is_empty());
    }

    #[test]
    fn test_non_object_input_is_ignored() {
        let bag = ParameterMerger::merge(&[], &[], br#"{"input":"nope","a":1}"#).unwrap();
        assert_eq!(input(&bag).len(), 1);
        assert!(input(&bag).contains_key("a"));
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let err = ParameterMerger::merge(&[], &[], b"{not json").unwrap_err();
        assert!(matches!(err, RequestError::InvalidJson { what: "json body", .. }));

        let err = ParameterMerger::merge(&[], &[], b"[1,2]").unwrap_err();
        assert!(matches!(err, RequestError::InvalidJson { .. }));
    }
}
