//! Type-directed encoding of parameter values into GraphQL literals
//!
//! The walk is driven by the declared type, never by the value: keys the
//! registry does not know are skipped, so REST clients may send parameters
//! (pagination, cache busters) the schema has never heard of.

use crate::core::error::EncodingError;
use crate::core::registry::{TypeRegistry, TypedFields};
use crate::core::scalars;
use crate::core::types::{DeclaredType, TypeKind, is_graphql_name};
use crate::core::value::{ParamValue, ParameterBag, Scalar};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Unquoted literal accepted for `Boolean`, `Int` and `Float`
static PLAIN_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:true|false|-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?)$")
        .expect("valid literal regex")
});

/// Encodes values against declared types using a registry
#[derive(Clone, Copy)]
pub struct ArgumentEncoder<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> ArgumentEncoder<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Encode every bag entry that has a declared type, as `name:literal` pairs
    ///
    /// Pairs come out in argument declaration order; bag keys with no declared
    /// type are dropped.
    pub fn encode_arguments(
        &self,
        arguments: &TypedFields,
        bag: &ParameterBag,
    ) -> Result<Vec<String>, EncodingError> {
        for key in bag.keys().filter(|k| !arguments.contains_key(*k)) {
            tracing::trace!(param = %key, "ignoring parameter with no declared type");
        }

        arguments
            .iter()
            .filter_map(|(name, declared)| bag.get(name).map(|value| (name, declared, value)))
            .map(|(name, declared, value)| {
                Ok(format!("{}:{}", name, self.encode(name, declared, value)?))
            })
            .collect()
    }

    /// Encode one value against its declared type
    ///
    /// `argument` only names the value in error messages.
    pub fn encode(
        &self,
        argument: &str,
        declared: &DeclaredType,
        value: &ParamValue,
    ) -> Result<String, EncodingError> {
        match declared {
            DeclaredType::Named(name) => self.encode_named(argument, name, value),
            DeclaredType::List(element) => self.encode_list(argument, element, value),
        }
    }

    fn encode_list(
        &self,
        argument: &str,
        element: &str,
        value: &ParamValue,
    ) -> Result<String, EncodingError> {
        let items: Cow<'_, [ParamValue]> = match value {
            ParamValue::Scalar(Scalar::Null) => return Ok("null".to_string()),
            ParamValue::Sequence(items) => Cow::Borrowed(items),
            // repeated query keys arrive joined with ','
            ParamValue::Scalar(Scalar::String(s)) if s.is_empty() => Cow::Owned(Vec::new()),
            ParamValue::Scalar(Scalar::String(s)) => {
                Cow::Owned(s.split(',').map(ParamValue::string).collect())
            }
            ParamValue::Scalar(_) => Cow::Owned(vec![value.clone()]),
            ParamValue::Object(_) => {
                return Err(EncodingError::TypeMismatch {
                    argument: argument.to_string(),
                    expected: format!("[{}]", element),
                    found: value.shape(),
                });
            }
        };

        let literals = items
            .iter()
            .map(|item| self.encode_named(argument, element, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!("[{}]", literals.join(",")))
    }

    fn encode_named(
        &self,
        argument: &str,
        type_name: &str,
        value: &ParamValue,
    ) -> Result<String, EncodingError> {
        if let ParamValue::Scalar(Scalar::Null) = value {
            return Ok("null".to_string());
        }

        let kind = self.registry.lookup_kind(type_name).ok_or_else(|| {
            EncodingError::UnknownArgumentType {
                argument: argument.to_string(),
                type_name: type_name.to_string(),
            }
        })?;

        match kind {
            TypeKind::InputObject => self.encode_input_object(argument, type_name, value),
            TypeKind::Enum => {
                let text = scalar_text(argument, type_name, value)?;
                if is_graphql_name(&text) && !matches!(&*text, "true" | "false" | "null") {
                    Ok(text.into_owned())
                } else {
                    Err(invalid_literal(argument, type_name, &text))
                }
            }
            TypeKind::Scalar => {
                let text = scalar_text(argument, type_name, value)?;
                match type_name {
                    "Boolean" | "Int" | "Float" => {
                        if PLAIN_TOKEN.is_match(&text) {
                            Ok(text.into_owned())
                        } else {
                            Err(invalid_literal(argument, type_name, &text))
                        }
                    }
                    "ID" | "String" => Ok(quote(&text)),
                    custom => {
                        scalars::validate(custom, &text).map_err(|e| {
                            EncodingError::InvalidScalar {
                                argument: argument.to_string(),
                                type_name: custom.to_string(),
                                message: e.to_string(),
                            }
                        })?;
                        Ok(quote(&text))
                    }
                }
            }
        }
    }

    fn encode_input_object(
        &self,
        argument: &str,
        type_name: &str,
        value: &ParamValue,
    ) -> Result<String, EncodingError> {
        let ParamValue::Object(map) = value else {
            return Err(EncodingError::TypeMismatch {
                argument: argument.to_string(),
                expected: type_name.to_string(),
                found: value.shape(),
            });
        };

        let fields = self.registry.lookup_input_fields(type_name).ok_or_else(|| {
            EncodingError::UnknownArgumentType {
                argument: argument.to_string(),
                type_name: type_name.to_string(),
            }
        })?;

        let pairs = fields
            .iter()
            .filter_map(|(field, declared)| map.get(field).map(|v| (field, declared, v)))
            .map(|(field, declared, v)| {
                let path = format!("{}.{}", argument, field);
                Ok(format!("{}:{}", field, self.encode(&path, declared, v)?))
            })
            .collect::<Result<Vec<_>, EncodingError>>()?;

        Ok(format!("{{{}}}", pairs.join(",")))
    }
}

fn scalar_text<'v>(
    argument: &str,
    type_name: &str,
    value: &'v ParamValue,
) -> Result<Cow<'v, str>, EncodingError> {
    match value {
        ParamValue::Scalar(scalar) => Ok(scalar.text()),
        other => Err(EncodingError::TypeMismatch {
            argument: argument.to_string(),
            expected: type_name.to_string(),
            found: other.shape(),
        }),
    }
}

fn invalid_literal(argument: &str, type_name: &str, text: &str) -> EncodingError {
    EncodingError::InvalidLiteral {
        argument: argument.to_string(),
        type_name: type_name.to_string(),
        value: text.to_string(),
    }
}

/// Double-quote a string per the GraphQL string grammar
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use serde_json::json;

    fn registry() -> TypeRegistry {
        let config = RegistryConfig::from_yaml_str(
            r#"
scalars: [IP, DateTime]
enums: [TodoState]
input_objects:
  CreateUserInput:
    name: "String!"
    age: Int
    tags: "[String]"
    address: AddressInput
  AddressInput:
    city: String
    zip: Int
operations:
  users:
    selection: "{id}"
    arguments:
      ids: "[ID!]"
      ages: "[Int]"
      state: TodoState
      active: Boolean
      score: Float
      since: DateTime
      ip: IP
"#,
        )
        .unwrap();
        TypeRegistry::from_config(config).unwrap()
    }

    fn encode(registry: &TypeRegistry, declared: &str, value: serde_json::Value) -> String {
        ArgumentEncoder::new(registry)
            .encode("arg", &DeclaredType::parse(declared).unwrap(), &value.into())
            .unwrap()
    }

    fn encode_err(
        registry: &TypeRegistry,
        declared: &str,
        value: serde_json::Value,
    ) -> EncodingError {
        ArgumentEncoder::new(registry)
            .encode("arg", &DeclaredType::parse(declared).unwrap(), &value.into())
            .unwrap_err()
    }

    #[test]
    fn test_plain_scalars_are_unquoted() {
        let registry = registry();
        assert_eq!(encode(&registry, "Int", json!(42)), "42");
        assert_eq!(encode(&registry, "Boolean!", json!(true)), "true");
        assert_eq!(encode(&registry, "Float", json!(1.5)), "1.5");
        // strings from query/path parsing pass through without coercion
        assert_eq!(encode(&registry, "Boolean", json!("true")), "true");
        assert_eq!(encode(&registry, "Int", json!("-7")), "-7");
    }

    #[test]
    fn test_string_and_id_are_quoted_and_escaped() {
        let registry = registry();
        assert_eq!(encode(&registry, "String", json!("buy milk")), "\"buy milk\"");
        assert_eq!(encode(&registry, "ID", json!(9527)), "\"9527\"");
        assert_eq!(
            encode(&registry, "String", json!("say \"hi\"\n\\")),
            r#""say \"hi\"\n\\""#
        );
    }

    #[test]
    fn test_enum_is_bare() {
        let registry = registry();
        assert_eq!(encode(&registry, "TodoState", json!("DONE")), "DONE");
        assert!(matches!(
            encode_err(&registry, "TodoState", json!("DONE }")),
            EncodingError::InvalidLiteral { .. }
        ));
        assert!(matches!(
            encode_err(&registry, "TodoState", json!(true)),
            EncodingError::InvalidLiteral { .. }
        ));
    }

    #[test]
    fn test_unquoted_literal_must_be_one_token() {
        let registry = registry();
        assert!(matches!(
            encode_err(&registry, "Int", json!("1){__typename")),
            EncodingError::InvalidLiteral { .. }
        ));
        assert!(matches!(
            encode_err(&registry, "Boolean", json!("yes")),
            EncodingError::InvalidLiteral { .. }
        ));
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let registry = registry();
        let value = json!({"name": "Bob", "tags": ["a", "b"], "address": {"city": "Paris"}});
        let first = encode(&registry, "CreateUserInput", value.clone());
        let second = encode(&registry, "CreateUserInput", value);
        assert_eq!(first, second);
    }

    #[test]
    fn test_list_and_comma_joined_string_are_equivalent() {
        let registry = registry();
        let from_list = encode(&registry, "[String]", json!(["a", "b"]));
        let from_joined = encode(&registry, "[String]", json!("a,b"));
        assert_eq!(from_list, r#"["a","b"]"#);
        assert_eq!(from_list, from_joined);
        assert_eq!(encode(&registry, "[Int]", json!("1,2,3")), "[1,2,3]");
    }

    #[test]
    fn test_list_edge_cases() {
        let registry = registry();
        assert_eq!(encode(&registry, "[ID]", json!("")), "[]");
        assert_eq!(encode(&registry, "[Int]", json!(5)), "[5]");
        assert_eq!(encode(&registry, "[ID]", json!(null)), "null");
        assert!(matches!(
            encode_err(&registry, "[ID]", json!({"a": 1})),
            EncodingError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_input_object_drops_unknown_keys() {
        let registry = registry();
        let literal = encode(
            &registry,
            "CreateUserInput!",
            json!({"name": "Bob", "age": 30, "extra": "x"}),
        );
        assert_eq!(literal, r#"{name:"Bob",age:30}"#);
    }

    #[test]
    fn test_nested_input_objects_and_lists() {
        let registry = registry();
        let literal = encode(
            &registry,
            "CreateUserInput",
            json!({"address": {"zip": "75001", "city": "Paris"}, "tags": "x,y", "name": "A"}),
        );
        assert_eq!(
            literal,
            r#"{name:"A",tags:["x","y"],address:{city:"Paris",zip:75001}}"#
        );
    }

    #[test]
    fn test_empty_input_object() {
        let registry = registry();
        assert_eq!(encode(&registry, "AddressInput", json!({"other": 1})), "{}");
    }

    #[test]
    fn test_shape_mismatches_are_errors() {
        let registry = registry();
        assert!(matches!(
            encode_err(&registry, "CreateUserInput", json!("Bob")),
            EncodingError::TypeMismatch { .. }
        ));
        assert!(matches!(
            encode_err(&registry, "String", json!({"a": 1})),
            EncodingError::TypeMismatch { .. }
        ));
        assert!(matches!(
            encode_err(&registry, "Int", json!([1, 2])),
            EncodingError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_unknown_type_is_error() {
        let registry = registry();
        assert!(matches!(
            encode_err(&registry, "Mystery", json!("x")),
            EncodingError::UnknownArgumentType { .. }
        ));
    }

    #[test]
    fn test_null_encodes_as_null() {
        let registry = registry();
        assert_eq!(encode(&registry, "String", json!(null)), "null");
        assert_eq!(encode(&registry, "CreateUserInput", json!(null)), "null");
    }

    #[test]
    fn test_custom_scalars_are_quoted_and_checked() {
        let registry = registry();
        assert_eq!(
            encode(&registry, "DateTime", json!("2024-01-01T00:00:00Z")),
            "\"2024-01-01T00:00:00Z\""
        );
        assert_eq!(encode(&registry, "IP", json!("10.0.0.1")), "\"10.0.0.1\"");
        assert!(matches!(
            encode_err(&registry, "IP", json!("10.0.0.")),
            EncodingError::InvalidScalar { .. }
        ));
    }

    #[test]
    fn test_encode_arguments_skips_unknown_keys() {
        let registry = registry();
        let encoder = ArgumentEncoder::new(&registry);
        let arguments = registry.arguments("users").unwrap();

        let mut with_extra = ParameterBag::new();
        with_extra.insert("state".into(), ParamValue::string("DONE"));
        with_extra.insert("page".into(), ParamValue::string("2"));
        with_extra.insert("ids".into(), ParamValue::string("a,b"));

        let mut without_extra = with_extra.clone();
        without_extra.shift_remove("page");

        let pairs = encoder.encode_arguments(arguments, &with_extra).unwrap();
        assert_eq!(pairs, vec![r#"ids:["a","b"]"#, "state:DONE"]);
        assert_eq!(
            pairs,
            encoder.encode_arguments(arguments, &without_extra).unwrap()
        );
    }

    #[test]
    fn test_quote_control_characters() {
        assert_eq!(quote("a\u{01}b"), "\"a\\u0001b\"");
        assert_eq!(quote("tab\there"), "\"tab\\there\"");
    }
}
