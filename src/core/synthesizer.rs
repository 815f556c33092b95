//! Query document synthesis
//!
//! One REST request always becomes a document with exactly one root field:
//! `<keyword> { <operation>(<args>)<selection> }`.

use crate::core::encoder::ArgumentEncoder;
use crate::core::error::{ConfigError, GatewayResult};
use crate::core::registry::{TypeRegistry, TypedFields};
use crate::core::response::{GraphQLRequest, ReadTime};
use crate::core::types::OperationKind;
use crate::core::value::ParameterBag;
use chrono::Utc;

/// A synthesized document ready for the engine
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    pub text: String,
    pub operation_name: String,
    pub kind: OperationKind,
    pub read_time: ReadTime,
}

impl QueryDocument {
    /// Wrap the document in an engine request
    ///
    /// The synthesized document is anonymous, so no `operationName` is sent.
    pub fn into_request(self) -> GraphQLRequest {
        GraphQLRequest {
            query: self.text,
            read_time: Some(self.read_time),
            ..Default::default()
        }
    }
}

/// Build a document from explicit parts
///
/// Parentheses are omitted when no argument has an encodable value.
pub fn synthesize(
    encoder: &ArgumentEncoder<'_>,
    kind: OperationKind,
    operation: &str,
    arguments: &TypedFields,
    bag: &ParameterBag,
    selection: &str,
) -> GatewayResult<String> {
    let pairs = encoder.encode_arguments(arguments, bag)?;
    let args = if pairs.is_empty() {
        String::new()
    } else {
        format!("({})", pairs.join(","))
    };

    Ok(format!(
        "{} {{ {}{}{} }}",
        kind.keyword(),
        operation,
        args,
        selection
    ))
}

/// Registry-backed synthesizer
#[derive(Clone, Copy)]
pub struct QuerySynthesizer<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> QuerySynthesizer<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Synthesize the document for `operation` as reached through `method`
    ///
    /// The keyword is `query` for GET and `mutation` for every other method.
    pub fn synthesize(
        &self,
        method: &str,
        operation: &str,
        bag: &ParameterBag,
    ) -> GatewayResult<QueryDocument> {
        let start = Utc::now();

        let entry = self
            .registry
            .operation(operation)
            .ok_or_else(|| ConfigError::MissingSelection {
                operation: operation.to_string(),
            })?;
        let selection = entry
            .selection
            .as_deref()
            .ok_or_else(|| ConfigError::MissingSelection {
                operation: operation.to_string(),
            })?;

        let kind = OperationKind::for_method(method);
        let text = synthesize(
            &ArgumentEncoder::new(self.registry),
            kind,
            operation,
            &entry.arguments,
            bag,
            selection,
        )?;

        tracing::trace!(operation = %operation, document = %text, "document synthesized");

        Ok(QueryDocument {
            text,
            operation_name: operation.to_string(),
            kind,
            read_time: ReadTime {
                start,
                end: Utc::now(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::core::error::GatewayError;
    use crate::core::merger::ParameterMerger;
    use crate::core::value::ParamValue;

    fn registry() -> TypeRegistry {
        TypeRegistry::from_config(RegistryConfig::default_config()).unwrap()
    }

    fn assert_parses(document: &str) {
        graphql_parser::parse_query::<String>(document)
            .unwrap_or_else(|e| panic!("document {:?} does not parse: {}", document, e));
    }

    #[test]
    fn test_get_with_boolean_filter() {
        let registry = registry();
        let bag = ParameterMerger::merge(&[("done".into(), "true".into())], &[], b"").unwrap();

        let doc = QuerySynthesizer::new(&registry)
            .synthesize("GET", "todos", &bag)
            .unwrap();

        assert_eq!(doc.text, "query { todos(done:true){id,text,done} }");
        assert_eq!(doc.kind, OperationKind::Query);
        assert!(doc.read_time.end >= doc.read_time.start);
        assert_parses(&doc.text);
    }

    #[test]
    fn test_post_with_input_object() {
        let registry = registry();
        let bag = ParameterMerger::merge(&[], &[], br#"{"input":{"text":"buy milk"}}"#).unwrap();

        let doc = QuerySynthesizer::new(&registry)
            .synthesize("POST", "createTodo", &bag)
            .unwrap();

        assert_eq!(
            doc.text,
            r#"mutation { createTodo(input:{text:"buy milk"}){id,text,done} }"#
        );
        assert_parses(&doc.text);
    }

    #[test]
    fn test_no_arguments_omits_parentheses() {
        let registry = registry();
        let bag = ParameterMerger::merge(&[("page".into(), "2".into())], &[], b"").unwrap();

        let doc = QuerySynthesizer::new(&registry)
            .synthesize("GET", "todos", &bag)
            .unwrap();

        assert_eq!(doc.text, "query { todos{id,text,done} }");
        assert_parses(&doc.text);
    }

    #[test]
    fn test_unknown_keys_do_not_change_document() {
        let registry = registry();
        let synthesizer = QuerySynthesizer::new(&registry);
        let plain = ParameterMerger::merge(&[], &[("id".into(), "T1".into())], b"").unwrap();
        let noisy = ParameterMerger::merge(
            &[("_".into(), "1700000000".into())],
            &[("id".into(), "T1".into())],
            br#"{"trace":"abc"}"#,
        )
        .unwrap();

        assert_eq!(
            synthesizer.synthesize("GET", "todo", &plain).unwrap().text,
            synthesizer.synthesize("GET", "todo", &noisy).unwrap().text
        );
    }

    #[test]
    fn test_empty_selection_is_allowed() {
        let registry = registry();
        let bag = ParameterMerger::merge(&[], &[("id".into(), "T1".into())], b"").unwrap();

        let doc = QuerySynthesizer::new(&registry)
            .synthesize("DELETE", "deleteTodo", &bag)
            .unwrap();

        assert_eq!(doc.text, r#"mutation { deleteTodo(id:"T1") }"#);
    }

    #[test]
    fn test_missing_selection_is_config_error() {
        let config = RegistryConfig::from_yaml_str("operations:\n  users: {}\n").unwrap();
        let registry = TypeRegistry::from_config(config).unwrap();

        let err = QuerySynthesizer::new(&registry)
            .synthesize("GET", "users", &ParameterBag::new())
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::Config(ConfigError::MissingSelection { .. })
        ));
    }

    #[test]
    fn test_encoding_error_stops_synthesis() {
        let registry = registry();
        let mut bag = ParameterBag::new();
        bag.insert("done".into(), ParamValue::string("maybe"));

        let err = QuerySynthesizer::new(&registry)
            .synthesize("GET", "todos", &bag)
            .unwrap_err();

        assert!(matches!(err, GatewayError::Encoding(_)));
    }

    #[test]
    fn test_into_request_is_anonymous() {
        let registry = registry();
        let doc = QuerySynthesizer::new(&registry)
            .synthesize("GET", "todos", &ParameterBag::new())
            .unwrap();

        let request = doc.into_request();
        assert_eq!(request.query, "query { todos{id,text,done} }");
        assert!(request.operation_name.is_none());
        assert!(request.read_time.is_some());
    }
}
