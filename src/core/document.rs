//! Light inspection of native GraphQL documents
//!
//! Only what the gateway needs to route a document: the kind of the selected
//! operation and its root field names.

use crate::core::types::OperationKind;
use anyhow::{Result, anyhow, bail};
use graphql_parser::query::{Definition, OperationDefinition, Selection, SelectionSet, parse_query};

/// Kind and root fields of the operation a request selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub kind: OperationKind,
    pub root_fields: Vec<String>,
}

/// Inspect `query`, selecting the operation named `operation_name` if given
///
/// Without a name the first operation is used. Aliases are ignored: root
/// fields are reported by field name.
pub fn inspect(query: &str, operation_name: Option<&str>) -> Result<DocumentInfo> {
    let doc = parse_query::<String>(query).map_err(|e| anyhow!("Failed to parse query: {}", e))?;

    let operation = doc
        .definitions
        .iter()
        .filter_map(|def| match def {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        })
        .find(|op| match operation_name {
            Some(wanted) => name_of(op) == Some(wanted),
            None => true,
        })
        .ok_or_else(|| match operation_name {
            Some(name) => anyhow!("Unknown operation named '{}'", name),
            None => anyhow!("No operation found in query"),
        })?;

    let (kind, selection_set) = match operation {
        OperationDefinition::Query(q) => (OperationKind::Query, &q.selection_set),
        OperationDefinition::SelectionSet(s) => (OperationKind::Query, s),
        OperationDefinition::Mutation(m) => (OperationKind::Mutation, &m.selection_set),
        OperationDefinition::Subscription(_) => bail!("Subscriptions are not supported"),
    };

    Ok(DocumentInfo {
        kind,
        root_fields: root_fields(selection_set),
    })
}

fn name_of<'a>(op: &'a OperationDefinition<'_, String>) -> Option<&'a str> {
    match op {
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
        OperationDefinition::SelectionSet(_) => None,
    }
}

fn root_fields(selection_set: &SelectionSet<'_, String>) -> Vec<String> {
    selection_set
        .items
        .iter()
        .filter_map(|selection| match selection {
            Selection::Field(field) => Some(field.name.clone()),
            _ => None,
        })
        .collect()
}
