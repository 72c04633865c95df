//! Field mapper.
//!
//! Translates record fields into document field values according to the
//! rules of a [`MappingDescriptor`]. Mapping is pure: it reads the record and
//! produces values, nothing else.

use serde_json::{Map, Value};

use crate::error::MappingError;
use crate::types::{FieldKind, MappingDescriptor, MappingRule, Record};

/// Computes the document value for one rule.
///
/// - stored rules copy the stored value;
/// - computed rules invoke the record's accessor and copy its result;
/// - nested rules produce `[{child: value}, ...]` in collection order.
///
/// # Errors
///
/// * `MappingError::FieldNotFound` - If the record lacks the source field
/// * `MappingError::NestedFieldNotFound` - If a related item lacks the child field
pub fn map_field(record: &dyn Record, rule: &MappingRule) -> Result<Value, MappingError> {
    let not_found = || MappingError::FieldNotFound {
        kind: record.kind().to_string(),
        field: rule.source.clone(),
    };

    match &rule.kind {
        FieldKind::Stored => record.stored(&rule.source).cloned().ok_or_else(not_found),
        FieldKind::Computed => record.computed(&rule.source).ok_or_else(not_found),
        FieldKind::Nested { child } => {
            let items = record.related(&rule.source).ok_or_else(not_found)?;
            items
                .iter()
                .enumerate()
                .map(|(position, item)| {
                    let value = item.get(child).cloned().ok_or_else(|| {
                        MappingError::NestedFieldNotFound {
                            kind: record.kind().to_string(),
                            field: rule.source.clone(),
                            child: child.clone(),
                            position,
                        }
                    })?;
                    let mut entry = Map::with_capacity(1);
                    entry.insert(child.clone(), value);
                    Ok(Value::Object(entry))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
    }
}

/// Computes all document values for a record, applying rules in
/// declaration order. A later rule writing the same target wins.
pub fn map_record(
    record: &dyn Record,
    descriptor: &MappingDescriptor,
) -> Result<Map<String, Value>, MappingError> {
    let mut fields = Map::new();
    for rule in descriptor.rules() {
        let value = map_field(record, rule)?;
        fields.insert(rule.target.clone(), value);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StoredRecord;
    use serde_json::json;

    fn article() -> StoredRecord {
        StoredRecord::new("Article", "1")
            .with_field("title", json!("Hello"))
            .with_field("views", json!(12))
            .with_related(
                "tags",
                vec![json!({"name": "a", "slug": "x"}), json!({"name": "b"})],
            )
            .with_computed("headline", |r| {
                json!(format!(
                    "{}!",
                    r.stored("title").and_then(Value::as_str).unwrap_or_default()
                ))
            })
    }

    #[test]
    fn test_stored_field() {
        let value = map_field(&article(), &MappingRule::stored("views", "views")).unwrap();
        assert_eq!(value, json!(12));
    }

    #[test]
    fn test_computed_field_is_materialized() {
        let value = map_field(&article(), &MappingRule::computed("headline", "headline")).unwrap();
        assert_eq!(value, json!("Hello!"));
    }

    #[test]
    fn test_nested_field_keeps_order_and_length() {
        let value = map_field(&article(), &MappingRule::nested("tags", "tags", "name")).unwrap();
        assert_eq!(value, json!([{"name": "a"}, {"name": "b"}]));
    }

    #[test]
    fn test_empty_nested_collection() {
        let record = StoredRecord::new("Article", "2").with_related("tags", vec![]);
        let value = map_field(&record, &MappingRule::nested("tags", "tags", "name")).unwrap();
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_missing_field() {
        let err = map_field(&article(), &MappingRule::stored("body", "body")).unwrap_err();
        assert!(matches!(err, MappingError::FieldNotFound { field, .. } if field == "body"));

        // A stored field is not an accessor
        let err = map_field(&article(), &MappingRule::computed("title", "title")).unwrap_err();
        assert!(matches!(err, MappingError::FieldNotFound { .. }));
    }

    #[test]
    fn test_missing_nested_child() {
        let err = map_field(&article(), &MappingRule::nested("tags", "tags", "slug")).unwrap_err();
        assert!(matches!(
            err,
            MappingError::NestedFieldNotFound { position: 1, .. }
        ));
    }

    #[test]
    fn test_map_record() {
        let descriptor = MappingDescriptor::builder("Article")
            .stored("title", "title")
            .nested("tags", "tags", "name")
            .build()
            .unwrap();
        let fields = map_record(&article(), &descriptor).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["title"], json!("Hello"));
    }
}
