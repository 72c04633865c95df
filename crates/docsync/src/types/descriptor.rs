//! Mapping descriptors.
//!
//! A [`MappingDescriptor`] declares, for one record kind, which index and
//! document type its records are mirrored into and how each document field
//! is derived from the record.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::MappingError;

use super::document::RESERVED_FIELDS;
use super::record::RecordSchema;

/// Index used when a descriptor does not name one.
pub const DEFAULT_INDEX_NAME: &str = "docsync";

/// How a document field is derived from a record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Copy a stored value.
    Stored,
    /// Invoke a zero-argument accessor and copy its result.
    Computed,
    /// Flatten a related collection into `[{child: value}, ...]`.
    Nested {
        /// The field extracted from every related item.
        child: String,
    },
}

/// One field-mapping rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    /// Field (or accessor, or related collection) read from the record.
    pub source: String,

    /// Field written on the document.
    pub target: String,

    /// Derivation kind.
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl MappingRule {
    /// A stored-field rule.
    pub fn stored(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: FieldKind::Stored,
        }
    }

    /// A computed-accessor rule.
    pub fn computed(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: FieldKind::Computed,
        }
    }

    /// A nested-collection rule.
    pub fn nested(
        source: impl Into<String>,
        target: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: FieldKind::Nested {
                child: child.into(),
            },
        }
    }

    /// Returns the nested child field, if this is a nested rule.
    pub fn nested_child(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Nested { child } => Some(child),
            _ => None,
        }
    }
}

/// Declarative mapping of a record kind onto search documents.
///
/// # Examples
///
/// ```
/// use helios_docsync::types::MappingDescriptor;
///
/// let descriptor = MappingDescriptor::builder("Article")
///     .index("blog")
///     .stored("title", "title")
///     .nested("tags", "tags", "name")
///     .build()
///     .unwrap();
///
/// assert_eq!(descriptor.doc_type(), "article");
/// assert_eq!(descriptor.rules().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDescriptor {
    kind: String,
    index_name: String,
    doc_type: String,
    rules: Vec<MappingRule>,
}

impl MappingDescriptor {
    /// Starts building a descriptor for a record kind.
    pub fn builder(kind: impl Into<String>) -> MappingDescriptorBuilder {
        MappingDescriptorBuilder::new(kind)
    }

    /// Returns the record kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the target index name.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Returns the target document type.
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    /// Returns the target names of nested rules.
    pub fn nested_paths(&self) -> Vec<String> {
        self.rules
            .iter()
            .filter(|r| r.nested_child().is_some())
            .map(|r| r.target.clone())
            .collect()
    }

    /// Checks the structural invariants: at least one rule, unique targets,
    /// no reserved targets.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.rules.is_empty() {
            return Err(MappingError::EmptyDescriptor {
                kind: self.kind.clone(),
            });
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if RESERVED_FIELDS.contains(&rule.target.as_str()) {
                return Err(MappingError::ReservedTarget {
                    kind: self.kind.clone(),
                    field: rule.target.clone(),
                });
            }
            if !seen.insert(rule.target.as_str()) {
                return Err(MappingError::DuplicateTarget {
                    kind: self.kind.clone(),
                    field: rule.target.clone(),
                });
            }
        }
        Ok(())
    }

    /// Checks every rule source against the declared fields of the kind.
    pub fn validate_against(&self, schema: &RecordSchema) -> Result<(), MappingError> {
        self.validate()?;

        for rule in &self.rules {
            let unknown = |expected| MappingError::UnknownSourceField {
                kind: self.kind.clone(),
                field: rule.source.clone(),
                expected,
            };
            match &rule.kind {
                FieldKind::Stored => {
                    if !schema.has_stored(&rule.source) {
                        return Err(unknown("stored field"));
                    }
                }
                FieldKind::Computed => {
                    if !schema.has_computed(&rule.source) {
                        return Err(unknown("computed accessor"));
                    }
                }
                FieldKind::Nested { child } => {
                    let fields = schema
                        .related_fields(&rule.source)
                        .ok_or_else(|| unknown("related collection"))?;
                    if !fields.is_empty() && !fields.iter().any(|f| f == child) {
                        return Err(MappingError::UnknownSourceField {
                            kind: self.kind.clone(),
                            field: format!("{}.{}", rule.source, child),
                            expected: "related item field",
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Builder for [`MappingDescriptor`].
#[derive(Debug, Clone)]
pub struct MappingDescriptorBuilder {
    kind: String,
    index_name: Option<String>,
    doc_type: Option<String>,
    rules: Vec<MappingRule>,
}

impl MappingDescriptorBuilder {
    fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            index_name: None,
            doc_type: None,
            rules: Vec::new(),
        }
    }

    /// Sets the target index (default: [`DEFAULT_INDEX_NAME`]).
    pub fn index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Sets the target index if one is given.
    pub fn maybe_index(mut self, index_name: Option<String>) -> Self {
        if index_name.is_some() {
            self.index_name = index_name;
        }
        self
    }

    /// Sets the document type (default: the lower-cased kind).
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Sets the document type if one is given.
    pub fn maybe_doc_type(mut self, doc_type: Option<String>) -> Self {
        if doc_type.is_some() {
            self.doc_type = doc_type;
        }
        self
    }

    /// Adds a rule.
    pub fn rule(mut self, rule: MappingRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds a stored-field rule.
    pub fn stored(self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.rule(MappingRule::stored(source, target))
    }

    /// Adds a computed-accessor rule.
    pub fn computed(self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.rule(MappingRule::computed(source, target))
    }

    /// Adds a nested-collection rule.
    pub fn nested(
        self,
        source: impl Into<String>,
        target: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        self.rule(MappingRule::nested(source, target, child))
    }

    /// Builds and structurally validates the descriptor.
    pub fn build(self) -> Result<MappingDescriptor, MappingError> {
        let doc_type = self
            .doc_type
            .unwrap_or_else(|| self.kind.to_lowercase());
        let descriptor = MappingDescriptor {
            index_name: self
                .index_name
                .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            doc_type,
            kind: self.kind,
            rules: self.rules,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}
