//! Descriptor registry.
//!
//! Holds the validated descriptors of all registered record kinds, keyed by
//! kind. A descriptor is checked once, at registration, against the declared
//! fields of its kind.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::MappingError;
use crate::types::{MappingDescriptor, RecordSchema};

/// In-memory registry of mapping descriptors.
#[derive(Debug, Default, Clone)]
pub struct DescriptorRegistry {
    by_kind: HashMap<String, Arc<MappingDescriptor>>,
    order: Vec<String>,
}

impl DescriptorRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered descriptors.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registers a descriptor after validating it against the kind's schema.
    ///
    /// # Errors
    ///
    /// * `MappingError::AlreadyRegistered` - If the kind already has a descriptor
    /// * `MappingError::UnknownSourceField` - If a rule names an undeclared field
    /// * `MappingError::DuplicateTarget`, `ReservedTarget`, `EmptyDescriptor` -
    ///   If the descriptor is structurally invalid
    pub fn register(
        &mut self,
        descriptor: MappingDescriptor,
        schema: &RecordSchema,
    ) -> Result<Arc<MappingDescriptor>, MappingError> {
        let kind = descriptor.kind().to_string();
        if self.by_kind.contains_key(&kind) {
            return Err(MappingError::AlreadyRegistered { kind });
        }

        descriptor.validate_against(schema)?;

        let descriptor = Arc::new(descriptor);
        tracing::debug!(
            kind = %kind,
            index = %descriptor.index_name(),
            doc_type = %descriptor.doc_type(),
            rules = descriptor.rules().len(),
            "Registered mapping descriptor"
        );
        self.by_kind.insert(kind.clone(), Arc::clone(&descriptor));
        self.order.push(kind);
        Ok(descriptor)
    }

    /// Gets the descriptor of a kind.
    pub fn get(&self, kind: &str) -> Option<Arc<MappingDescriptor>> {
        self.by_kind.get(kind).cloned()
    }

    /// Gets the descriptor of a kind, or a `DescriptorNotRegistered` error.
    pub fn require(&self, kind: &str) -> Result<Arc<MappingDescriptor>, MappingError> {
        self.get(kind)
            .ok_or_else(|| MappingError::DescriptorNotRegistered {
                kind: kind.to_string(),
            })
    }

    /// Returns true if the kind has a descriptor.
    pub fn contains(&self, kind: &str) -> bool {
        self.by_kind.contains_key(kind)
    }

    /// Returns the registered kinds in registration order.
    pub fn kinds(&self) -> &[String] {
        &self.order
    }

    /// Iterates the descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<MappingDescriptor>> {
        self.order.iter().filter_map(|kind| self.by_kind.get(kind))
    }

    /// Returns the distinct index names targeted by registered descriptors.
    pub fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for descriptor in self.descriptors() {
            if !names.iter().any(|n| n == descriptor.index_name()) {
                names.push(descriptor.index_name().to_string());
            }
        }
        names
    }
}
