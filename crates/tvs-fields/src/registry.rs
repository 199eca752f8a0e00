use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use tvs_core::errors::TvsError;

use crate::catalog::FieldCatalog;
use crate::descriptor::{FieldDescriptor, Operator};
use crate::source::FieldSource;

/// Process-wide, read-mostly handle to the current [`FieldCatalog`].
///
/// The catalog itself is never mutated. A reload builds and validates a new
/// catalog and then swaps the shared pointer, so a caller that took a
/// [`snapshot`](Self::snapshot) keeps a consistent view for its whole
/// evaluation. Cloning the registry clones the handle, not the catalog.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    current: Arc<RwLock<Arc<FieldCatalog>>>,
}

impl FieldRegistry {
    /// Creates a registry serving `catalog`.
    pub fn new(catalog: FieldCatalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Builds a registry from a field source.
    pub fn from_source(source: &FieldSource) -> Result<Self, TvsError> {
        let catalog = source.into_catalog()?;
        tracing::debug!(fields = catalog.len(), "field catalog loaded");
        Ok(Self::new(catalog))
    }

    /// Returns the catalog currently in force.
    pub fn snapshot(&self) -> Arc<FieldCatalog> {
        // The lock only guards a pointer swap, so a poisoned guard still
        // holds a complete catalog.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Resolves a field against the current catalog.
    pub fn resolve(&self, name: &str) -> Result<Arc<FieldDescriptor>, TvsError> {
        self.snapshot().resolve(name).map(Arc::clone)
    }

    /// Returns the operators allowed for a field in the current catalog.
    pub fn operators_for(&self, name: &str) -> Result<BTreeSet<Operator>, TvsError> {
        self.snapshot().operators_for(name).cloned()
    }

    /// Replaces the current catalog.
    pub fn swap(&self, catalog: FieldCatalog) -> Arc<FieldCatalog> {
        let next = Arc::new(catalog);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, next);
        tracing::debug!(
            previous = previous.len(),
            current = guard.len(),
            "field catalog swapped"
        );
        previous
    }

    /// Validates `source` and swaps it in. On failure the previous catalog
    /// stays in force.
    pub fn reload(&self, source: &FieldSource) -> Result<(), TvsError> {
        match source.into_catalog() {
            Ok(catalog) => {
                self.swap(catalog);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "rejected field source, keeping current catalog");
                Err(err)
            }
        }
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new(FieldCatalog::default())
    }
}
