use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tvs_core::errors::{ErrorInfo, TvsError};

use crate::descriptor::{FieldDescriptor, FieldKind, Operator, ValueType};

fn catalog_error(code: &str, field: &str, message: impl Into<String>) -> TvsError {
    TvsError::Catalog(ErrorInfo::new(code, message).with_context("field", field))
}

/// Immutable, validated set of field descriptors keyed by name.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: BTreeMap<String, Arc<FieldDescriptor>>,
}

impl FieldCatalog {
    /// Builds a catalog after checking every descriptor for internal
    /// consistency.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, TvsError> {
        let mut fields = BTreeMap::new();
        for descriptor in descriptors {
            validate_descriptor(&descriptor)?;
            let name = descriptor.name.clone();
            if fields.insert(name.clone(), Arc::new(descriptor)).is_some() {
                return Err(catalog_error(
                    "duplicate_field",
                    &name,
                    "field name declared more than once",
                ));
            }
        }
        Ok(Self { fields })
    }

    /// Looks up a field by name.
    pub fn resolve(&self, name: &str) -> Result<&Arc<FieldDescriptor>, TvsError> {
        self.fields.get(name).ok_or_else(|| {
            TvsError::NotFound(
                ErrorInfo::new("field_not_found", format!("field `{name}` is not registered"))
                    .with_context("field", name),
            )
        })
    }

    /// Returns the operators allowed for the named field.
    pub fn operators_for(&self, name: &str) -> Result<&BTreeSet<Operator>, TvsError> {
        self.resolve(name).map(|descriptor| &descriptor.allowed_operators)
    }

    /// Returns true when the catalog contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<FieldDescriptor>> + '_ {
        self.fields.values()
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when no fields are registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn validate_descriptor(descriptor: &FieldDescriptor) -> Result<(), TvsError> {
    let name = descriptor.name.as_str();
    if name.trim().is_empty() {
        return Err(catalog_error("empty_name", name, "field name must not be empty"));
    }
    if descriptor.allowed_operators.is_empty() {
        return Err(catalog_error(
            "no_operators",
            name,
            "field must allow at least one operator",
        ));
    }
    if let Some(operator) = descriptor
        .allowed_operators
        .iter()
        .find(|operator| !descriptor.value_type.supports(**operator))
    {
        return Err(TvsError::Catalog(
            ErrorInfo::new(
                "unsupported_operator",
                format!(
                    "operator {operator} is not defined for {} fields",
                    descriptor.value_type
                ),
            )
            .with_context("field", name)
            .with_context("operator", operator.to_string()),
        ));
    }
    match (descriptor.value_type, descriptor.choices.is_empty()) {
        (ValueType::Choice, true) => {
            return Err(catalog_error(
                "missing_choices",
                name,
                "choice field declares no choices",
            ));
        }
        (ValueType::Choice, false) => {
            let mut seen = BTreeSet::new();
            for choice in &descriptor.choices {
                if !seen.insert(choice.value.as_str()) {
                    return Err(catalog_error(
                        "duplicate_choice",
                        name,
                        format!("choice `{}` declared more than once", choice.value),
                    ));
                }
            }
        }
        (_, false) => {
            return Err(catalog_error(
                "unexpected_choices",
                name,
                "only choice fields may declare choices",
            ));
        }
        (_, true) => {}
    }
    match (descriptor.kind, descriptor.round_count) {
        (FieldKind::Periodic, None) | (FieldKind::Periodic, Some(0)) => Err(catalog_error(
            "missing_rounds",
            name,
            "periodic field must declare at least one round",
        )),
        (FieldKind::Periodic, Some(rounds)) => {
            if !descriptor.rounds_names.is_empty()
                && descriptor.rounds_names.len() != rounds as usize
            {
                return Err(TvsError::Catalog(
                    ErrorInfo::new(
                        "rounds_names_mismatch",
                        "number of round names differs from number of rounds",
                    )
                    .with_context("field", name)
                    .with_context("number_of_rounds", rounds.to_string())
                    .with_context(
                        "rounds_names",
                        descriptor.rounds_names.len().to_string(),
                    ),
                ));
            }
            Ok(())
        }
        (_, Some(_)) => Err(catalog_error(
            "unexpected_rounds",
            name,
            "only periodic fields may declare rounds",
        )),
        (_, None) if !descriptor.rounds_names.is_empty() => Err(catalog_error(
            "unexpected_rounds",
            name,
            "only periodic fields may declare rounds",
        )),
        (_, None) => Ok(()),
    }
}
