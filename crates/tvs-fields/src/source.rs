//! Field-definition source: the boundary format supplied by the surrounding
//! configuration system, and its conversion into a [`FieldCatalog`].

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tvs_core::errors::{ErrorInfo, TvsError};
use tvs_core::EntityKind;

use crate::catalog::FieldCatalog;
use crate::descriptor::{ChoiceOption, FieldDescriptor, FieldKind, Operator, ValueType};

fn io_error(code: &str, err: impl ToString) -> TvsError {
    TvsError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Round metadata of a periodic (PDU) field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduData {
    /// Value type recorded in each round.
    pub subtype: ValueType,
    /// Number of collection rounds.
    pub number_of_rounds: u32,
    /// Display name of each round.
    #[serde(default)]
    pub rounds_names: Vec<String>,
}

/// One field definition as published by the field source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Unique field name.
    pub name: String,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Origin of the field.
    pub kind: FieldKind,
    /// Declared value type; periodic fields may omit it in favor of
    /// `pdu_data.subtype`.
    #[serde(default)]
    pub value_type: Option<ValueType>,
    /// Entity kind carrying the field.
    #[serde(default = "FieldDefinition::default_associated_with")]
    pub associated_with: EntityKind,
    /// Explicit operator whitelist; defaults to everything the type supports.
    #[serde(default)]
    pub allowed_operators: Option<BTreeSet<Operator>>,
    /// Legal values for choice fields.
    #[serde(default)]
    pub choices: Vec<ChoiceOption>,
    /// Round metadata for periodic fields.
    #[serde(default)]
    pub pdu_data: Option<PduData>,
}

impl FieldDefinition {
    fn default_associated_with() -> EntityKind {
        EntityKind::Household
    }

    /// Converts the definition into a descriptor, filling defaults.
    pub fn to_descriptor(&self) -> Result<FieldDescriptor, TvsError> {
        let value_type = match (&self.value_type, &self.pdu_data) {
            (Some(declared), Some(pdu)) if *declared != pdu.subtype => {
                return Err(TvsError::Catalog(
                    ErrorInfo::new(
                        "subtype_mismatch",
                        "value_type disagrees with pdu_data.subtype",
                    )
                    .with_context("field", self.name.as_str())
                    .with_context("value_type", declared.to_string())
                    .with_context("subtype", pdu.subtype.to_string()),
                ));
            }
            (Some(declared), _) => *declared,
            (None, Some(pdu)) => pdu.subtype,
            (None, None) => {
                return Err(TvsError::Catalog(
                    ErrorInfo::new("missing_value_type", "field declares no value type")
                        .with_context("field", self.name.as_str()),
                ));
            }
        };
        if self.kind == FieldKind::Periodic && self.pdu_data.is_none() {
            return Err(TvsError::Catalog(
                ErrorInfo::new("missing_pdu_data", "periodic field declares no pdu_data")
                    .with_context("field", self.name.as_str()),
            ));
        }
        let allowed_operators = self
            .allowed_operators
            .clone()
            .unwrap_or_else(|| value_type.supported_operators().iter().copied().collect());
        let (round_count, rounds_names) = match &self.pdu_data {
            Some(pdu) => {
                if pdu.rounds_names.len() != pdu.number_of_rounds as usize {
                    return Err(TvsError::Catalog(
                        ErrorInfo::new(
                            "rounds_names_mismatch",
                            "number of round names differs from number of rounds",
                        )
                        .with_context("field", self.name.as_str())
                        .with_context("number_of_rounds", pdu.number_of_rounds.to_string())
                        .with_context("rounds_names", pdu.rounds_names.len().to_string()),
                    ));
                }
                (Some(pdu.number_of_rounds), pdu.rounds_names.clone())
            }
            None => (None, Vec::new()),
        };
        Ok(FieldDescriptor {
            name: self.name.clone(),
            label: self.label.clone(),
            kind: self.kind,
            value_type,
            associated_with: self.associated_with,
            allowed_operators,
            choices: self.choices.clone(),
            round_count,
            rounds_names,
        })
    }
}

/// Complete field list supplied at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FieldSource {
    /// Field definitions in publication order.
    pub fields: Vec<FieldDefinition>,
}

impl FieldSource {
    /// Validates every definition and builds the catalog.
    pub fn into_catalog(&self) -> Result<FieldCatalog, TvsError> {
        let descriptors = self
            .fields
            .iter()
            .map(FieldDefinition::to_descriptor)
            .collect::<Result<Vec<_>, _>>()?;
        FieldCatalog::from_descriptors(descriptors)
    }
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, TvsError> {
    serde_yaml::from_slice(data).map_err(|err| io_error("yaml_deserialize", err))
}

/// Reads a document from disk; `.json` files are parsed as JSON, anything
/// else as YAML.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, TvsError> {
    let bytes = fs::read(path).map_err(|err| {
        TvsError::Serde(
            ErrorInfo::new("document_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => tvs_core::serde::from_json_slice(&bytes),
        _ => from_yaml_slice(&bytes),
    };
    parsed.map_err(|err| match err {
        TvsError::Serde(info) => {
            TvsError::Serde(info.with_context("path", path.display().to_string()))
        }
        other => other,
    })
}

/// Loads a field source from disk.
pub fn load_field_source(path: &Path) -> Result<FieldSource, TvsError> {
    load_document(path)
}
