use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tvs_core::errors::{ErrorInfo, TvsError};
use tvs_core::serde::{read_json_file, to_canonical_json_bytes};
use tvs_criteria::Household;
use tvs_fields::{load_field_source, FieldCatalog};

/// Loads and validates the field catalog.
pub fn load_catalog(path: &Path) -> Result<FieldCatalog, TvsError> {
    let catalog = load_field_source(path)?.into_catalog()?;
    tracing::info!(path = %path.display(), fields = catalog.len(), "field catalog loaded");
    Ok(catalog)
}

/// Loads the household population from a JSON array.
pub fn load_population(path: &Path) -> Result<Vec<Household>, TvsError> {
    let households: Vec<Household> = read_json_file(path)?;
    tracing::info!(path = %path.display(), households = households.len(), "population loaded");
    Ok(households)
}

/// Writes canonical JSON to `out`, or to stdout when no path is given.
pub fn emit<T: Serialize>(value: &T, out: Option<&Path>) -> Result<(), TvsError> {
    let mut bytes = to_canonical_json_bytes(value)?;
    bytes.push(b'\n');
    let written = match out {
        Some(path) => fs::write(path, &bytes),
        None => std::io::stdout().lock().write_all(&bytes),
    };
    written.map_err(|err| {
        let info = ErrorInfo::new("file_write", err.to_string());
        TvsError::Serde(match out {
            Some(path) => info.with_context("path", path.display().to_string()),
            None => info.with_context("path", "<stdout>"),
        })
    })
}
