#![deny(missing_docs)]
#![doc = "Field registry: catalog of selectable core, flex and periodic fields with type and operator metadata."]

/// Validated field catalog.
pub mod catalog;
/// Field, value type and operator descriptors.
pub mod descriptor;
/// Atomically reloadable registry handle.
pub mod registry;
pub mod source;

pub use catalog::FieldCatalog;
pub use descriptor::{ChoiceOption, FieldDescriptor, FieldKind, Operator, ValueType};
pub use registry::FieldRegistry;
pub use source::{load_document, load_field_source, FieldDefinition, FieldSource, PduData};
