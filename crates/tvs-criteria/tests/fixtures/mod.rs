#![allow(dead_code)]

use serde_json::json;
use tvs_core::EntityKind;
use tvs_criteria::{EntityRecord, Household};
use tvs_fields::{
    ChoiceOption, FieldCatalog, FieldDescriptor, FieldKind, ValueType,
};

pub fn field(
    name: &str,
    kind: FieldKind,
    value_type: ValueType,
    scope: EntityKind,
) -> FieldDescriptor {
    FieldDescriptor {
        name: name.into(),
        label: None,
        kind,
        value_type,
        associated_with: scope,
        allowed_operators: value_type.supported_operators().iter().copied().collect(),
        choices: Vec::new(),
        round_count: None,
        rounds_names: Vec::new(),
    }
}

/// Household fields `size`, `village`, `has_latrine`, `residence_status`,
/// `water_score` (3 rounds) and individual fields `age`, `sex`, `disability`,
/// `muac` (2 rounds).
pub fn catalog() -> FieldCatalog {
    let mut residence = field(
        "residence_status",
        FieldKind::Core,
        ValueType::Choice,
        EntityKind::Household,
    );
    residence.choices = ["IDP", "REFUGEE", "HOST"]
        .iter()
        .map(|value| ChoiceOption {
            value: (*value).into(),
            label: value.to_lowercase(),
        })
        .collect();
    let mut sex = field("sex", FieldKind::Core, ValueType::Choice, EntityKind::Individual);
    sex.choices = ["MALE", "FEMALE"]
        .iter()
        .map(|value| ChoiceOption {
            value: (*value).into(),
            label: value.to_lowercase(),
        })
        .collect();
    let mut water = field(
        "water_score",
        FieldKind::Periodic,
        ValueType::Number,
        EntityKind::Household,
    );
    water.round_count = Some(3);
    water.rounds_names = vec!["Jan".into(), "Feb".into(), "Mar".into()];
    let mut muac = field("muac", FieldKind::Periodic, ValueType::Number, EntityKind::Individual);
    muac.round_count = Some(2);
    FieldCatalog::from_descriptors(vec![
        field("size", FieldKind::Core, ValueType::Number, EntityKind::Household),
        field("village", FieldKind::Core, ValueType::String, EntityKind::Household),
        field("has_latrine", FieldKind::Flex, ValueType::Bool, EntityKind::Household),
        residence,
        water,
        field("age", FieldKind::Core, ValueType::Number, EntityKind::Individual),
        sex,
        field("disability", FieldKind::Flex, ValueType::Bool, EntityKind::Individual),
        muac,
    ])
    .expect("catalog")
}

pub fn person(id: &str, age: u32, sex: &str) -> EntityRecord {
    EntityRecord::new(id)
        .with_attribute("age", json!(age))
        .with_attribute("sex", json!(sex))
}

pub fn household(id: &str, size: u32, village: &str) -> Household {
    Household::new(id)
        .with_attribute("size", json!(size))
        .with_attribute("village", json!(village))
}
