use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tvs_core::{AreaId, EntityId};

/// Value recorded for one round of a periodic field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundValue {
    /// Collected value.
    pub value: Value,
    /// Date the round was collected, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<NaiveDate>,
}

/// Periodic values keyed by field name and then by one-based round number.
pub type PeriodicValues = BTreeMap<String, BTreeMap<u32, RoundValue>>;

/// Uniform attribute access over households and individuals.
pub trait AttributeSource {
    /// Identifier of the record.
    fn id(&self) -> &EntityId;

    /// Value of a core or flex field, if present.
    fn attribute(&self, field: &str) -> Option<&Value>;

    /// Value of a periodic field for the given round, if collected.
    fn round_value(&self, field: &str, round: u32) -> Option<&Value>;
}

/// A flattened individual record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Record identifier.
    pub id: EntityId,
    /// Core and flex attribute values.
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    /// Periodic attribute values.
    #[serde(default)]
    pub periodic: PeriodicValues,
}

impl EntityRecord {
    /// Creates a record without attributes.
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
            periodic: BTreeMap::new(),
        }
    }

    /// Sets an attribute and returns the record.
    pub fn with_attribute(mut self, field: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(field.into(), value);
        self
    }

    /// Records a periodic round value and returns the record.
    pub fn with_round(mut self, field: impl Into<String>, round: u32, value: Value) -> Self {
        self.periodic.entry(field.into()).or_default().insert(
            round,
            RoundValue {
                value,
                collection_date: None,
            },
        );
        self
    }
}

impl AttributeSource for EntityRecord {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn attribute(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    fn round_value(&self, field: &str, round: u32) -> Option<&Value> {
        round_lookup(&self.periodic, field, round)
    }
}

/// A flattened household record with its members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    /// Household identifier.
    pub id: EntityId,
    /// Administrative area the household lives in.
    #[serde(default)]
    pub admin_area: Option<AreaId>,
    /// Identifier of the head of household among `members`.
    #[serde(default)]
    pub head_id: Option<EntityId>,
    /// Core and flex attribute values.
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    /// Periodic attribute values.
    #[serde(default)]
    pub periodic: PeriodicValues,
    /// Member individuals.
    #[serde(default)]
    pub members: Vec<EntityRecord>,
}

impl Household {
    /// Creates a household without attributes or members.
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            admin_area: None,
            head_id: None,
            attributes: BTreeMap::new(),
            periodic: BTreeMap::new(),
            members: Vec::new(),
        }
    }

    /// Sets an attribute and returns the household.
    pub fn with_attribute(mut self, field: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(field.into(), value);
        self
    }

    /// Records a periodic round value and returns the household.
    pub fn with_round(mut self, field: impl Into<String>, round: u32, value: Value) -> Self {
        self.periodic.entry(field.into()).or_default().insert(
            round,
            RoundValue {
                value,
                collection_date: None,
            },
        );
        self
    }

    /// Sets the administrative area and returns the household.
    pub fn in_area(mut self, area: impl Into<AreaId>) -> Self {
        self.admin_area = Some(area.into());
        self
    }

    /// Adds a member; the first member added with `head = true` becomes head.
    pub fn with_member(mut self, member: EntityRecord, head: bool) -> Self {
        if head && self.head_id.is_none() {
            self.head_id = Some(member.id.clone());
        }
        self.members.push(member);
        self
    }

    /// Returns the head of household, if declared and present.
    pub fn head(&self) -> Option<&EntityRecord> {
        let head_id = self.head_id.as_ref()?;
        self.members.iter().find(|member| &member.id == head_id)
    }
}

impl AttributeSource for Household {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn attribute(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    fn round_value(&self, field: &str, round: u32) -> Option<&Value> {
        round_lookup(&self.periodic, field, round)
    }
}

fn round_lookup<'a>(periodic: &'a PeriodicValues, field: &str, round: u32) -> Option<&'a Value> {
    periodic
        .get(field)
        .and_then(|rounds| rounds.get(&round))
        .map(|entry| &entry.value)
}
