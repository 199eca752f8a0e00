use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use tvs_core::EntityKind;

/// Origin of a selectable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    /// Part of the fixed demographic schema.
    Core,
    /// Business-configurable attribute.
    Flex,
    /// Attribute collected in numbered rounds.
    Periodic,
}

/// Declared type of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    /// Free text.
    String,
    /// Integer or decimal.
    Number,
    /// True or false.
    Bool,
    /// Calendar date.
    Date,
    /// One (or several) of the declared choice values.
    Choice,
    /// Numeric attribute presented as a range selector.
    Range,
}

impl ValueType {
    /// Operators that have defined semantics for this value type.
    pub fn supported_operators(self) -> &'static [Operator] {
        use Operator::*;
        match self {
            ValueType::String | ValueType::Choice => &[Equals, NotEquals, In, Contains],
            ValueType::Number | ValueType::Date | ValueType::Range => {
                &[Equals, NotEquals, In, Gte, Lte, Between, Range]
            }
            ValueType::Bool => &[Equals],
        }
    }

    /// Returns true when `operator` is registered for this value type.
    pub fn supports(self, operator: Operator) -> bool {
        self.supported_operators().contains(&operator)
    }

    /// Returns true for types compared by magnitude.
    pub fn is_ordered(self) -> bool {
        matches!(self, ValueType::Number | ValueType::Date | ValueType::Range)
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueType::String => "STRING",
            ValueType::Number => "NUMBER",
            ValueType::Bool => "BOOL",
            ValueType::Date => "DATE",
            ValueType::Choice => "CHOICE",
            ValueType::Range => "RANGE",
        };
        f.write_str(label)
    }
}

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// Exact match.
    Equals,
    /// Negated exact match.
    NotEquals,
    /// Membership in the argument list.
    In,
    /// Inclusive range whose bounds may be open (`null`).
    Range,
    /// Case-insensitive substring match.
    Contains,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
    /// Inclusive range with both bounds present.
    Between,
}

impl Operator {
    /// Inclusive bounds on the number of arguments, `None` meaning unbounded.
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Operator::Equals
            | Operator::NotEquals
            | Operator::Contains
            | Operator::Gte
            | Operator::Lte => (1, Some(1)),
            Operator::In => (1, None),
            Operator::Range | Operator::Between => (2, Some(2)),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operator::Equals => "EQUALS",
            Operator::NotEquals => "NOT_EQUALS",
            Operator::In => "IN",
            Operator::Range => "RANGE",
            Operator::Contains => "CONTAINS",
            Operator::Gte => "GTE",
            Operator::Lte => "LTE",
            Operator::Between => "BETWEEN",
        };
        f.write_str(label)
    }
}

/// A legal value for a [`ValueType::Choice`] field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Stored value.
    pub value: String,
    /// Display label.
    pub label: String,
}

/// Catalog entry describing one selectable field.
///
/// Descriptors are immutable once a catalog is built; the registry hands them
/// out behind `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique field name used by predicates and record attribute maps.
    pub name: String,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Origin of the field.
    pub kind: FieldKind,
    /// Declared value type (for periodic fields, the type of each round).
    pub value_type: ValueType,
    /// Entity kind whose records carry this field.
    pub associated_with: EntityKind,
    /// Operators callers may use with this field.
    pub allowed_operators: BTreeSet<Operator>,
    /// Legal values for choice fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceOption>,
    /// Number of collection rounds, periodic fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_count: Option<u32>,
    /// Display names of the rounds, periodic fields only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rounds_names: Vec<String>,
}

impl FieldDescriptor {
    /// Returns true for round-based fields.
    pub fn is_periodic(&self) -> bool {
        self.kind == FieldKind::Periodic
    }

    /// Returns true when `operator` is in this field's allowed set.
    pub fn allows(&self, operator: Operator) -> bool {
        self.allowed_operators.contains(&operator)
    }

    /// Returns true when `value` is one of the declared choice values.
    pub fn has_choice(&self, value: &str) -> bool {
        self.choices.iter().any(|choice| choice.value == value)
    }

    /// Returns the display name of a one-based round number.
    pub fn round_name(&self, round: u32) -> Option<&str> {
        let idx = usize::try_from(round).ok()?.checked_sub(1)?;
        self.rounds_names.get(idx).map(String::as_str)
    }
}
