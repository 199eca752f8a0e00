use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tvs_core::errors::{ErrorInfo, TvsError};
use tvs_fields::{FieldCatalog, FieldDescriptor, Operator, ValueType};

use crate::record::AttributeSource;
use crate::value::{coerce_scalar, coerce_stored, CoercionFailure, Scalar};

/// One typed comparison against one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Registered field the predicate reads.
    pub field_name: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Operator arguments, coerced to the field's value type.
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// One-based round, required iff the field is periodic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_number: Option<u32>,
}

impl Predicate {
    /// Creates a predicate on a non-periodic field.
    pub fn new(field_name: impl Into<String>, operator: Operator, arguments: Vec<Value>) -> Self {
        Self {
            field_name: field_name.into(),
            operator,
            arguments,
            round_number: None,
        }
    }

    /// Sets the round number and returns the predicate.
    pub fn in_round(mut self, round: u32) -> Self {
        self.round_number = Some(round);
        self
    }
}

#[derive(Debug, Clone)]
enum Comparison {
    Equals(Scalar),
    NotEquals(Scalar),
    In(Vec<Scalar>),
    Contains(String),
    Bounds {
        min: Option<Scalar>,
        max: Option<Scalar>,
    },
}

/// A predicate resolved against a catalog with arguments already coerced.
///
/// Compilation performs every check that does not depend on a record, so
/// evaluation can only fail on a stored value that does not fit the field.
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    field: Arc<FieldDescriptor>,
    round: Option<u32>,
    comparison: Comparison,
}

impl CompiledPredicate {
    /// Resolves and validates `predicate` against `catalog`.
    pub fn compile(predicate: &Predicate, catalog: &FieldCatalog) -> Result<Self, TvsError> {
        let field = Arc::clone(catalog.resolve(&predicate.field_name)?);
        let operator = predicate.operator;
        if !field.value_type.supports(operator) || !field.allows(operator) {
            return Err(TvsError::UnknownOperator(
                ErrorInfo::new(
                    "operator_not_registered",
                    format!(
                        "operator {operator} is not registered for field `{}`",
                        field.name
                    ),
                )
                .with_context("field", field.name.as_str())
                .with_context("operator", operator.to_string())
                .with_context("value_type", field.value_type.to_string()),
            ));
        }
        let round = check_round(predicate, &field)?;
        check_arity(predicate, &field)?;
        let comparison = build_comparison(predicate, &field)?;
        Ok(Self {
            field,
            round,
            comparison,
        })
    }

    /// Descriptor of the field this predicate reads.
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    /// Evaluates the predicate against one record.
    ///
    /// A missing attribute, a missing periodic round and a `null` value all
    /// evaluate to `false`.
    pub fn evaluate<R: AttributeSource + ?Sized>(&self, record: &R) -> Result<bool, TvsError> {
        let stored = match self.round {
            Some(round) => record.round_value(&self.field.name, round),
            None => record.attribute(&self.field.name),
        };
        let Some(stored) = stored else {
            return Ok(false);
        };
        let values = coerce_stored(stored, self.field.value_type)
            .map_err(|failure| self.stored_mismatch(record, failure))?;
        if values.is_empty() {
            return Ok(false);
        }
        Ok(self.matches(&values))
    }

    fn matches(&self, values: &[Scalar]) -> bool {
        match &self.comparison {
            Comparison::Equals(expected) => values.iter().any(|value| value == expected),
            Comparison::NotEquals(expected) => values.iter().all(|value| value != expected),
            Comparison::In(options) => values.iter().any(|value| options.contains(value)),
            Comparison::Contains(needle) => values.iter().any(|value| match value {
                Scalar::Text(text) => text.to_lowercase().contains(needle.as_str()),
                _ => false,
            }),
            Comparison::Bounds { min, max } => values.iter().any(|value| {
                let above = min.as_ref().map_or(true, |min| {
                    matches!(
                        value.compare(min),
                        Some(Ordering::Greater) | Some(Ordering::Equal)
                    )
                });
                let below = max.as_ref().map_or(true, |max| {
                    matches!(
                        value.compare(max),
                        Some(Ordering::Less) | Some(Ordering::Equal)
                    )
                });
                above && below
            }),
        }
    }

    fn stored_mismatch<R: AttributeSource + ?Sized>(
        &self,
        record: &R,
        failure: CoercionFailure,
    ) -> TvsError {
        let mut info = ErrorInfo::new(
            "stored_value_mismatch",
            format!(
                "stored value for `{}` cannot be read as {}",
                self.field.name, failure.expected
            ),
        )
        .with_context("field", self.field.name.as_str())
        .with_context("record", record.id().as_str())
        .with_context("value", failure.found);
        if let Some(round) = self.round {
            info = info.with_context("round", round.to_string());
        }
        TvsError::TypeMismatch(info)
    }
}

/// Compiles and evaluates a single predicate against one record.
pub fn evaluate<R: AttributeSource + ?Sized>(
    predicate: &Predicate,
    record: &R,
    catalog: &FieldCatalog,
) -> Result<bool, TvsError> {
    CompiledPredicate::compile(predicate, catalog)?.evaluate(record)
}

fn invalid_predicate(code: &str, field: &FieldDescriptor, message: String) -> TvsError {
    TvsError::InvalidPredicate(
        ErrorInfo::new(code, message).with_context("field", field.name.as_str()),
    )
}

fn check_round(predicate: &Predicate, field: &FieldDescriptor) -> Result<Option<u32>, TvsError> {
    match (field.is_periodic(), predicate.round_number) {
        (true, None) => Err(invalid_predicate(
            "missing_round",
            field,
            format!("periodic field `{}` requires a round number", field.name),
        )),
        (false, Some(_)) => Err(invalid_predicate(
            "unexpected_round",
            field,
            format!("field `{}` is not periodic", field.name),
        )),
        (true, Some(round)) => {
            let rounds = field.round_count.unwrap_or(0);
            if round == 0 || round > rounds {
                return Err(TvsError::InvalidPredicate(
                    ErrorInfo::new(
                        "round_out_of_range",
                        format!("round {round} is outside 1..={rounds}"),
                    )
                    .with_context("field", field.name.as_str())
                    .with_context("round", round.to_string()),
                ));
            }
            Ok(Some(round))
        }
        (false, None) => Ok(None),
    }
}

fn check_arity(predicate: &Predicate, field: &FieldDescriptor) -> Result<(), TvsError> {
    let (min, max) = predicate.operator.arity();
    let given = predicate.arguments.len();
    if given < min || max.map_or(false, |max| given > max) {
        let expected = match max {
            Some(max) if max == min => min.to_string(),
            Some(max) => format!("{min}..={max}"),
            None => format!("at least {min}"),
        };
        return Err(TvsError::InvalidPredicate(
            ErrorInfo::new(
                "argument_count",
                format!(
                    "{} expects {expected} argument(s), got {given}",
                    predicate.operator
                ),
            )
            .with_context("field", field.name.as_str())
            .with_context("operator", predicate.operator.to_string()),
        ));
    }
    Ok(())
}

fn argument_mismatch(
    field: &FieldDescriptor,
    position: usize,
    found: String,
    reason: &str,
) -> TvsError {
    TvsError::TypeMismatch(
        ErrorInfo::new(
            "argument_mismatch",
            format!("argument {position} for `{}` {reason}", field.name),
        )
        .with_context("field", field.name.as_str())
        .with_context("argument", found),
    )
}

fn argument(
    raw: &Value,
    field: &FieldDescriptor,
    position: usize,
    nullable: bool,
) -> Result<Option<Scalar>, TvsError> {
    let scalar = coerce_scalar(raw, field.value_type).map_err(|failure| {
        let reason = format!("cannot be read as {}", failure.expected);
        argument_mismatch(field, position, failure.found, &reason)
    })?;
    match scalar {
        None if !nullable => Err(argument_mismatch(
            field,
            position,
            "null".into(),
            "must not be null",
        )),
        scalar => Ok(scalar),
    }
}

fn required(raw: &Value, field: &FieldDescriptor, position: usize) -> Result<Scalar, TvsError> {
    argument(raw, field, position, false)?
        .ok_or_else(|| argument_mismatch(field, position, "null".into(), "must not be null"))
}

/// Exact-match argument; choice fields only accept declared values.
fn declared(raw: &Value, field: &FieldDescriptor, position: usize) -> Result<Scalar, TvsError> {
    match required(raw, field, position)? {
        Scalar::Text(choice)
            if field.value_type == ValueType::Choice && !field.has_choice(&choice) =>
        {
            Err(argument_mismatch(field, position, choice, "is not a declared choice"))
        }
        scalar => Ok(scalar),
    }
}

fn build_comparison(
    predicate: &Predicate,
    field: &FieldDescriptor,
) -> Result<Comparison, TvsError> {
    let args = &predicate.arguments;
    let comparison = match predicate.operator {
        Operator::Equals => Comparison::Equals(declared(&args[0], field, 0)?),
        Operator::NotEquals => Comparison::NotEquals(declared(&args[0], field, 0)?),
        Operator::In => Comparison::In(
            args.iter()
                .enumerate()
                .map(|(idx, raw)| declared(raw, field, idx))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Operator::Contains => match required(&args[0], field, 0)? {
            Scalar::Text(needle) => Comparison::Contains(needle.to_lowercase()),
            _ => {
                return Err(TvsError::TypeMismatch(
                    ErrorInfo::new("argument_mismatch", "CONTAINS needs a text argument")
                        .with_context("field", field.name.as_str()),
                ));
            }
        },
        Operator::Gte => Comparison::Bounds {
            min: Some(required(&args[0], field, 0)?),
            max: None,
        },
        Operator::Lte => Comparison::Bounds {
            min: None,
            max: Some(required(&args[0], field, 0)?),
        },
        Operator::Between => {
            let min = required(&args[0], field, 0)?;
            let max = required(&args[1], field, 1)?;
            check_bounds(&min, &max, predicate, field)?;
            Comparison::Bounds {
                min: Some(min),
                max: Some(max),
            }
        }
        Operator::Range => {
            let min = argument(&args[0], field, 0, true)?;
            let max = argument(&args[1], field, 1, true)?;
            if let (Some(min), Some(max)) = (&min, &max) {
                check_bounds(min, max, predicate, field)?;
            }
            Comparison::Bounds { min, max }
        }
    };
    Ok(comparison)
}

fn check_bounds(
    min: &Scalar,
    max: &Scalar,
    predicate: &Predicate,
    field: &FieldDescriptor,
) -> Result<(), TvsError> {
    if min.compare(max) == Some(Ordering::Greater) {
        return Err(TvsError::InvalidRange(
            ErrorInfo::new(
                "min_greater_than_max",
                format!("{} bounds are reversed", predicate.operator),
            )
            .with_context("field", field.name.as_str())
            .with_context("min", predicate.arguments[0].to_string())
            .with_context("max", predicate.arguments[1].to_string()),
        ));
    }
    Ok(())
}
