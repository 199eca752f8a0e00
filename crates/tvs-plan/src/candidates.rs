use serde_json::Value;
use tvs_core::errors::{ErrorInfo, TvsError};
use tvs_criteria::{coerce_scalar, AttributeSource, Household, Scalar};
use tvs_fields::ValueType;
use tvs_sampling::{SamplingCandidate, Sex};

/// Attribute of the head of household holding the age in years.
pub const AGE_ATTRIBUTE: &str = "age";
/// Attribute of the head of household holding the recorded sex.
pub const SEX_ATTRIBUTE: &str = "sex";

/// Builds the sampling candidate for a selected household.
///
/// Age and sex are read from the head of household; a missing head, a
/// missing attribute or an unrecognised sex leaves the value unknown. An age
/// that is present but not numeric is a `TypeMismatch`.
pub fn candidate_for(household: &Household) -> Result<SamplingCandidate, TvsError> {
    let head = household.head();
    let age = match head.and_then(|head| head.attribute(AGE_ATTRIBUTE)) {
        Some(raw) => age_years(raw, household)?,
        None => None,
    };
    let sex = head
        .and_then(|head| head.attribute(SEX_ATTRIBUTE))
        .and_then(parse_sex);
    Ok(SamplingCandidate {
        id: household.id.clone(),
        age,
        sex,
        admin_area: household.admin_area.clone(),
    })
}

fn age_years(raw: &Value, household: &Household) -> Result<Option<u32>, TvsError> {
    match coerce_scalar(raw, ValueType::Number) {
        Ok(Some(Scalar::Number(years))) if years >= 0.0 && years <= u32::MAX as f64 => {
            Ok(Some(years.floor() as u32))
        }
        Ok(_) => Ok(None),
        Err(failure) => Err(TvsError::TypeMismatch(
            ErrorInfo::new(
                "head_age",
                format!("head of household age `{}` is not a number", failure.found),
            )
            .with_context("field", AGE_ATTRIBUTE)
            .with_context("record", household.id.as_str()),
        )),
    }
}

fn parse_sex(raw: &Value) -> Option<Sex> {
    let text = raw.as_str()?.trim();
    if text.eq_ignore_ascii_case("male") {
        Some(Sex::Male)
    } else if text.eq_ignore_ascii_case("female") {
        Some(Sex::Female)
    } else {
        None
    }
}
