use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tvs_core::errors::{ErrorInfo, TvsError};
use tvs_core::{AreaId, EntityId};

/// Confidence levels accepted for random sampling, in percent.
pub const CONFIDENCE_LEVELS: [u32; 4] = [90, 95, 97, 99];

/// How the verification sample is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SamplingType {
    /// Every eligible record is verified.
    FullList,
    /// A confidence-bounded random sample is verified.
    Random,
}

/// Recorded sex of a head of household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
}

/// Sex stratification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SexFilter {
    /// Keep male heads only.
    Male,
    /// Keep female heads only.
    Female,
    /// No restriction.
    All,
}

impl SexFilter {
    /// Returns true when a candidate with `sex` passes the filter.
    pub fn admits(self, sex: Option<Sex>) -> bool {
        match self {
            SexFilter::All => true,
            SexFilter::Male => sex == Some(Sex::Male),
            SexFilter::Female => sex == Some(Sex::Female),
        }
    }
}

/// Inclusive age stratification filter in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgeFilter {
    /// Minimum age, inclusive.
    pub min: u32,
    /// Maximum age, inclusive.
    pub max: u32,
}

impl AgeFilter {
    /// Returns true when `age` is known and within bounds.
    pub fn admits(&self, age: Option<u32>) -> bool {
        age.map_or(false, |age| age >= self.min && age <= self.max)
    }
}

/// Parameters of one verification sampling request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParameters {
    /// Sampling mode.
    #[serde(rename = "type")]
    pub sampling_type: SamplingType,
    /// Confidence level in percent, random sampling only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_interval: Option<u32>,
    /// Margin of error in percent, random sampling only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_of_error: Option<f64>,
    /// Age stratification on the head of household.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_filter: Option<AgeFilter>,
    /// Sex stratification on the head of household.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex_filter: Option<SexFilter>,
    /// Administrative areas removed from the population.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub excluded_admin_areas: BTreeSet<AreaId>,
    /// Records removed from the population.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub excluded_record_ids: BTreeSet<EntityId>,
    /// Explicit seed for random selection.
    #[serde(default)]
    pub seed: u64,
}

impl SamplingParameters {
    /// Full-list parameters without filters.
    pub fn full_list() -> Self {
        Self {
            sampling_type: SamplingType::FullList,
            confidence_interval: None,
            margin_of_error: None,
            age_filter: None,
            sex_filter: None,
            excluded_admin_areas: BTreeSet::new(),
            excluded_record_ids: BTreeSet::new(),
            seed: 0,
        }
    }

    /// Random-sampling parameters without filters.
    pub fn random(confidence_interval: u32, margin_of_error: f64, seed: u64) -> Self {
        Self {
            sampling_type: SamplingType::Random,
            confidence_interval: Some(confidence_interval),
            margin_of_error: Some(margin_of_error),
            seed,
            ..Self::full_list()
        }
    }

    /// Checks the parameters, returning the validated `(confidence, margin)`
    /// pair for random sampling and `None` for full-list sampling.
    pub fn validate(&self) -> Result<Option<(u32, f64)>, TvsError> {
        if let Some(age) = &self.age_filter {
            if age.min > age.max {
                return Err(TvsError::InvalidSamplingParameters(
                    ErrorInfo::new("age_filter", "age filter minimum exceeds maximum")
                        .with_context("min", age.min.to_string())
                        .with_context("max", age.max.to_string()),
                ));
            }
        }
        if self.sampling_type == SamplingType::FullList {
            return Ok(None);
        }
        let confidence = self.confidence_interval.ok_or_else(|| {
            TvsError::InvalidSamplingParameters(
                ErrorInfo::new(
                    "confidence_interval",
                    "random sampling requires a confidence interval",
                )
                .with_context("parameter", "confidence_interval"),
            )
        })?;
        validate_confidence(confidence)?;
        let margin = self.margin_of_error.ok_or_else(|| {
            TvsError::InvalidSamplingParameters(
                ErrorInfo::new(
                    "margin_of_error",
                    "random sampling requires a margin of error",
                )
                .with_context("parameter", "margin_of_error"),
            )
        })?;
        validate_margin(margin)?;
        Ok(Some((confidence, margin)))
    }
}

pub(crate) fn validate_confidence(confidence: u32) -> Result<(), TvsError> {
    if CONFIDENCE_LEVELS.contains(&confidence) {
        return Ok(());
    }
    Err(TvsError::InvalidSamplingParameters(
        ErrorInfo::new(
            "confidence_interval",
            format!("confidence interval {confidence} is not supported"),
        )
        .with_context("parameter", "confidence_interval")
        .with_context("value", confidence.to_string())
        .with_hint("use one of 90, 95, 97, 99"),
    ))
}

pub(crate) fn validate_margin(margin: f64) -> Result<(), TvsError> {
    if margin.is_finite() && margin > 0.0 && margin <= 100.0 {
        return Ok(());
    }
    Err(TvsError::InvalidSamplingParameters(
        ErrorInfo::new(
            "margin_of_error",
            format!("margin of error {margin} is outside (0, 100]"),
        )
        .with_context("parameter", "margin_of_error")
        .with_context("value", margin.to_string())
        .with_hint("give the margin as a percentage, e.g. 5"),
    ))
}
