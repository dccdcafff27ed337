//! Why a trip cannot be submitted yet.
//!
//! The UI shows a localized advice message next to the disabled submit
//! action. Only the condition and the label key are decided here.

use serde::Serialize;
use std::fmt;

use crate::step::Step;

/// Which of the two trip forms a step list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TripForm {
    First,
    Second,
}

impl TripForm {
    fn as_str(&self) -> &'static str {
        match self {
            TripForm::First => "first",
            TripForm::Second => "second",
        }
    }
}

/// A step list failed the completeness check.
///
/// Positions are 1-based, matching `Step::index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub form: TripForm,
    pub too_few_steps: bool,
    pub missing_locations: Vec<usize>,
    pub missing_modes: Vec<usize>,
}

impl ValidationError {
    /// Number of problems the advice message refers to.
    pub fn count(&self) -> usize {
        if self.too_few_steps {
            return 1;
        }
        self.missing_locations.len() + self.missing_modes.len()
    }

    pub fn is_plural(&self) -> bool {
        self.count() > 1
    }

    /// Label key for the advice message, e.g.
    /// `advice.missing_modes.plural.second`.
    pub fn advice_key(&self) -> String {
        let kind = if self.too_few_steps {
            "too_few_steps"
        } else {
            match (
                self.missing_locations.is_empty(),
                self.missing_modes.is_empty(),
            ) {
                (false, true) => "missing_locations",
                (true, false) => "missing_modes",
                _ => "missing_both",
            }
        };
        let number = if self.is_plural() { "plural" } else { "singular" };
        format!("advice.{kind}.{number}.{}", self.form.as_str())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.too_few_steps {
            return write!(f, "{} trip needs at least two steps", self.form.as_str());
        }
        write!(f, "{} trip is incomplete", self.form.as_str())?;
        if !self.missing_locations.is_empty() {
            write!(f, "; missing location at {:?}", self.missing_locations)?;
        }
        if !self.missing_modes.is_empty() {
            write!(f, "; missing transport at {:?}", self.missing_modes)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Checks `steps` the same way [`crate::step::is_complete`] does, but reports
/// what is missing.
pub fn validate(steps: &[Step], form: TripForm) -> Result<(), ValidationError> {
    let missing_locations: Vec<usize> = steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.location_coords.is_none())
        .map(|(i, _)| i + 1)
        .collect();
    let missing_modes: Vec<usize> = steps
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, s)| s.transport_mean.is_none())
        .map(|(i, _)| i + 1)
        .collect();
    let too_few_steps = steps.len() < 2;

    if !too_few_steps && missing_locations.is_empty() && missing_modes.is_empty() {
        return Ok(());
    }

    Err(ValidationError {
        form,
        too_few_steps,
        missing_locations,
        missing_modes,
    })
}
