use chrono::NaiveDate;

use crate::constants::*;
use crate::error::{ClientError, ClientResult};
use crate::models::BudgetRecommendation;
use crate::utils::round2;

/// Whether the last day of a trip counts towards its length.
///
/// With `Inclusive`, a trip from the 1st to the 5th lasts 5 days; with
/// `Exclusive` it lasts 4 and a same-day trip lasts 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationPolicy {
    #[default]
    Inclusive,
    Exclusive,
}

impl DurationPolicy {
    fn offset(&self) -> u32 {
        match self {
            DurationPolicy::Inclusive => 1,
            DurationPolicy::Exclusive => 0,
        }
    }
}

/// Trip length in whole days, `None` when the end precedes the start.
pub fn trip_duration(start: NaiveDate, end: NaiveDate, policy: DurationPolicy) -> Option<u32> {
    let days = (end - start).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days).ok().map(|d| d + policy.offset())
}

/// Acceptable budget range around a recommended total.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBand {
    pub lower: f64,
    pub upper: f64,
    pub currency: String,
}

impl BudgetBand {
    pub fn from_recommendation(recommendation: &BudgetRecommendation) -> Self {
        let total = recommendation.total_budget.max(0.0);
        Self {
            lower: round2(total * BAND_LOWER_FACTOR),
            upper: round2(total * BAND_UPPER_FACTOR),
            currency: recommendation.currency.clone(),
        }
    }

    /// Both ends are inclusive and already rounded to cents.
    pub fn contains(&self, budget: f64) -> bool {
        budget >= self.lower && budget <= self.upper
    }

    /// "50.00–150.00 GBP"
    pub fn range_label(&self) -> String {
        format!(
            "{:.2}–{:.2} {}",
            self.lower, self.upper,
            self.currency
        )
    }

    pub fn message(&self) -> String {
        format!(
            "Budget must be between {:.2} and {:.2} {}",
            self.lower, self.upper,
            self.currency
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetCheck {
    pub valid: bool,
    /// Band derived from the current recommendation, if any
    pub band: Option<BudgetBand>,
    /// Inline error text, set only when `valid` is false
    pub message: Option<String>,
}

impl BudgetCheck {
    fn ok(band: Option<BudgetBand>) -> Self {
        Self {
            valid: true,
            band,
            message: None,
        }
    }

    fn rejected(band: Option<BudgetBand>, message: String) -> Self {
        Self {
            valid: false,
            band,
            message: Some(message),
        }
    }

    pub fn into_result(self) -> ClientResult<()> {
        match self.message {
            Some(message) if !self.valid => Err(ClientError::Validation(message)),
            _ => Ok(()),
        }
    }
}

/// Validate a candidate budget against the current recommendation.
///
/// Without a recommendation any finite, non-negative budget passes.
pub fn check_budget(candidate: f64, recommendation: Option<&BudgetRecommendation>) -> BudgetCheck {
    let band = recommendation.map(BudgetBand::from_recommendation);

    if !candidate.is_finite() || candidate < 0.0 {
        return BudgetCheck::rejected(band, ERR_INVALID_BUDGET.to_string());
    }

    match band {
        Some(band) if !band.contains(candidate) => {
            let message = band.message();
            BudgetCheck::rejected(Some(band), message)
        }
        band => BudgetCheck::ok(band),
    }
}

pub fn apply_recommended(recommendation: &BudgetRecommendation) -> f64 {
    round2(recommendation.total_budget)
}

/// Budget at `percent` of the recommended total, for the adjustment slider.
///
/// The result is clamped to the band so the slider ends never produce a
/// budget that `check_budget` refuses.
pub fn adjust_by_percentage(
    recommendation: &BudgetRecommendation,
    percent: u32,
) -> ClientResult<f64> {
    if !(MIN_ADJUST_PERCENT..=MAX_ADJUST_PERCENT).contains(&percent) {
        return Err(ClientError::Validation(format!(
            "Adjustment must be between {}% and {}%",
            MIN_ADJUST_PERCENT, MAX_ADJUST_PERCENT
        )));
    }
    let band = BudgetBand::from_recommendation(recommendation);
    let budget = round2(recommendation.total_budget.max(0.0) * f64::from(percent) / 100.0);
    Ok(budget.clamp(band.lower, band.upper))
}
