//! Summaries for the analytics pages, computed from the backend's
//! aggregated spending figures.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::api::ApiClient;
use crate::budget::{DurationPolicy, trip_duration};
use crate::error::ClientResult;
use crate::models::{ExpenseCategory, TripAnalytics, TripId, TripSpending, TripsAnalytics};
use crate::utils::{parse_date, round2};

/// `value` as a percentage of `total`, 0 when there is no total.
pub fn percentage(value: f64, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    round2(value / total * 100.0)
}

/// Spend per day over the whole trip, counting both end days.
pub fn daily_average(total_spent: f64, start: NaiveDate, end: NaiveDate) -> f64 {
    match trip_duration(start, end, DurationPolicy::Inclusive) {
        Some(days) if days > 0 => round2(total_spent / f64::from(days)),
        _ => 0.0,
    }
}

/// Trips shown on the analytics page: those already over, plus those in
/// their final day.
pub fn completed_trips(trips: &[TripSpending], today: NaiveDate) -> Vec<&TripSpending> {
    trips
        .iter()
        .filter(|t| {
            let remaining = (t.end_date - today).num_days();
            remaining <= 0 || remaining == 1
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub percentage: f64,
}

/// One entry per category, in display order, including empty ones.
pub fn category_breakdown(spending: &BTreeMap<String, f64>) -> Vec<CategoryShare> {
    let amounts: Vec<(ExpenseCategory, f64)> = ExpenseCategory::ALL
        .into_iter()
        .map(|category| {
            let amount = spending.get(category.as_str()).copied().unwrap_or(0.0);
            (category, round2(amount))
        })
        .collect();
    let total: f64 = amounts.iter().map(|(_, amount)| amount).sum();

    amounts
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            percentage: percentage(amount, total),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySpend {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Daily totals in date order. Keys that are not dates are dropped.
pub fn daily_spending(spending: &BTreeMap<String, f64>) -> Vec<DailySpend> {
    let mut days: Vec<DailySpend> = spending
        .iter()
        .filter_map(|(key, amount)| match parse_date(key) {
            Some(date) => Some(DailySpend {
                date,
                amount: round2(*amount),
            }),
            None => {
                tracing::debug!(key, "skipping non-date spending key");
                None
            }
        })
        .collect();
    days.sort_by_key(|d| d.date);
    days
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub percent_used: f64,
}

impl SpendingSummary {
    pub fn new(total_budget: f64, total_spent: f64) -> Self {
        Self {
            total_budget: round2(total_budget),
            total_spent: round2(total_spent),
            remaining: round2(total_budget - total_spent),
            percent_used: percentage(total_spent, total_budget),
        }
    }
}

/// Analytics across all trips.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub summary: SpendingSummary,
    pub completed: Vec<TripSpending>,
    pub categories: Vec<CategoryShare>,
    pub daily: Vec<DailySpend>,
}

impl Overview {
    pub fn build(analytics: &TripsAnalytics, today: NaiveDate) -> Self {
        Self {
            summary: SpendingSummary::new(analytics.total_budget, analytics.total_spent),
            completed: completed_trips(&analytics.trips, today)
                .into_iter()
                .cloned()
                .collect(),
            categories: category_breakdown(&analytics.categories),
            daily: daily_spending(&analytics.daily_spending),
        }
    }

    pub async fn fetch(api: &ApiClient, today: NaiveDate) -> ClientResult<Self> {
        let analytics = api.get_trips_analytics().await?;
        Ok(Self::build(&analytics, today))
    }
}

/// Analytics for a single trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripReport {
    pub trip_name: String,
    pub summary: SpendingSummary,
    pub daily_average: f64,
    pub categories: Vec<CategoryShare>,
    pub daily: Vec<DailySpend>,
}

impl TripReport {
    pub fn build(analytics: &TripAnalytics) -> Self {
        Self {
            trip_name: analytics.trip_name.clone(),
            summary: SpendingSummary::new(analytics.total_budget, analytics.total_spent),
            daily_average: daily_average(
                analytics.total_spent,
                analytics.start_date,
                analytics.end_date,
            ),
            categories: category_breakdown(&analytics.category_spending),
            daily: daily_spending(&analytics.daily_spending),
        }
    }

    pub async fn fetch(api: &ApiClient, trip_id: TripId) -> ClientResult<Self> {
        let analytics = api.get_trip_analytics(trip_id).await?;
        Ok(Self::build(&analytics))
    }
}
