use chrono::NaiveDate;

use crate::constants::*;
use crate::currency::resolve_code;
use crate::error::{ClientError, ClientResult};
use crate::models::{Expense, ExpenseCategory, ExpenseId, ExpensePayload, Trip, TripId};
use crate::ports::ExpenseStore;
use crate::trips::TripList;
use crate::utils::{require_confirmation, round2};

/// Expense form contents before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub editing: Option<ExpenseId>,
    pub trip: Option<TripId>,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub category: ExpenseCategory,
    pub description: String,
    pub currency: Option<String>,
}

impl Default for ExpenseDraft {
    fn default() -> Self {
        Self {
            editing: None,
            trip: None,
            amount: 0.0,
            date: None,
            category: ExpenseCategory::Food,
            description: String::new(),
            currency: None,
        }
    }
}

impl ExpenseDraft {
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            editing: Some(expense.id),
            trip: Some(expense.trip),
            amount: expense.amount,
            date: Some(expense.date),
            category: expense.category,
            description: expense.description.clone().unwrap_or_default(),
            currency: Some(expense.original_currency.clone()),
        }
    }

    /// Check the draft against the user's trips.
    ///
    /// The date must fall inside the selected trip and cannot be after
    /// `today`.
    pub fn validate(&self, trips: &TripList, today: NaiveDate) -> Result<ExpensePayload, String> {
        let trip = self
            .trip
            .and_then(|id| trips.get(id))
            .ok_or_else(|| ERR_SELECT_TRIP.to_string())?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ERR_INVALID_AMOUNT.to_string());
        }
        let date = self.date.ok_or_else(|| ERR_SELECT_DATE.to_string())?;
        if date > today {
            return Err(ERR_EXPENSE_IN_FUTURE.to_string());
        }
        if date < trip.start_date || date > trip.end_date {
            return Err(ERR_EXPENSE_OUTSIDE_TRIP.to_string());
        }

        Ok(ExpensePayload {
            trip: trip.id,
            amount: round2(self.amount),
            date,
            category: self.category,
            description: self.description.trim().to_string(),
            original_currency: resolve_code(self.currency.as_deref()),
        })
    }
}

/// The user's expenses across all trips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseLog {
    expenses: Vec<Expense>,
}

impl ExpenseLog {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self { expenses }
    }

    pub async fn load(store: &dyn ExpenseStore) -> ClientResult<Self> {
        let expenses = store
            .list_expenses()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to fetch expenses"))?;
        Ok(Self::new(expenses))
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Newest first.
    pub fn for_trip(&self, trip_id: TripId) -> Vec<&Expense> {
        let mut expenses: Vec<&Expense> =
            self.expenses.iter().filter(|e| e.trip == trip_id).collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        expenses
    }

    pub fn spent_for_trip(&self, trip_id: TripId) -> f64 {
        round2(
            self.expenses
                .iter()
                .filter(|e| e.trip == trip_id)
                .map(|e| e.amount)
                .sum(),
        )
    }

    fn upsert(&mut self, expense: Expense) {
        match self.expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(slot) => *slot = expense,
            None => self.expenses.push(expense),
        }
    }

    /// Validate and save `draft`, creating or updating as appropriate.
    pub async fn submit(
        &mut self,
        store: &dyn ExpenseStore,
        draft: &ExpenseDraft,
        trips: &TripList,
        today: NaiveDate,
    ) -> ClientResult<Expense> {
        let payload = draft
            .validate(trips, today)
            .map_err(ClientError::Validation)?;

        let saved = match draft.editing {
            Some(expense_id) => store.update_expense(expense_id, &payload).await,
            None => store.create_expense(&payload).await,
        }
        .inspect_err(|e| tracing::warn!(trip_id = payload.trip, error = %e, "failed to submit expense"))?;

        self.upsert(saved.clone());
        Ok(saved)
    }

    pub async fn delete(
        &mut self,
        store: &dyn ExpenseStore,
        expense_id: ExpenseId,
        confirmed: bool,
    ) -> ClientResult<()> {
        require_confirmation(confirmed, CONFIRM_DELETE_EXPENSE)?;
        store
            .delete_expense(expense_id)
            .await
            .inspect_err(|e| tracing::warn!(expense_id, error = %e, "failed to delete expense"))?;
        self.expenses.retain(|e| e.id != expense_id);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLevel {
    Healthy,
    /// Less than a fifth of the budget left
    Low,
    Over,
}

/// Spending against a trip's budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub total_budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub level: BudgetLevel,
}

impl BudgetStatus {
    pub fn new(total_budget: f64, spent: f64) -> Self {
        let remaining = round2(total_budget - spent);
        let level = if spent > total_budget {
            BudgetLevel::Over
        } else if remaining < total_budget * LOW_BUDGET_RATIO {
            BudgetLevel::Low
        } else {
            BudgetLevel::Healthy
        };
        Self {
            total_budget,
            spent,
            remaining,
            level,
        }
    }

    pub fn for_trip(trip: &Trip, log: &ExpenseLog) -> Self {
        Self::new(trip.total_budget, log.spent_for_trip(trip.id))
    }

    pub fn is_over_budget(&self) -> bool {
        self.level == BudgetLevel::Over
    }
}
