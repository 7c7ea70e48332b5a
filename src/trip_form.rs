use chrono::NaiveDate;

use crate::budget::{adjust_by_percentage, apply_recommended, check_budget};
use crate::collaborators::{PendingCollaborators, ReconcileReport, add_missing, reconcile};
use crate::constants::*;
use crate::error::{ClientError, ClientResult};
use crate::models::{BudgetRecommendation, TravelerType, Trip, TripId, TripPayload};
use crate::ports::{CollaboratorDirectory, TripStore};
use crate::recommendation::RecommendationInputs;
use crate::trips::TripList;

/// Where the trip form is in its submit cycle.
///
/// `Success` and `Failed` count as idle: they only keep the outcome around
/// for display. The form accepts edits and a new submit in either, and the
/// next edit moves it back to `Idle`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Failed(String),
}

impl SubmissionPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionPhase::Validating | SubmissionPhase::Submitting)
    }

    /// Idle, or settled after a submit.
    pub fn is_idle(&self) -> bool {
        !self.is_busy()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    SetName(String),
    SetDestination(String),
    SetTravelerType(Option<TravelerType>),
    SetStartDate(Option<NaiveDate>),
    SetEndDate(Option<NaiveDate>),
    SetBudget(f64),
    SetSavings(f64),
    /// Use the recommended total as the budget.
    ApplyRecommended,
    /// Set the budget to a percentage (50..=150) of the recommended total.
    AdjustBudget(u32),
    /// Load an existing trip for editing.
    Edit(Trip),
    Reset,
    SubmitRequested,
    ValidationFailed(String),
    ValidationPassed,
    SubmitSucceeded,
    SubmitFailed(String),
}

/// All state of the add/edit trip form as one value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TripForm {
    pub editing: Option<TripId>,
    pub trip_name: String,
    pub destination: String,
    pub traveler_type: Option<TravelerType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_budget: f64,
    pub savings: f64,
    pub validation_error: Option<String>,
    pub phase: SubmissionPhase,
}

impl TripForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn recommendation_inputs(&self) -> RecommendationInputs {
        RecommendationInputs {
            destination: self.destination.clone(),
            traveler_type: self.traveler_type,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Apply `action` and return the next state.
    ///
    /// `recommendation` is the one currently shown; budget edits are
    /// re-validated against it. Field edits are ignored while a submission
    /// is in flight.
    pub fn reduce(
        &self,
        action: FormAction,
        recommendation: Option<&BudgetRecommendation>,
    ) -> TripForm {
        let mut next = self.clone();

        if self.phase.is_busy() && is_field_edit(&action) {
            return next;
        }
        if matches!(self.phase, SubmissionPhase::Success | SubmissionPhase::Failed(_))
            && is_field_edit(&action)
        {
            next.phase = SubmissionPhase::Idle;
        }

        match action {
            FormAction::SetName(name) => next.trip_name = name,
            FormAction::SetDestination(destination) => next.destination = destination,
            FormAction::SetTravelerType(traveler_type) => next.traveler_type = traveler_type,
            FormAction::SetStartDate(start) => {
                next.start_date = start;
                if let (Some(start), Some(end)) = (start, next.end_date)
                    && end < start
                {
                    next.end_date = Some(start);
                }
                next.validation_error = None;
            }
            FormAction::SetEndDate(end) => match (next.start_date, end) {
                (Some(start), Some(end)) if end < start => {
                    next.validation_error = Some(ERR_END_BEFORE_START.to_string());
                }
                _ => {
                    next.end_date = end;
                    next.validation_error = None;
                }
            },
            FormAction::SetBudget(budget) => {
                next.total_budget = budget;
                next.validation_error = check_budget(budget, recommendation).message;
            }
            FormAction::SetSavings(savings) => next.savings = savings,
            FormAction::ApplyRecommended => {
                if let Some(rec) = recommendation {
                    next.total_budget = apply_recommended(rec);
                    next.validation_error = None;
                }
            }
            FormAction::AdjustBudget(percent) => {
                if let Some(rec) = recommendation {
                    match adjust_by_percentage(rec, percent) {
                        Ok(budget) => {
                            next.total_budget = budget;
                            next.validation_error = check_budget(budget, recommendation).message;
                        }
                        Err(e) => next.validation_error = Some(e.user_message(ERR_INVALID_BUDGET)),
                    }
                }
            }
            FormAction::Edit(trip) => {
                next = TripForm {
                    editing: Some(trip.id),
                    trip_name: trip.trip_name,
                    destination: trip.destination,
                    traveler_type: trip.traveler_type,
                    start_date: Some(trip.start_date),
                    end_date: Some(trip.end_date),
                    total_budget: trip.total_budget,
                    savings: trip.savings,
                    validation_error: None,
                    phase: SubmissionPhase::Idle,
                };
            }
            FormAction::Reset => next = TripForm::default(),
            FormAction::SubmitRequested => {
                if !self.phase.is_busy() {
                    next.phase = SubmissionPhase::Validating;
                    next.validation_error = None;
                }
            }
            FormAction::ValidationFailed(message) => {
                if self.phase == SubmissionPhase::Validating {
                    next.phase = SubmissionPhase::Idle;
                    next.validation_error = Some(message);
                }
            }
            FormAction::ValidationPassed => {
                if self.phase == SubmissionPhase::Validating {
                    next.phase = SubmissionPhase::Submitting;
                }
            }
            FormAction::SubmitSucceeded => {
                if self.phase == SubmissionPhase::Submitting {
                    next = TripForm {
                        phase: SubmissionPhase::Success,
                        ..TripForm::default()
                    };
                }
            }
            FormAction::SubmitFailed(message) => {
                if self.phase == SubmissionPhase::Submitting {
                    next.phase = SubmissionPhase::Failed(message);
                }
            }
        }

        next
    }

    /// Run the submit checks in order; the first failure wins.
    pub fn validate(
        &self,
        today: NaiveDate,
        recommendation: Option<&BudgetRecommendation>,
    ) -> Result<TripPayload, String> {
        if self.trip_name.trim().is_empty() {
            return Err(ERR_TRIP_NAME_REQUIRED.to_string());
        }
        if self.destination.trim().is_empty() {
            return Err(ERR_DESTINATION_REQUIRED.to_string());
        }
        let (Some(start_date), Some(end_date)) = (self.start_date, self.end_date) else {
            return Err(ERR_MISSING_DATES.to_string());
        };
        let Some(traveler_type) = self.traveler_type else {
            return Err(ERR_TRAVELER_TYPE_REQUIRED.to_string());
        };
        if end_date < today {
            return Err(ERR_TRIP_ENDED.to_string());
        }
        if end_date < start_date {
            return Err(ERR_END_BEFORE_START.to_string());
        }
        let check = check_budget(self.total_budget, recommendation);
        if let Some(message) = check.message {
            return Err(message);
        }

        Ok(TripPayload {
            trip_name: self.trip_name.trim().to_string(),
            destination: self.destination.trim().to_string(),
            start_date,
            end_date,
            total_budget: self.total_budget,
            traveler_type,
            savings: self.savings,
        })
    }
}

fn is_field_edit(action: &FormAction) -> bool {
    matches!(
        action,
        FormAction::SetName(_)
            | FormAction::SetDestination(_)
            | FormAction::SetTravelerType(_)
            | FormAction::SetStartDate(_)
            | FormAction::SetEndDate(_)
            | FormAction::SetBudget(_)
            | FormAction::SetSavings(_)
            | FormAction::ApplyRecommended
            | FormAction::AdjustBudget(_)
            | FormAction::Edit(_)
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub trip: Trip,
    pub created: bool,
    /// `None` when there was nothing to reconcile or the current set could
    /// not be read; see `collaborator_error`.
    pub reconciliation: Option<ReconcileReport>,
    pub collaborator_error: Option<String>,
}

/// Drives a [`TripForm`] through validation, the trip write and the
/// collaborator sync.
pub struct TripSubmitter<'a> {
    trips: &'a dyn TripStore,
    directory: &'a dyn CollaboratorDirectory,
}

impl<'a> TripSubmitter<'a> {
    pub fn new(trips: &'a dyn TripStore, directory: &'a dyn CollaboratorDirectory) -> Self {
        Self { trips, directory }
    }

    /// Submit the form.
    ///
    /// On success the trip list is updated (insert on create, replace on
    /// update), collaborators are reconciled against the saved trip's id
    /// and the form is cleared. On failure the form keeps its fields and
    /// the trip list is untouched.
    ///
    /// Removals only happen when editing with a list seeded from the
    /// server; otherwise the listed people are added and nobody is removed.
    pub async fn submit(
        &self,
        form: &mut TripForm,
        trip_list: &mut TripList,
        collaborators: &mut PendingCollaborators,
        recommendation: Option<&BudgetRecommendation>,
        today: NaiveDate,
    ) -> ClientResult<SubmitOutcome> {
        if !form.phase.is_idle() {
            return Err(ClientError::Validation(ERR_SUBMISSION_IN_PROGRESS.to_string()));
        }

        *form = form.reduce(FormAction::SubmitRequested, recommendation);
        let payload = match form.validate(today, recommendation) {
            Ok(payload) => payload,
            Err(message) => {
                *form = form.reduce(FormAction::ValidationFailed(message.clone()), recommendation);
                return Err(ClientError::Validation(message));
            }
        };
        *form = form.reduce(FormAction::ValidationPassed, recommendation);

        let editing = form.editing;
        let written = match editing {
            Some(trip_id) => self.trips.update_trip(trip_id, &payload).await,
            None => self.trips.create_trip(&payload).await,
        };
        let trip = match written {
            Ok(trip) => trip,
            Err(e) => {
                tracing::warn!(trip_id = ?editing, error = %e, "failed to submit trip");
                let message = e.user_message(ERR_SUBMIT_TRIP);
                *form = form.reduce(FormAction::SubmitFailed(message), recommendation);
                return Err(e);
            }
        };

        let desired = collaborators.desired_emails();
        let replace = editing.is_some() && collaborators.is_seeded();
        let (reconciliation, collaborator_error) = if !replace && desired.is_empty() {
            (None, None)
        } else {
            let result = if replace {
                reconcile(self.directory, trip.id, &desired).await
            } else {
                add_missing(self.directory, trip.id, &desired).await
            };
            match result {
                Ok(report) => {
                    let error = report.first_error_message();
                    (Some(report), error)
                }
                Err(e) => (None, Some(e.user_message(ERR_TRY_AGAIN))),
            }
        };

        trip_list.upsert(trip.clone());
        collaborators.clear();
        *form = form.reduce(FormAction::SubmitSucceeded, recommendation);
        tracing::info!(trip_id = trip.id, created = editing.is_none(), "trip saved");

        Ok(SubmitOutcome {
            trip,
            created: editing.is_none(),
            reconciliation,
            collaborator_error,
        })
    }
}
