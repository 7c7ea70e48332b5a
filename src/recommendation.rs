use chrono::NaiveDate;

use crate::budget::{DurationPolicy, trip_duration};
use crate::error::ClientResult;
use crate::generation::{Generation, Ticket};
use crate::models::{BudgetRecommendation, RecommendationRequest, TravelerType};
use crate::ports::BudgetRecommender;

/// The trip form fields a recommendation depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationInputs {
    pub destination: String,
    pub traveler_type: Option<TravelerType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RecommendationInputs {
    /// The request to send, or `None` while any input is missing or the
    /// trip has no positive duration.
    pub fn to_request(&self, policy: DurationPolicy) -> Option<RecommendationRequest> {
        let city = self.destination.trim();
        if city.is_empty() {
            return None;
        }
        let traveler_type = self.traveler_type?;
        let duration = trip_duration(self.start_date?, self.end_date?, policy)?;
        if duration == 0 {
            return None;
        }
        Some(RecommendationRequest {
            city: city.to_string(),
            traveler_type,
            duration,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationState {
    Unavailable,
    Loading(RecommendationRequest),
    Ready(RecommendationRequest, BudgetRecommendation),
    /// Last fetch for this key failed; treated as unavailable.
    Failed(RecommendationRequest),
}

impl RecommendationState {
    fn request(&self) -> Option<&RecommendationRequest> {
        match self {
            RecommendationState::Unavailable => None,
            RecommendationState::Loading(req)
            | RecommendationState::Ready(req, _)
            | RecommendationState::Failed(req) => Some(req),
        }
    }
}

/// A fetch the caller must perform and hand back to
/// [`RecommendationTracker::resolve`].
#[derive(Debug, Clone)]
pub struct FetchTicket {
    ticket: Ticket,
    pub request: RecommendationRequest,
}

/// Tracks the recommendation for the trip being edited.
///
/// Only the most recently started fetch may update the state; results of
/// superseded or reset fetches are dropped.
#[derive(Debug, Clone)]
pub struct RecommendationTracker {
    policy: DurationPolicy,
    generation: Generation,
    state: RecommendationState,
}

impl RecommendationTracker {
    pub fn new(policy: DurationPolicy) -> Self {
        Self {
            policy,
            generation: Generation::new(),
            state: RecommendationState::Unavailable,
        }
    }

    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }

    pub fn state(&self) -> &RecommendationState {
        &self.state
    }

    pub fn current(&self) -> Option<&BudgetRecommendation> {
        match &self.state {
            RecommendationState::Ready(_, rec) => Some(rec),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RecommendationState::Loading(_))
    }

    /// React to an input change.
    ///
    /// Incomplete inputs clear the recommendation. A key identical to the
    /// one already loading, loaded or failed starts nothing.
    pub fn update(&mut self, inputs: &RecommendationInputs) -> Option<FetchTicket> {
        let Some(request) = inputs.to_request(self.policy) else {
            self.reset();
            return None;
        };

        if self.state.request() == Some(&request) {
            return None;
        }

        let ticket = self.generation.next();
        self.state = RecommendationState::Loading(request.clone());
        tracing::debug!(
            city = %request.city,
            traveler_type = %request.traveler_type,
            duration = request.duration,
            "recommendation fetch started"
        );
        Some(FetchTicket { ticket, request })
    }

    /// Apply a fetch result. Returns `false` when the fetch was superseded.
    pub fn resolve(
        &mut self,
        fetch: FetchTicket,
        result: ClientResult<BudgetRecommendation>,
    ) -> bool {
        if !self.generation.is_current(fetch.ticket) {
            tracing::debug!(city = %fetch.request.city, "discarding stale recommendation");
            return false;
        }

        self.state = match result {
            Ok(recommendation) => RecommendationState::Ready(fetch.request, recommendation),
            Err(e) => {
                tracing::warn!(error = %e, city = %fetch.request.city, "budget recommendation failed");
                RecommendationState::Failed(fetch.request)
            }
        };
        true
    }

    /// Forget the recommendation and orphan any fetch in flight.
    pub fn reset(&mut self) {
        self.generation.invalidate();
        self.state = RecommendationState::Unavailable;
    }
}

/// Update `tracker` and, if needed, perform the fetch right away.
pub async fn refresh<'a>(
    tracker: &'a mut RecommendationTracker,
    recommender: &dyn BudgetRecommender,
    inputs: &RecommendationInputs,
) -> Option<&'a BudgetRecommendation> {
    if let Some(fetch) = tracker.update(inputs) {
        let result = recommender.recommend(&fetch.request).await;
        tracker.resolve(fetch, result);
    }
    tracker.current()
}
