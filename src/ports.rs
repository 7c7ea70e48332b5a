//! Traits at the seams between the orchestration logic and the backend.
//! [`crate::api::ApiClient`] implements all of them over HTTP; tests plug in
//! in-memory fakes.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{
    BudgetRecommendation, Collaborator, Expense, ExpenseId, ExpensePayload, RecommendationRequest,
    Trip, TripId, TripPayload, VerifyUserResponse,
};

#[async_trait]
pub trait BudgetRecommender: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest)
    -> ClientResult<BudgetRecommendation>;
}

#[async_trait]
pub trait CollaboratorDirectory: Send + Sync {
    /// Server-side collaborator set of a trip.
    async fn list_collaborators(&self, trip_id: TripId) -> ClientResult<Vec<Collaborator>>;

    async fn add_collaborator(&self, trip_id: TripId, email: &str) -> ClientResult<Collaborator>;

    async fn remove_collaborator(&self, trip_id: TripId, email: &str) -> ClientResult<()>;

    /// Look up whether an account exists for `email`.
    async fn verify_user(&self, email: &str) -> ClientResult<VerifyUserResponse>;
}

#[async_trait]
pub trait TripStore: Send + Sync {
    async fn list_trips(&self) -> ClientResult<Vec<Trip>>;

    async fn create_trip(&self, payload: &TripPayload) -> ClientResult<Trip>;

    async fn update_trip(&self, trip_id: TripId, payload: &TripPayload) -> ClientResult<Trip>;

    async fn delete_trip(&self, trip_id: TripId) -> ClientResult<()>;
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn list_expenses(&self) -> ClientResult<Vec<Expense>>;

    async fn create_expense(&self, payload: &ExpensePayload) -> ClientResult<Expense>;

    async fn update_expense(
        &self,
        expense_id: ExpenseId,
        payload: &ExpensePayload,
    ) -> ClientResult<Expense>;

    async fn delete_expense(&self, expense_id: ExpenseId) -> ClientResult<()>;
}
