use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::constants::*;
use crate::error::{ClientError, ClientResult, extract_error_message};
use crate::models::*;
use crate::ports::{BudgetRecommender, CollaboratorDirectory, ExpenseStore, TripStore};
use crate::utils::build_query_params;

/// HTTP client for the SmartTravel backend.
///
/// Authenticated calls carry the access token as a bearer header. A 401 is
/// reported as [`ClientError::Unauthorized`]; clearing the stored session
/// is up to the caller.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::from_config(&Config {
            api_url: base_url.to_string(),
            ..Config::default()
        })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<Response> {
        tracing::debug!(%method, path, "api request");

        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::debug!(%method, path, status = status.as_u16(), "api request failed");
        Err(status_error(status, &text))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        let response = self.send(method, path, body).await?;
        response.json::<T>().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn request_no_content(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<()> {
        self.send(method, path, body).await.map(|_| ())
    }

    // Auth API

    pub async fn login(&self, payload: &LoginPayload) -> ClientResult<TokenPair> {
        self.request(Method::POST, PATH_TOKEN, Some(to_body(payload)?))
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ClientResult<AccessToken> {
        let payload = RefreshPayload {
            refresh: refresh_token.to_string(),
        };
        self.request(Method::POST, PATH_TOKEN_REFRESH, Some(to_body(&payload)?))
            .await
    }

    pub async fn register(&self, payload: &RegisterPayload) -> ClientResult<UserProfile> {
        self.request(Method::POST, PATH_REGISTER, Some(to_body(payload)?))
            .await
    }

    // User API

    pub async fn get_user(&self) -> ClientResult<UserProfile> {
        self.request(Method::GET, PATH_USER, None).await
    }

    pub async fn update_user(&self, payload: &UpdateUserPayload) -> ClientResult<UserProfile> {
        self.request(Method::PATCH, PATH_USER_UPDATE, Some(to_body(payload)?))
            .await
    }

    pub async fn delete_user(&self) -> ClientResult<()> {
        self.request_no_content(Method::DELETE, PATH_USER_DELETE, None)
            .await
    }

    // Trips API

    pub async fn get_trips(&self) -> ClientResult<Vec<Trip>> {
        self.request(Method::GET, PATH_TRIPS, None).await
    }

    pub async fn create_trip(&self, payload: &TripPayload) -> ClientResult<Trip> {
        self.request(Method::POST, PATH_TRIPS, Some(to_body(payload)?))
            .await
    }

    pub async fn update_trip(&self, trip_id: TripId, payload: &TripPayload) -> ClientResult<Trip> {
        let path = format!("{}{}/update/", PATH_TRIPS, trip_id);
        self.request(Method::PUT, &path, Some(to_body(payload)?))
            .await
            .map_err(|e| forbidden_or(e, ERR_NOT_OWNER_UPDATE))
    }

    pub async fn delete_trip(&self, trip_id: TripId) -> ClientResult<()> {
        let path = format!("{}{}/", PATH_TRIPS, trip_id);
        self.request_no_content(Method::DELETE, &path, None)
            .await
            .map_err(|e| forbidden_or(e, ERR_NOT_OWNER_DELETE))
    }

    // Collaborators API

    pub async fn get_collaborators(&self, trip_id: TripId) -> ClientResult<Vec<Collaborator>> {
        let path = collaborators_path(trip_id);
        let response: CollaboratorsResponse = self.request(Method::GET, &path, None).await?;
        Ok(response.data.collaborators)
    }

    pub async fn add_collaborator(&self, trip_id: TripId, email: &str) -> ClientResult<Collaborator> {
        let payload = EmailPayload {
            email: email.to_string(),
        };
        let path = collaborators_path(trip_id);
        let response: AddCollaboratorResponse = self
            .request(Method::POST, &path, Some(to_body(&payload)?))
            .await?;
        Ok(response.user)
    }

    pub async fn remove_collaborator(&self, trip_id: TripId, email: &str) -> ClientResult<()> {
        let payload = EmailPayload {
            email: email.to_string(),
        };
        let path = collaborators_path(trip_id);
        self.request_no_content(Method::DELETE, &path, Some(to_body(&payload)?))
            .await
    }

    pub async fn verify_user(&self, email: &str) -> ClientResult<VerifyUserResponse> {
        let query = build_query_params(&[("email", Some(email.trim().to_string()))]);
        let path = format!("{}{}", PATH_USER_VERIFY, query);
        self.request(Method::GET, &path, None).await
    }

    // Budget recommendation API

    pub async fn get_budget_recommendation(
        &self,
        request: &RecommendationRequest,
    ) -> ClientResult<BudgetRecommendation> {
        self.request(
            Method::POST,
            PATH_BUDGET_RECOMMENDATION,
            Some(to_body(request)?),
        )
        .await
    }

    // Expenses API

    pub async fn get_expenses(&self) -> ClientResult<Vec<Expense>> {
        self.request(Method::GET, PATH_EXPENSES, None).await
    }

    pub async fn create_expense(&self, payload: &ExpensePayload) -> ClientResult<Expense> {
        self.request(Method::POST, PATH_EXPENSES, Some(to_body(payload)?))
            .await
    }

    pub async fn update_expense(
        &self,
        expense_id: ExpenseId,
        payload: &ExpensePayload,
    ) -> ClientResult<Expense> {
        let path = format!("{}{}/update/", PATH_EXPENSES, expense_id);
        self.request(Method::PUT, &path, Some(to_body(payload)?))
            .await
    }

    pub async fn delete_expense(&self, expense_id: ExpenseId) -> ClientResult<()> {
        let path = format!("{}{}/", PATH_EXPENSES, expense_id);
        self.request_no_content(Method::DELETE, &path, None).await
    }

    // Analytics API

    pub async fn get_trips_analytics(&self) -> ClientResult<TripsAnalytics> {
        self.request(Method::GET, PATH_TRIPS_ANALYTICS, None).await
    }

    pub async fn get_trip_analytics(&self, trip_id: TripId) -> ClientResult<TripAnalytics> {
        let path = format!("{}{}/analytics/", PATH_TRIPS, trip_id);
        self.request(Method::GET, &path, None).await
    }
}

fn collaborators_path(trip_id: TripId) -> String {
    format!("{}{}/collaborators/", PATH_TRIPS, trip_id)
}

fn to_body<T: Serialize>(payload: &T) -> ClientResult<serde_json::Value> {
    serde_json::to_value(payload).map_err(|e| ClientError::Decode(e.to_string()))
}

fn status_error(status: StatusCode, body: &str) -> ClientError {
    let message = extract_error_message(body);
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(message.unwrap_or_default()),
        StatusCode::NOT_FOUND => ClientError::NotFound,
        _ => ClientError::Service {
            status: status.as_u16(),
            message: message.unwrap_or_default(),
        },
    }
}

/// Fill in a default denial text when the backend sent a bare 403.
fn forbidden_or(err: ClientError, default: &str) -> ClientError {
    match err {
        ClientError::Forbidden(message) if message.trim().is_empty() => {
            ClientError::Forbidden(default.to_string())
        }
        other => other,
    }
}

#[async_trait]
impl BudgetRecommender for ApiClient {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> ClientResult<BudgetRecommendation> {
        self.get_budget_recommendation(request).await
    }
}

#[async_trait]
impl CollaboratorDirectory for ApiClient {
    async fn list_collaborators(&self, trip_id: TripId) -> ClientResult<Vec<Collaborator>> {
        self.get_collaborators(trip_id).await
    }

    async fn add_collaborator(&self, trip_id: TripId, email: &str) -> ClientResult<Collaborator> {
        ApiClient::add_collaborator(self, trip_id, email).await
    }

    async fn remove_collaborator(&self, trip_id: TripId, email: &str) -> ClientResult<()> {
        ApiClient::remove_collaborator(self, trip_id, email).await
    }

    async fn verify_user(&self, email: &str) -> ClientResult<VerifyUserResponse> {
        ApiClient::verify_user(self, email).await
    }
}

#[async_trait]
impl TripStore for ApiClient {
    async fn list_trips(&self) -> ClientResult<Vec<Trip>> {
        self.get_trips().await
    }

    async fn create_trip(&self, payload: &TripPayload) -> ClientResult<Trip> {
        ApiClient::create_trip(self, payload).await
    }

    async fn update_trip(&self, trip_id: TripId, payload: &TripPayload) -> ClientResult<Trip> {
        ApiClient::update_trip(self, trip_id, payload).await
    }

    async fn delete_trip(&self, trip_id: TripId) -> ClientResult<()> {
        ApiClient::delete_trip(self, trip_id).await
    }
}

#[async_trait]
impl ExpenseStore for ApiClient {
    async fn list_expenses(&self) -> ClientResult<Vec<Expense>> {
        self.get_expenses().await
    }

    async fn create_expense(&self, payload: &ExpensePayload) -> ClientResult<Expense> {
        ApiClient::create_expense(self, payload).await
    }

    async fn update_expense(
        &self,
        expense_id: ExpenseId,
        payload: &ExpensePayload,
    ) -> ClientResult<Expense> {
        ApiClient::update_expense(self, expense_id, payload).await
    }

    async fn delete_expense(&self, expense_id: ExpenseId) -> ClientResult<()> {
        ApiClient::delete_expense(self, expense_id).await
    }
}
