#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

use smart_travel::ApiClient;
use smart_travel::models::{
    Expense, ExpensePayload, LoginPayload, RegisterPayload, Trip, TripId, TripPayload,
    UpdateUserPayload,
};

pub const OWNER_EMAIL: &str = "owner@example.com";
pub const FRIEND_EMAIL: &str = "friend@example.com";
pub const CAROL_EMAIL: &str = "carol@example.com";
pub const DAVE_EMAIL: &str = "dave@example.com";
pub const PASSWORD: &str = "password123";

/// Trip owned by the owner account, shared with the friend.
pub const OWNED_TRIP: TripId = 1;
/// Trip owned by the friend, shared with the owner account.
pub const SHARED_TRIP: TripId = 2;

#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub currency: String,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub users: Vec<MockUser>,
    pub trips: Vec<Trip>,
    pub collaborators: HashMap<TripId, Vec<String>>,
    pub expenses: Vec<Expense>,
    pub next_id: i64,
    /// Backend calls in arrival order, e.g. `"add 1 carol@example.com"`.
    pub calls: Vec<String>,
    pub refreshes: usize,
}

impl MockState {
    fn seeded() -> Self {
        let user = |id: i64, email: &str, first: &str| MockUser {
            id,
            email: email.to_string(),
            password: PASSWORD.to_string(),
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            currency: "GBP".to_string(),
        };
        let trip = |id: TripId, owner: i64, name: &str| Trip {
            id,
            trip_name: name.to_string(),
            destination: "LON".to_string(),
            start_date: date("2099-06-01"),
            end_date: date("2099-06-05"),
            total_budget: 500.0,
            traveler_type: Some(smart_travel::models::TravelerType::Medium),
            savings: 0.0,
            currency: "GBP".to_string(),
            owner: Some(owner),
        };

        Self {
            users: vec![
                user(1, OWNER_EMAIL, "Olive"),
                user(2, FRIEND_EMAIL, "Fred"),
                user(3, CAROL_EMAIL, "Carol"),
                user(4, DAVE_EMAIL, "Dave"),
            ],
            trips: vec![trip(OWNED_TRIP, 1, "Summer"), trip(SHARED_TRIP, 2, "Friends trip")],
            collaborators: HashMap::from([
                (OWNED_TRIP, vec![FRIEND_EMAIL.to_string()]),
                (SHARED_TRIP, vec![OWNER_EMAIL.to_string()]),
            ]),
            expenses: Vec::new(),
            next_id: 100,
            calls: Vec::new(),
            refreshes: 0,
        }
    }

    fn user_by_token(&self, token: &str) -> Option<&MockUser> {
        let id: i64 = token.strip_prefix("access-")?.parse().ok()?;
        self.users.iter().find(|u| u.id == id)
    }

    fn user_by_email(&self, email: &str) -> Option<&MockUser> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
    }

    fn can_see(&self, user: &MockUser, trip: &Trip) -> bool {
        trip.owner == Some(user.id)
            || self
                .collaborators
                .get(&trip.id)
                .is_some_and(|emails| emails.contains(&user.email))
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type SharedState = Arc<Mutex<MockState>>;

pub struct MockBackend {
    pub base_url: String,
    pub state: SharedState,
}

impl MockBackend {
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn collaborators(&self, trip_id: TripId) -> Vec<String> {
        let mut emails = self
            .state
            .lock()
            .unwrap()
            .collaborators
            .get(&trip_id)
            .cloned()
            .unwrap_or_default();
        emails.sort();
        emails
    }

    pub fn set_collaborators(&self, trip_id: TripId, emails: &[&str]) {
        self.state
            .lock()
            .unwrap()
            .collaborators
            .insert(trip_id, emails.iter().map(|e| e.to_string()).collect());
    }

    pub fn trip(&self, trip_id: TripId) -> Option<Trip> {
        self.state
            .lock()
            .unwrap()
            .trips
            .iter()
            .find(|t| t.id == trip_id)
            .cloned()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url).unwrap()
    }

    pub fn client_for(&self, user_id: i64) -> ApiClient {
        self.client().with_token(access_token(user_id))
    }
}

pub fn access_token(user_id: i64) -> String {
    format!("access-{}", user_id)
}

pub fn date(s: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Start the mock backend on an ephemeral local port.
pub async fn spawn_backend() -> anyhow::Result<MockBackend> {
    let state: SharedState = Arc::new(Mutex::new(MockState::seeded()));

    let router = Router::new()
        .route("/api/token/", post(login))
        .route("/api/token/refresh/", post(refresh))
        .route("/api/user/register/", post(register))
        .route("/api/user/", get(me))
        .route("/api/user/update/", patch(update_user))
        .route("/api/user/delete/", delete(delete_user))
        .route("/api/users/verify/", get(verify_user))
        .route("/api/trips/", get(list_trips).post(create_trip))
        .route("/api/trips/analytics/", get(trips_analytics))
        .route("/api/trips/{id}/", delete(delete_trip))
        .route("/api/trips/{id}/analytics/", get(trip_analytics))
        .route("/api/trips/{id}/update/", put(update_trip))
        .route(
            "/api/trips/{id}/collaborators/",
            get(list_collaborators)
                .post(add_collaborator)
                .delete(remove_collaborator),
        )
        .route("/api/budget-recommendation/", post(recommend))
        .route("/api/expenses/", get(list_expenses).post(create_expense))
        .route("/api/expenses/{id}/", delete(delete_expense))
        .route("/api/expenses/{id}/update/", put(update_expense))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(MockBackend {
        base_url: format!("http://{}", addr),
        state,
    })
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn current_user(state: &MockState, headers: &HeaderMap) -> Result<MockUser, Response> {
    bearer(headers)
        .and_then(|token| state.user_by_token(&token).cloned())
        .ok_or_else(unauthorized)
}

fn profile_json(user: &MockUser) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "currency": user.currency,
    })
}

/// Decimal fields go out as strings, the way the real backend sends them.
fn trip_json(trip: &Trip) -> Value {
    json!({
        "id": trip.id,
        "trip_name": trip.trip_name,
        "destination": trip.destination,
        "start_date": trip.start_date,
        "end_date": trip.end_date,
        "total_budget": format!("{:.2}", trip.total_budget),
        "traveler_type": trip.traveler_type,
        "savings": format!("{:.2}", trip.savings),
        "currency": trip.currency,
        "user": trip.owner,
    })
}

fn expense_json(expense: &Expense) -> Value {
    json!({
        "id": expense.id,
        "trip": expense.trip,
        "amount": format!("{:.2}", expense.amount),
        "date": expense.date,
        "category": expense.category,
        "description": expense.description,
        "original_currency": expense.original_currency,
    })
}

async fn login(State(state): State<SharedState>, Json(payload): Json<LoginPayload>) -> Response {
    let state = state.lock().unwrap();
    match state.user_by_email(&payload.email) {
        Some(user) if user.password == payload.password => Json(json!({
            "access": access_token(user.id),
            "refresh": format!("refresh-{}", user.id),
        }))
        .into_response(),
        _ => unauthorized(),
    }
}

#[derive(Deserialize)]
struct RefreshBody {
    refresh: String,
}

async fn refresh(State(state): State<SharedState>, Json(body): Json<RefreshBody>) -> Response {
    let mut state = state.lock().unwrap();
    let Some(id) = body
        .refresh
        .strip_prefix("refresh-")
        .and_then(|id| id.parse::<i64>().ok())
    else {
        return unauthorized();
    };
    state.refreshes += 1;
    Json(json!({"access": access_token(id)})).into_response()
}

async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterPayload>,
) -> Response {
    let mut state = state.lock().unwrap();
    if state.user_by_email(&payload.email).is_some() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["user with this email already exists."]})),
        )
            .into_response();
    }
    let user = MockUser {
        id: state.next_id(),
        email: payload.email,
        password: payload.password,
        first_name: payload.first_name,
        last_name: payload.last_name,
        currency: "GBP".to_string(),
    };
    let body = profile_json(&user);
    state.users.push(user);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn me(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    match current_user(&state, &headers) {
        Ok(user) => Json(profile_json(&user)).into_response(),
        Err(response) => response,
    }
}

async fn update_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUserPayload>,
) -> Response {
    let mut state = state.lock().unwrap();
    let user = match current_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Some(stored) = state.users.iter_mut().find(|u| u.id == user.id) else {
        return not_found();
    };
    stored.first_name = payload.first_name;
    stored.last_name = payload.last_name;
    stored.email = payload.email;
    stored.currency = payload.currency;
    if let Some(password) = payload.password {
        stored.password = password;
    }
    Json(profile_json(stored)).into_response()
}

async fn delete_user(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    let user = match current_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    state.users.retain(|u| u.id != user.id);
    StatusCode::NO_CONTENT.into_response()
}

async fn verify_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = current_user(&state, &headers) {
        return response;
    }
    let email = params.get("email").cloned().unwrap_or_default();
    state.calls.push(format!("verify {}", email));
    match state.user_by_email(&email) {
        Some(user) => Json(json!({
            "exists": true,
            "first_name": user.first_name,
            "last_name": user.last_name,
        }))
        .into_response(),
        None => Json(json!({"exists": false})).into_response(),
    }
}

async fn list_trips(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let user = match current_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let trips: Vec<Value> = state
        .trips
        .iter()
        .filter(|t| state.can_see(&user, t))
        .map(trip_json)
        .collect();
    Json(trips).into_response()
}

fn trip_from_payload(id: TripId, owner: i64, payload: TripPayload) -> Trip {
    Trip {
        id,
        trip_name: payload.trip_name,
        destination: payload.destination,
        start_date: payload.start_date,
        end_date: payload.end_date,
        total_budget: payload.total_budget,
        traveler_type: Some(payload.traveler_type),
        savings: payload.savings,
        currency: "GBP".to_string(),
        owner: Some(owner),
    }
}

async fn create_trip(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<TripPayload>,
) -> Response {
    let mut state = state.lock().unwrap();
    let user = match current_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let id = state.next_id();
    state.calls.push(format!("create {}", id));
    let trip = trip_from_payload(id, user.id, payload);
    let body = trip_json(&trip);
    state.trips.push(trip);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_trip(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(trip_id): Path<TripId>,
    Json(payload): Json<TripPayload>,
) -> Response {
    let mut state = state.lock().unwrap();
    let user = match current_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    state.calls.push(format!("update {}", trip_id));
    let Some(index) = state.trips.iter().position(|t| t.id == trip_id) else {
        return not_found();
    };
    if state.trips[index].owner != Some(user.id) {
        // Bare 403; the client supplies the denial text.
        return StatusCode::FORBIDDEN.into_response();
    }
    let trip = trip_from_payload(trip_id, user.id, payload);
    let body = trip_json(&trip);
    state.trips[index] = trip;
    Json(body).into_response()
}

async fn delete_trip(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(trip_id): Path<TripId>,
) -> Response {
    let mut state = state.lock().unwrap();
    let user = match current_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    state.calls.push(format!("delete {}", trip_id));
    let Some(trip) = state.trips.iter().find(|t| t.id == trip_id) else {
        return not_found();
    };
    if trip.owner != Some(user.id) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Only the trip owner can delete this trip"})),
        )
            .into_response();
    }
    state.trips.retain(|t| t.id != trip_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_collaborators(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(trip_id): Path<TripId>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = current_user(&state, &headers) {
        return response;
    }
    state.calls.push(format!("list {}", trip_id));
    let collaborators: Vec<Value> = state
        .collaborators
        .get(&trip_id)
        .cloned()
        .unwrap_or_default()
        .iter()
        .filter_map(|email| state.user_by_email(email))
        .map(profile_json)
        .collect();
    Json(json!({"data": {"collaborators": collaborators}})).into_response()
}

#[derive(Deserialize)]
struct EmailBody {
    email: String,
}

async fn add_collaborator(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(trip_id): Path<TripId>,
    Json(body): Json<EmailBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = current_user(&state, &headers) {
        return response;
    }
    state.calls.push(format!("add {} {}", trip_id, body.email));
    let Some(user) = state.user_by_email(&body.email).cloned() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "User with this email does not exist"})),
        )
            .into_response();
    };
    let emails = state.collaborators.entry(trip_id).or_default();
    if emails.contains(&user.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "User is already a collaborator"})),
        )
            .into_response();
    }
    emails.push(user.email.clone());
    (StatusCode::CREATED, Json(json!({"user": profile_json(&user)}))).into_response()
}

async fn remove_collaborator(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(trip_id): Path<TripId>,
    Json(body): Json<EmailBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = current_user(&state, &headers) {
        return response;
    }
    state.calls.push(format!("remove {} {}", trip_id, body.email));
    if let Some(emails) = state.collaborators.get_mut(&trip_id) {
        emails.retain(|e| !e.eq_ignore_ascii_case(&body.email));
    }
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct RecommendationBody {
    city: String,
    traveler_type: String,
    duration: u32,
}

async fn recommend(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<RecommendationBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = current_user(&state, &headers) {
        return response;
    }
    state.calls.push(format!(
        "recommend {} {} {}",
        body.city, body.traveler_type, body.duration
    ));
    if body.city == "NOWHERE" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No cost data for this city"})),
        )
            .into_response();
    }
    let per_day = match body.traveler_type.as_str() {
        "budget" => 50.0,
        "luxury" => 250.0,
        _ => 100.0,
    };
    Json(json!({
        "total_budget": format!("{:.2}", per_day * f64::from(body.duration)),
        "currency": "GBP",
        "daily_breakdown": {
            "accommodation": format!("{:.2}", per_day * 0.6),
            "food": per_day * 0.4,
        },
    }))
    .into_response()
}

async fn list_expenses(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let user = match current_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let expenses: Vec<Value> = state
        .expenses
        .iter()
        .filter(|e| {
            state
                .trips
                .iter()
                .any(|t| t.id == e.trip && state.can_see(&user, t))
        })
        .map(expense_json)
        .collect();
    Json(expenses).into_response()
}

fn expense_from_payload(id: i64, payload: ExpensePayload) -> Expense {
    Expense {
        id,
        trip: payload.trip,
        amount: payload.amount,
        date: payload.date,
        category: payload.category,
        description: Some(payload.description),
        original_currency: payload.original_currency,
    }
}

async fn create_expense(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<ExpensePayload>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = current_user(&state, &headers) {
        return response;
    }
    let id = state.next_id();
    let expense = expense_from_payload(id, payload);
    let body = expense_json(&expense);
    state.expenses.push(expense);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_expense(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(expense_id): Path<i64>,
    Json(payload): Json<ExpensePayload>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = current_user(&state, &headers) {
        return response;
    }
    let Some(index) = state.expenses.iter().position(|e| e.id == expense_id) else {
        return not_found();
    };
    let expense = expense_from_payload(expense_id, payload);
    let body = expense_json(&expense);
    state.expenses[index] = expense;
    Json(body).into_response()
}

async fn delete_expense(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(expense_id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = current_user(&state, &headers) {
        return response;
    }
    state.expenses.retain(|e| e.id != expense_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn trips_analytics(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let user = match current_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let mut trips = Vec::new();
    let mut categories: HashMap<String, f64> = HashMap::new();
    let mut daily: HashMap<String, f64> = HashMap::new();
    let (mut total_budget, mut total_spent) = (0.0, 0.0);
    for trip in state.trips.iter().filter(|t| state.can_see(&user, t)) {
        let spent: f64 = state
            .expenses
            .iter()
            .filter(|e| e.trip == trip.id)
            .inspect(|e| {
                *categories.entry(e.category.as_str().to_string()).or_default() += e.amount;
                *daily.entry(e.date.to_string()).or_default() += e.amount;
            })
            .map(|e| e.amount)
            .sum();
        total_budget += trip.total_budget;
        total_spent += spent;
        trips.push(json!({
            "trip_id": trip.id,
            "trip_name": trip.trip_name,
            "destination": trip.destination,
            "start_date": trip.start_date,
            "end_date": trip.end_date,
            "total_budget": format!("{:.2}", trip.total_budget),
            "total_spent": spent,
        }));
    }

    Json(json!({
        "trips": trips,
        "total_budget": total_budget,
        "total_spent": format!("{:.2}", total_spent),
        "categories": categories,
        "daily_spending": daily,
    }))
    .into_response()
}

async fn trip_analytics(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(trip_id): Path<TripId>,
) -> Response {
    let state = state.lock().unwrap();
    let user = match current_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Some(trip) = state
        .trips
        .iter()
        .find(|t| t.id == trip_id && state.can_see(&user, t))
    else {
        return not_found();
    };

    let mut categories: HashMap<String, f64> = HashMap::new();
    let mut daily: HashMap<String, f64> = HashMap::new();
    for expense in state.expenses.iter().filter(|e| e.trip == trip_id) {
        *categories.entry(expense.category.as_str().to_string()).or_default() += expense.amount;
        *daily.entry(expense.date.to_string()).or_default() += expense.amount;
    }
    let total_spent: f64 = categories.values().sum();

    Json(json!({
        "trip_name": trip.trip_name,
        "start_date": trip.start_date,
        "end_date": trip.end_date,
        "total_budget": format!("{:.2}", trip.total_budget),
        "total_spent": format!("{:.2}", total_spent),
        "daily_spending": daily,
        "category_spending": categories,
    }))
    .into_response()
}
