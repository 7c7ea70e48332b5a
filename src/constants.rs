// Client configuration
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const SESSION_FILE_NAME: &str = "session.json";

pub const ENV_API_URL: &str = "SMART_TRAVEL_API_URL";
pub const ENV_DATA_PATH: &str = "SMART_TRAVEL_DATA_PATH";
pub const ENV_INCLUSIVE_DAYS: &str = "SMART_TRAVEL_INCLUSIVE_DAYS";
pub const ENV_TIMEOUT_SECS: &str = "SMART_TRAVEL_TIMEOUT_SECS";

// API paths
pub const PATH_TOKEN: &str = "/api/token/";
pub const PATH_TOKEN_REFRESH: &str = "/api/token/refresh/";
pub const PATH_REGISTER: &str = "/api/user/register/";
pub const PATH_USER: &str = "/api/user/";
pub const PATH_USER_UPDATE: &str = "/api/user/update/";
pub const PATH_USER_DELETE: &str = "/api/user/delete/";
pub const PATH_USER_VERIFY: &str = "/api/users/verify/";
pub const PATH_TRIPS: &str = "/api/trips/";
pub const PATH_TRIPS_ANALYTICS: &str = "/api/trips/analytics/";
pub const PATH_EXPENSES: &str = "/api/expenses/";
pub const PATH_BUDGET_RECOMMENDATION: &str = "/api/budget-recommendation/";

// Recommendation band
pub const BAND_LOWER_FACTOR: f64 = 0.5;
pub const BAND_UPPER_FACTOR: f64 = 1.5;
pub const MIN_ADJUST_PERCENT: u32 = 50;
pub const MAX_ADJUST_PERCENT: u32 = 150;

// Budget status colouring threshold (share of total budget left)
pub const LOW_BUDGET_RATIO: f64 = 0.2;

// Currency
pub const DEFAULT_CURRENCY: &str = "GBP";

// Temporary collaborator ids for trips that are not saved yet
pub const TEMP_ID_PREFIX: &str = "temp-";

// Error messages
pub const ERR_TRY_AGAIN: &str = "Something went wrong. Please try again.";
pub const ERR_SUBMIT_TRIP: &str = "Failed to submit trip. Please try again.";
pub const ERR_DELETE_TRIP: &str = "Failed to delete trip. Please try again.";
pub const ERR_SUBMIT_EXPENSE: &str = "Failed to submit expense. Please try again.";
pub const ERR_DELETE_EXPENSE: &str = "Failed to delete expense. Please try again.";
pub const ERR_ADD_COLLABORATOR: &str = "Failed to add collaborator";
pub const ERR_REMOVE_COLLABORATOR: &str = "Failed to remove collaborator";
pub const ERR_SAVE_SETTINGS: &str = "Failed to save settings.";
pub const ERR_DELETE_ACCOUNT: &str = "Failed to delete account. Please try again.";
pub const ERR_NOT_OWNER_UPDATE: &str = "Only the trip owner can update this trip";
pub const ERR_NOT_OWNER_DELETE: &str = "Only the trip owner can delete this trip";
pub const ERR_UNAUTHORIZED: &str = "Session expired. Please log in again.";
pub const ERR_TRAVELER_TYPE_REQUIRED: &str = "Please select a traveller type.";
pub const ERR_TRIP_ENDED: &str = "You cannot add a trip that has already ended.";
pub const ERR_END_BEFORE_START: &str = "End date cannot be before start date.";
pub const ERR_MISSING_DATES: &str = "Please select a start and end date.";
pub const ERR_TRIP_NAME_REQUIRED: &str = "Trip name cannot be empty";
pub const ERR_DESTINATION_REQUIRED: &str = "Destination cannot be empty";
pub const ERR_INVALID_BUDGET: &str = "Please enter a valid budget.";
pub const ERR_INVALID_EMAIL: &str = "Please enter a valid email";
pub const ERR_USER_NOT_FOUND: &str = "User with this email does not exist";
pub const ERR_ALREADY_COLLABORATOR: &str = "User is already a collaborator";
pub const ERR_SELECT_TRIP: &str = "Please select a valid trip.";
pub const ERR_INVALID_AMOUNT: &str = "Please enter a valid amount.";
pub const ERR_SELECT_DATE: &str = "Please select a date.";
pub const ERR_EXPENSE_OUTSIDE_TRIP: &str = "Expense date must fall within the trip dates.";
pub const ERR_EXPENSE_IN_FUTURE: &str = "Expense date cannot be in the future.";
pub const ERR_PASSWORDS_MISMATCH: &str = "Passwords do not match";
pub const ERR_EMAIL_REQUIRED: &str = "Email is required.";
pub const ERR_PASSWORD_REQUIRED: &str = "Password is required.";
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid email or password.";
pub const ERR_NOT_LOGGED_IN: &str = "You are not logged in.";
pub const ERR_SUBMISSION_IN_PROGRESS: &str = "A submission is already in progress";

// Confirmation prompts for destructive actions
pub const CONFIRM_DELETE_TRIP: &str = "Are you sure you want to delete this trip?";
pub const CONFIRM_DELETE_EXPENSE: &str = "Are you sure you want to delete this expense?";
pub const CONFIRM_DELETE_ACCOUNT: &str =
    "Are you sure you want to permanently delete your account? This cannot be undone.";
