pub mod account;
pub mod analytics;
pub mod api;
pub mod budget;
pub mod collaborators;
pub mod config;
pub mod constants;
pub mod currency;
pub mod error;
pub mod expenses;
pub mod generation;
pub mod models;
pub mod ports;
pub mod recommendation;
pub mod session;
pub mod trip_form;
pub mod trips;
pub mod utils;

// Re-export types at crate root for convenient importing
pub use crate::account::Account;
pub use crate::api::ApiClient;
pub use crate::config::Config;
pub use crate::error::{ClientError, ClientResult};
pub use crate::session::{Session, SessionStore};
