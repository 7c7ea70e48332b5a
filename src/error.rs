use thiserror::Error;

use crate::constants::ERR_UNAUTHORIZED;

/// Every failure the client can surface, grouped the way the UI reacts to it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// Local check failed; shown inline and blocks submission.
    #[error("{0}")]
    Validation(String),
    /// 403 from the backend, carrying the denial text.
    #[error("{0}")]
    Forbidden(String),
    /// 401 from the backend. The session must be cleared.
    #[error("unauthorized")]
    Unauthorized,
    /// Collaborator lookup found no account for the email.
    #[error("{0}")]
    UserNotFound(String),
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Duplicate(String),
    /// A destructive action was issued without an explicit confirmation.
    #[error("confirmation required: {0}")]
    ConfirmationRequired(&'static str),
    #[error("service error {status}: {message}")]
    Service { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("session storage error: {0}")]
    Storage(String),
    #[error("config error: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Text to show next to the form or list that triggered the call.
    ///
    /// Local and authorization errors are shown verbatim. Remote failures
    /// use the server's own text when it sent one, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(msg)
            | ClientError::Forbidden(msg)
            | ClientError::UserNotFound(msg)
            | ClientError::Duplicate(msg) => msg.clone(),
            ClientError::Unauthorized => ERR_UNAUTHORIZED.to_string(),
            ClientError::ConfirmationRequired(prompt) => (*prompt).to_string(),
            ClientError::Service { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

/// Pull a human readable message out of a backend error body.
///
/// The backend answers with `{"detail": ..}`, `{"message": ..}` or
/// `{"error": ..}` depending on the view. Anything that is not JSON (proxy
/// pages, HTML tracebacks) yields `None` so callers use their own fallback.
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["detail", "message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_detail_message_and_error_keys() {
        assert_eq!(
            extract_error_message(r#"{"detail":"Only the trip owner can update this trip"}"#),
            Some("Only the trip owner can update this trip".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"message":"bad"}"#),
            Some("bad".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"error":"Trip not found"}"#),
            Some("Trip not found".to_string())
        );
        assert_eq!(extract_error_message(r#"{"other":1}"#), None);
        assert_eq!(extract_error_message("  "), None);
    }

    #[test]
    fn non_json_bodies_are_not_shown_to_users() {
        assert_eq!(extract_error_message("Bad Gateway"), None);
        let page = "<!DOCTYPE html>\n<html><head><title>Server Error (500)</title></head></html>";
        assert_eq!(extract_error_message(page), None);
        assert_eq!(extract_error_message(r#"["not", "an", "object"]"#), None);
    }

    #[test]
    fn user_message_falls_back_for_remote_failures() {
        let network = ClientError::Network("connection refused".into());
        assert_eq!(network.user_message("Try again"), "Try again");

        let empty = ClientError::Service {
            status: 500,
            message: String::new(),
        };
        assert_eq!(empty.user_message("Try again"), "Try again");

        let forbidden = ClientError::Forbidden("nope".into());
        assert_eq!(forbidden.user_message("Try again"), "nope");

        assert_eq!(
            ClientError::Unauthorized.user_message("Try again"),
            ERR_UNAUTHORIZED
        );
    }
}
