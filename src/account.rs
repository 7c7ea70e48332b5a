use chrono::{DateTime, Utc};

use crate::api::ApiClient;
use crate::constants::*;
use crate::currency::resolve_code;
use crate::error::{ClientError, ClientResult};
use crate::models::{LoginPayload, RegisterPayload, UpdateUserPayload, UserProfile};
use crate::session::{Session, SessionStore};
use crate::utils::{looks_like_email, normalize_email, require_confirmation, validate_not_empty};

/// Settings form contents. `new_password` stays `None` unless the user
/// asked to change it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub currency: String,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ProfileUpdate {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
            currency: profile.currency.clone(),
            new_password: None,
            confirm_password: None,
        }
    }

    fn to_payload(&self) -> Result<UpdateUserPayload, String> {
        let email = normalize_email(&self.email);
        if !looks_like_email(&email) {
            return Err(ERR_INVALID_EMAIL.to_string());
        }
        let password = match self.new_password.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(password) => {
                if self.confirm_password.as_deref().map(str::trim) != Some(password) {
                    return Err(ERR_PASSWORDS_MISMATCH.to_string());
                }
                Some(password.to_string())
            }
        };
        Ok(UpdateUserPayload {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email,
            currency: resolve_code(Some(self.currency.as_str())),
            password,
        })
    }
}

/// Login state plus the client it authorizes.
///
/// Every authenticated call should go through [`Account::guard`] so a 401
/// ends the session.
pub struct Account {
    api: ApiClient,
    store: SessionStore,
    session: Option<Session>,
}

impl Account {
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        Self {
            api,
            store,
            session: None,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn currency(&self) -> &str {
        self.session
            .as_ref()
            .map(Session::currency)
            .unwrap_or(DEFAULT_CURRENCY)
    }

    fn set_session(&mut self, session: Option<Session>) {
        self.api
            .set_token(session.as_ref().map(|s| s.access_token().to_string()));
        self.session = session;
    }

    /// Pick up a session persisted by an earlier run, refreshing the access
    /// token if it expired. Returns whether a usable session is loaded.
    pub async fn restore(&mut self, now: DateTime<Utc>) -> ClientResult<bool> {
        let Some(mut session) = self.store.load().await? else {
            return Ok(false);
        };

        if session.access_expired(now) {
            match self.api.refresh(&session.tokens.refresh).await {
                Ok(token) => {
                    session.tokens.access = token.access;
                    self.store.save(&session).await?;
                    tracing::debug!("access token refreshed");
                }
                Err(e) => {
                    tracing::info!(error = %e, "session could not be refreshed");
                    self.logout().await?;
                    return Ok(false);
                }
            }
        }

        self.set_session(Some(session));
        Ok(true)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<&Session> {
        validate_not_empty(email, ERR_EMAIL_REQUIRED).map_err(ClientError::Validation)?;
        validate_not_empty(password, ERR_PASSWORD_REQUIRED).map_err(ClientError::Validation)?;

        let payload = LoginPayload {
            email: normalize_email(email),
            password: password.to_string(),
        };
        let tokens = self.api.login(&payload).await.map_err(|e| match e {
            ClientError::Unauthorized => ClientError::Validation(ERR_INVALID_CREDENTIALS.into()),
            other => other,
        })?;

        let mut session = Session::new(tokens);
        self.set_session(Some(session.clone()));
        match self.api.get_user().await {
            Ok(profile) => session.profile = Some(profile),
            Err(e) => tracing::warn!(error = %e, "failed to fetch profile after login"),
        }
        self.store.save(&session).await?;
        tracing::info!(email = %payload.email, "logged in");

        self.session = Some(session);
        self.session.as_ref().ok_or(ClientError::Unauthorized)
    }

    /// Create an account and log straight into it.
    pub async fn register(
        &mut self,
        payload: RegisterPayload,
        confirm_password: &str,
    ) -> ClientResult<&Session> {
        if !looks_like_email(&payload.email) {
            return Err(ClientError::Validation(ERR_INVALID_EMAIL.into()));
        }
        validate_not_empty(&payload.password, ERR_PASSWORD_REQUIRED)
            .map_err(ClientError::Validation)?;
        if payload.password != confirm_password {
            return Err(ClientError::Validation(ERR_PASSWORDS_MISMATCH.into()));
        }

        let payload = RegisterPayload {
            email: normalize_email(&payload.email),
            ..payload
        };
        self.api.register(&payload).await?;
        self.login(&payload.email, &payload.password).await
    }

    pub async fn logout(&mut self) -> ClientResult<()> {
        self.set_session(None);
        self.store.clear().await
    }

    /// Pass `result` through, ending the session first if it is a 401.
    pub async fn guard<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(e) = &result
            && e.is_unauthorized()
        {
            tracing::info!("session rejected by backend, logging out");
            if let Err(clear_err) = self.logout().await {
                tracing::warn!(error = %clear_err, "failed to clear session");
            }
        }
        result
    }

    pub async fn refresh_profile(&mut self) -> ClientResult<UserProfile> {
        let mut session = self.session.clone().ok_or(ClientError::Unauthorized)?;
        let result = self.api.get_user().await;
        let profile = self.guard(result).await?;
        session.profile = Some(profile.clone());
        self.store.save(&session).await?;
        self.session = Some(session);
        Ok(profile)
    }

    /// Save settings. A password change logs in again with the new
    /// password so the stored tokens stay valid.
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        let payload = update.to_payload().map_err(ClientError::Validation)?;
        let mut session = self.session.clone().ok_or(ClientError::Unauthorized)?;

        let result = self.api.update_user(&payload).await;
        let profile = self
            .guard(result)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to save settings"))?;

        if let Some(password) = &payload.password {
            self.login(&profile.email, password).await?;
            return self.refresh_profile().await;
        }

        session.profile = Some(profile.clone());
        self.store.save(&session).await?;
        self.session = Some(session);
        Ok(profile)
    }

    pub async fn delete_account(&mut self, confirmed: bool) -> ClientResult<()> {
        require_confirmation(confirmed, CONFIRM_DELETE_ACCOUNT)?;
        if self.session.is_none() {
            return Err(ClientError::Unauthorized);
        }
        let result = self.api.delete_user().await;
        self.guard(result).await?;
        tracing::info!("account deleted");
        self.logout().await
    }
}
