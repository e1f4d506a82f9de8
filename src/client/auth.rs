//! Authentication endpoints
//!
//! The client is `authenticated` while the session store holds a token and
//! `unauthenticated` otherwise. Signup and login move to `authenticated`
//! when the server issues a token; logout and any failure to fetch the
//! current user move back to `unauthenticated`.

use super::error::ApiError;
use super::http::{decode_model, ApiClient, RequestOptions};
use super::models::{AuthResponse, Credentials, Role, SignupRequest, UserProfile};
use crate::session::SessionError;
use reqwest::Method;
use serde_json::Value;

pub const SIGNUP_PATH: &str = "/auth/signup";
pub const LOGIN_PATH: &str = "/auth/login";
pub const CURRENT_USER_PATH: &str = "/auth/me";

impl ApiClient {
    /// Register an account; the handle is derived from the name when absent
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        let result = match RequestOptions::json(Method::POST, &request.body()) {
            Ok(options) => self.authenticate(SIGNUP_PATH, options).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::error!(email = %request.email, "Signup error: {}", e);
        }
        result
    }

    /// Log in with email and password
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let result = match RequestOptions::json(Method::POST, credentials) {
            Ok(options) => self.authenticate(LOGIN_PATH, options).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::error!(email = %credentials.email, "Login error: {}", e);
        }
        result
    }

    async fn authenticate(&self, path: &str, options: RequestOptions) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.request_as(path, options).await?;

        if let Some(token) = response.token() {
            self.session().set_token(token)?;
            match response.user.as_ref().and_then(Value::as_object) {
                Some(profile) => self.session().set_user_data(profile)?,
                // Never leave another account's profile behind the new token
                None => self.session().clear_user_data()?,
            }
            tracing::info!("Session established");
        } else {
            tracing::info!("Authentication succeeded without a token; session unchanged");
        }

        Ok(response)
    }

    /// Fetch the profile behind the current token
    ///
    /// Any failure clears the session before it is returned: a session
    /// that cannot be validated is treated as expired.
    pub async fn get_current_user(&self) -> Result<UserProfile, ApiError> {
        match self.fetch_current_user().await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                tracing::error!("Get user error: {}", e);
                if let Err(clear_err) = self.session().clear_token() {
                    tracing::warn!("Failed to clear session: {}", clear_err);
                }
                Err(e)
            }
        }
    }

    async fn fetch_current_user(&self) -> Result<UserProfile, ApiError> {
        let value = self.request(CURRENT_USER_PATH, RequestOptions::get()).await?;
        let Value::Object(profile) = &value else {
            return Err(ApiError::decode(None));
        };
        self.session().set_user_data(profile)?;
        decode_model(value)
    }

    /// Drop the local session; no network call
    pub fn logout(&self) -> Result<(), SessionError> {
        tracing::info!("Logging out");
        self.session().clear_token()
    }

    /// Whether a token is held locally; does not check it with the server
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// Best-effort session check
    ///
    /// `false` without a network call when no token is held; otherwise
    /// validates the token via [`get_current_user`](Self::get_current_user)
    /// and reports any failure as `false`. Callers that need the failure
    /// kind should call `get_current_user` directly.
    pub async fn check_auth(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        self.get_current_user().await.is_ok()
    }

    /// Profile cached by the last successful auth call
    pub fn cached_user(&self) -> Option<UserProfile> {
        let profile = self.session().get_user_data()?;
        serde_json::from_value(Value::Object(profile)).ok()
    }

    /// Whether the cached profile carries the distributor role
    ///
    /// Purely local, so it can lag behind the server.
    pub fn is_distributor(&self) -> bool {
        self.cached_user()
            .map(|user| user.has_role(Role::Distributor))
            .unwrap_or(false)
    }
}
