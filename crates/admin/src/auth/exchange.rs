//! Email/password login against the backend.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use asrama_token_core::{Email, EmailError};

use super::error::{AuthError, LoginRejection};
use super::session::LoginExchange;
use super::token::Claims;
use crate::error::ErrorBody;
use crate::gateway::ApiClient;

/// Login endpoint, relative to the API base URL.
const LOGIN_PATH: &str = "login";

/// Email and password for a login attempt.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

impl Credentials {
    /// Validate the email and wrap the password.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the email is malformed.
    pub fn new(email: &str, password: impl Into<String>) -> Result<Self, EmailError> {
        Ok(Self {
            email: Email::parse(email)?,
            password: SecretString::from(password.into()),
        })
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

impl LoginExchange for ApiClient {
    /// `POST /login` outside the session: a refused login is reported as a
    /// rejection, never as an expired session.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn exchange(&self, credentials: &Credentials) -> Result<String, AuthError> {
        let response = self
            .public_request(Method::POST, LOGIN_PATH)?
            .json(&LoginRequest {
                email: credentials.email.as_str(),
                password: credentials.password.expose_secret(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: LoginResponse = response.json().await?;
            return Ok(body.token);
        }

        let text = response.text().await.unwrap_or_default();
        let body = ErrorBody::parse(&text);
        let rejection = LoginRejection {
            status: status.as_u16(),
            code: body.error_code.clone(),
            message: body.message(),
        };
        tracing::info!(%rejection, "Login rejected");
        Err(AuthError::Rejected(rejection))
    }
}

impl ApiClient {
    /// Log in with email and password and start a session.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::login`](super::SessionStore::login).
    pub async fn login(&self, credentials: &Credentials) -> Result<Claims, AuthError> {
        self.session().login(self, credentials).await
    }
}
