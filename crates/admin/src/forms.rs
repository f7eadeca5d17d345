//! Form state and validation for the editing views.
//!
//! Each form holds the raw text the user typed, validates it into a
//! backend payload, and submits through the gateway.

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use asrama_token_core::{
    Admin, AdminId, AdminPayload, Email, EmailError, Kwh, MasterData, MasterDataPayload, Role,
    Rupiah, TokenPrice, TokenPriceId, TokenPricePayload,
};

use crate::auth::{AuthError, Claims, Credentials};
use crate::error::ApiError;
use crate::gateway::ApiClient;

/// Errors raised while validating or submitting a form.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("There is no master data to delete")]
    NothingToDelete,

    #[error("A login is already in progress")]
    Busy,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Parse a decimal typed by a user; a comma is accepted as the decimal
/// separator.
///
/// # Errors
///
/// Returns `FormError::Required` for blank input and
/// `FormError::NotANumber` for anything else that is not a number.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required(field));
    }
    Decimal::from_str(&trimmed.replacen(',', ".", 1)).map_err(|_| FormError::NotANumber(field))
}

fn parse_positive(field: &'static str, raw: &str) -> Result<Decimal, FormError> {
    let value = parse_decimal(field, raw)?;
    if value <= Decimal::ZERO {
        return Err(FormError::NotPositive(field));
    }
    Ok(value)
}

// =============================================================================
// Login
// =============================================================================

/// What went wrong with a login, as shown to staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    AccountDisabled,
    WrongCredentials,
    ServerError,
}

impl LoginFailure {
    /// Classify a failed login.
    #[must_use]
    pub fn from_error(err: &AuthError) -> Self {
        match err {
            AuthError::Rejected(rejection) if rejection.is_account_inactive() => {
                Self::AccountDisabled
            }
            AuthError::Rejected(rejection) if rejection.status < 500 => Self::WrongCredentials,
            AuthError::Rejected(_)
            | AuthError::Token(_)
            | AuthError::Http(_)
            | AuthError::Url(_)
            | AuthError::Storage(_) => Self::ServerError,
        }
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::AccountDisabled => {
                "Your account has been disabled. Please contact an administrator."
            }
            Self::WrongCredentials => "The email or password you entered is incorrect.",
            Self::ServerError => "A server error occurred. Please try again shortly.",
        }
    }
}

/// Login form. `submitting` stands in for the disabled submit button: a
/// second submission is refused until the first one finishes.
#[derive(Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
    submitting: bool,
    failure: Option<LoginFailure>,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
            submitting: false,
            failure: None,
        }
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The failure of the last attempt, if it failed.
    #[must_use]
    pub const fn failure(&self) -> Option<LoginFailure> {
        self.failure
    }

    /// Validate and lock the form for submission.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Busy` while a submission is outstanding,
    /// otherwise a validation error.
    pub fn begin(&mut self) -> Result<Credentials, FormError> {
        if self.submitting {
            return Err(FormError::Busy);
        }
        if self.email.trim().is_empty() {
            return Err(FormError::Required("email"));
        }
        if self.password.expose_secret().is_empty() {
            return Err(FormError::Required("password"));
        }
        let credentials = Credentials::new(&self.email, self.password.expose_secret())?;
        self.submitting = true;
        self.failure = None;
        Ok(credentials)
    }

    /// Unlock the form and record the outcome.
    pub fn finish(&mut self, outcome: &Result<Claims, AuthError>) {
        self.submitting = false;
        self.failure = outcome.as_ref().err().map(LoginFailure::from_error);
    }

    /// Submit through `client` and start a session on success.
    ///
    /// The outer error is a validation problem; the inner result is the
    /// login outcome, whose failure is also kept in [`failure`](Self::failure).
    /// Dropping the future before it completes unlocks the form.
    ///
    /// # Errors
    ///
    /// Returns `FormError` if the form cannot be submitted.
    pub async fn submit(
        &mut self,
        client: &ApiClient,
    ) -> Result<Result<Claims, AuthError>, FormError> {
        let credentials = self.begin()?;
        let unlock = Unlock(&mut self.submitting);
        let outcome = client.login(&credentials).await;
        drop(unlock);
        self.finish(&outcome);
        Ok(outcome)
    }
}

/// Clears the submitting flag if a login is abandoned mid-flight.
struct Unlock<'a>(&'a mut bool);

impl Drop for Unlock<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

// =============================================================================
// Master data
// =============================================================================

/// Editor for the per-kWh rate and admin fee.
#[derive(Debug, Clone, Default)]
pub struct MasterDataForm {
    pub harga_per_kwh: String,
    pub biaya_admin_persen: String,
    current: Option<MasterData>,
}

impl MasterDataForm {
    /// A form showing `current`, or blank when nothing is saved yet.
    #[must_use]
    pub fn new(current: Option<MasterData>) -> Self {
        current.map_or_else(Self::default, |data| Self {
            harga_per_kwh: data.harga_per_kwh.amount().to_string(),
            biaya_admin_persen: data.biaya_admin_persen.to_string(),
            current: Some(data),
        })
    }

    /// The record being edited, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&MasterData> {
        self.current.as_ref()
    }

    /// # Errors
    ///
    /// Returns `FormError` if either field is blank or not a number.
    pub fn payload(&self) -> Result<MasterDataPayload, FormError> {
        Ok(MasterDataPayload {
            harga_per_kwh: Rupiah::new(parse_decimal("harga_per_kwh", &self.harga_per_kwh)?),
            biaya_admin_persen: parse_decimal("biaya_admin_persen", &self.biaya_admin_persen)?,
        })
    }

    /// Save: update the current record, or create one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `FormError` on validation or backend failure.
    pub async fn save(&mut self, client: &ApiClient) -> Result<MasterData, FormError> {
        let payload = self.payload()?;
        let saved = client
            .save_master_data(self.current.map(|data| data.id), &payload)
            .await?;
        *self = Self::new(Some(saved));
        Ok(saved)
    }

    /// Delete the current record and clear the form.
    ///
    /// # Errors
    ///
    /// Returns `FormError::NothingToDelete` when there is no current record.
    pub async fn delete(&mut self, client: &ApiClient) -> Result<(), FormError> {
        let current = self.current.ok_or(FormError::NothingToDelete)?;
        client.delete_master_data(current.id).await?;
        *self = Self::default();
        Ok(())
    }
}

// =============================================================================
// Token prices
// =============================================================================

/// Editor for a token denomination.
#[derive(Debug, Clone, Default)]
pub struct TokenPriceForm {
    pub amount: String,
    pub kwh: String,
    editing: Option<TokenPriceId>,
}

impl TokenPriceForm {
    /// A blank form for a new denomination.
    #[must_use]
    pub fn create() -> Self {
        Self::default()
    }

    /// A form pre-filled from `price`.
    #[must_use]
    pub fn edit(price: &TokenPrice) -> Self {
        Self {
            amount: price.amount.amount().to_string(),
            kwh: price.kwh.value().to_string(),
            editing: Some(price.id.clone()),
        }
    }

    /// # Errors
    ///
    /// Returns `FormError` unless both fields are positive numbers.
    pub fn payload(&self) -> Result<TokenPricePayload, FormError> {
        Ok(TokenPricePayload {
            amount: Rupiah::new(parse_positive("amount", &self.amount)?),
            kwh: Kwh::new(parse_positive("kwh", &self.kwh)?),
        })
    }

    /// Preview of the effective rate, when both fields are valid.
    #[must_use]
    pub fn price_per_kwh(&self) -> Option<Rupiah> {
        let payload = self.payload().ok()?;
        payload.amount.per_kwh(payload.kwh)
    }

    /// # Errors
    ///
    /// Returns `FormError` on validation or backend failure.
    pub async fn submit(&self, client: &ApiClient) -> Result<TokenPrice, FormError> {
        let payload = self.payload()?;
        Ok(match &self.editing {
            Some(id) => client.update_token_price(id, &payload).await?,
            None => client.create_token_price(&payload).await?,
        })
    }
}

// =============================================================================
// Admins
// =============================================================================

/// Editor for an admin or operator account.
#[derive(Debug, Clone)]
pub struct AdminForm {
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Blank keeps the current password when editing.
    pub password: SecretString,
    /// Existing avatar path, kept unless a new image is uploaded.
    pub avatar: Option<String>,
    /// Local image to upload as the new avatar.
    pub avatar_file: Option<PathBuf>,
    editing: Option<AdminId>,
}

impl Default for AdminForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: Role::Operator,
            password: SecretString::from(String::new()),
            avatar: None,
            avatar_file: None,
            editing: None,
        }
    }
}

impl AdminForm {
    /// A blank form for a new operator.
    #[must_use]
    pub fn create() -> Self {
        Self::default()
    }

    /// A form pre-filled from `admin`, with an empty password.
    #[must_use]
    pub fn edit(admin: &Admin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: admin.role,
            avatar: admin.avatar.clone(),
            editing: Some(admin.id),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// # Errors
    ///
    /// Returns `FormError` if the name or email is missing, the email is
    /// malformed, or a new account has no password.
    pub fn payload(&self) -> Result<AdminPayload, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Required("name"));
        }
        if self.email.trim().is_empty() {
            return Err(FormError::Required("email"));
        }
        let email = Email::parse(&self.email)?;

        let password = self.password.expose_secret();
        let password = if password.is_empty() {
            if !self.is_editing() {
                return Err(FormError::Required("password"));
            }
            None
        } else {
            Some(password.to_string())
        };

        Ok(AdminPayload {
            name: name.to_string(),
            email,
            role: self.role,
            password,
            avatar: self.avatar.clone().filter(|avatar| !avatar.is_empty()),
        })
    }

    /// Upload the avatar if one was picked, then create or update.
    ///
    /// # Errors
    ///
    /// Returns `FormError` on validation, upload or backend failure.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<Admin, FormError> {
        let mut payload = self.payload()?;
        if let Some(path) = &self.avatar_file {
            let uploaded = client.upload_image_file(path).await?;
            self.avatar = Some(uploaded.url.clone());
            self.avatar_file = None;
            payload.avatar = Some(uploaded.url);
        }
        Ok(match self.editing {
            Some(id) => client.update_admin(id, &payload).await?,
            None => client.create_admin(&payload).await?,
        })
    }
}
