//! Sign-in, sign-out and identity.

use url::Url;

use asrama_token_admin::forms::{LoginFailure, LoginForm};
use asrama_token_admin::{LoginReason, Route};

use super::{CliError, Console};

/// Sign in with email and password.
pub async fn login(console: &Console, email: String, password: String) -> Result<(), CliError> {
    // The login view is skipped for an existing session
    if console.enter(Route::Login(LoginReason::Required)).is_err() {
        if let Some(user) = console.client.session().user() {
            println!("Already signed in as {} ({})", user.name, user.role);
        }
        return Ok(());
    }

    let mut form = LoginForm::new(email, password);
    let claims = form
        .submit(&console.client)
        .await?
        .map_err(|err| {
            tracing::warn!(error = %err, "Login failed");
            CliError::Login(LoginFailure::from_error(&err))
        })?;

    println!("Signed in as {} ({})", claims.name, claims.role);
    Ok(())
}

/// Complete a sign-in from a URL whose query carries the token.
pub fn login_url(console: &Console, raw: &str) -> Result<(), CliError> {
    let url = Url::parse(raw)?;
    let (landing, outcome) = console
        .client
        .session()
        .login_from_redirect(&url)
        .ok_or(CliError::NoToken)?;
    let claims = outcome?;

    println!("Signed in as {} ({})", claims.name, claims.role);
    println!("Continue at {landing}");
    Ok(())
}

/// Sign out. Safe to run when already signed out.
pub fn logout(console: &Console) {
    console.client.session().logout();
    println!("Signed out");
}

/// Show the signed-in account.
pub fn whoami(console: &Console) -> Result<(), CliError> {
    let user = console.client.session().user().ok_or(CliError::NotSignedIn)?;

    println!("{} <{}>", user.name, user.email);
    println!("Role:    {}", user.role);
    println!("ID:      {}", user.id);
    if let Some(avatar) = &user.avatar {
        println!("Avatar:  {}", console.client.asset_url(avatar));
    }
    if let Some(expiry) = user.expiry() {
        println!("Expires: {}", expiry.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}
