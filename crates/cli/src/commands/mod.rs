//! Command implementations. Each protected command enters its view through
//! the route guard first.

// Command output is the product of this binary
#![allow(clippy::print_stdout)]

pub mod admins;
pub mod master_data;
pub mod reports;
pub mod session;
pub mod tokens;
pub mod upload;

use thiserror::Error;

use asrama_token_admin::forms::{FormError, LoginFailure};
use asrama_token_admin::{ApiClient, ApiError, AuthError, ConfigError, Route, RouteGuard, StorageError};

/// Errors surfaced to the person at the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("{}", .0.message())]
    Login(LoginFailure),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("The URL does not carry a token")]
    NoToken,

    #[error("Not signed in. Run `asrama login` first.")]
    NotSignedIn,

    #[error("Only admins can manage staff accounts")]
    StaffOnly,

    #[error("No record with id {0}")]
    NotFound(String),
}

impl CliError {
    /// Text for the terminal. Backend errors use their generic wording.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) | Self::Form(FormError::Api(err)) => err.user_message(),
            Self::Auth(AuthError::Token(err)) => format!("The token cannot be used: {err}"),
            Self::Auth(err) => LoginFailure::from_error(err).message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Shared state for one command run.
pub struct Console {
    pub client: ApiClient,
    guard: RouteGuard,
}

impl Console {
    pub fn new(client: ApiClient) -> Self {
        let guard = RouteGuard::new(client.session());
        Self { client, guard }
    }

    /// Enter `route`, or fail if the guard sends us elsewhere.
    pub fn enter(&self, route: Route) -> Result<(), CliError> {
        let landed = self.guard.resolve_route(route);
        if landed == route {
            tracing::debug!(%route, "Entered view");
            Ok(())
        } else {
            tracing::debug!(%route, %landed, "Redirected by route guard");
            Err(CliError::NotSignedIn)
        }
    }

    /// Enter the staff view with management rights.
    pub fn enter_staff_management(&self) -> Result<(), CliError> {
        self.enter(Route::Admins)?;
        if self.client.session().can_manage_staff() {
            Ok(())
        } else {
            Err(CliError::StaffOnly)
        }
    }
}

/// Print rows as left-aligned columns.
pub fn print_table<const N: usize>(header: [&str; N], rows: &[[String; N]]) {
    let widths = column_widths(header, rows);
    println!("{}", format_row(&header, &widths));
    for row in rows {
        println!("{}", format_row(row, &widths));
    }
    if rows.is_empty() {
        println!("(none)");
    }
}

/// Widest cell per column, counted in characters.
fn column_widths<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> [usize; N] {
    let mut widths = header.map(|title| title.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell.as_ref()))
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_non_ascii_header_sets_column_width() {
        let rows = [["12".to_string(), "Rp 5".to_string()]];
        let widths = column_widths(["Énergie", "Tarif"], &rows);
        assert_eq!(widths, [7, 5]);

        let header = format_row(&["Énergie", "Tarif"], &widths);
        let row = format_row(rows.first().unwrap(), &widths);
        assert_eq!(header, "Énergie  Tarif");
        assert_eq!(row, "12       Rp 5");
        assert_eq!(header.chars().count(), row.chars().count() + 1);
    }

    #[test]
    fn test_non_ascii_cells_align() {
        let rows = [
            ["Kamar Ü".to_string(), "1".to_string()],
            ["A".to_string(), "2".to_string()],
        ];
        let widths = column_widths(["Room", "No"], &rows);
        assert_eq!(widths, [7, 2]);
        let lines: Vec<String> = rows.iter().map(|row| format_row(row, &widths)).collect();
        assert_eq!(lines, ["Kamar Ü  1", "A        2"]);
    }
}
