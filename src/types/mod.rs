use casemind_core::ApiError;
use thiserror::Error;

use crate::utils::config::ConfigError;

/// Errors surfaced by the terminal client.
#[derive(Error, Debug)]
pub enum AppError {
    /// API, session or validation failure from the client core.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A gated command ran without a session.
    #[error("Not signed in. Run `casemind login` first.")]
    NotAuthenticated,

    /// The API refused the credentials.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Command-line input the client could not use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Interactive prompt failed.
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// A hint to print below the error, if there is a useful next step.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::NotAuthenticated | AppError::Api(ApiError::Unauthorized(_)) => {
                Some("Sign in again with `casemind login`.")
            }
            AppError::Api(ApiError::Network(_)) | AppError::Api(ApiError::Status { .. }) => {
                Some("Re-run the command to retry, or add --refresh to bypass cached results.")
            }
            AppError::Config(_) => {
                Some("Check casemind.toml and the CASEMIND_* environment variables.")
            }
            _ => None,
        }
    }
}

/// Result type for terminal client operations.
pub type Result<T> = std::result::Result<T, AppError>;
