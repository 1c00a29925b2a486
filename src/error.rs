use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input {0}")]
    Validation(String),

    #[error("Unknown product card {0}")]
    UnknownCard(String),

    #[error("Network error")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway responded with status {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Gateway rejected the request")]
    Rejected { message: Option<String> },

    #[error("Unexpected gateway response")]
    Schema(#[from] serde_json::Error),

    #[error("Local storage error")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error {0}")]
    Config(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

pub const CONNECTIVITY_MESSAGE: &str = "Could not reach the store, check your connection.";
pub const GENERIC_MESSAGE: &str = "Something went wrong, please try again.";

impl AppError {
    /// Text shown to the user in a transient notice.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(detail) => detail.clone(),
            AppError::Transport(_) => CONNECTIVITY_MESSAGE.to_string(),
            AppError::Status { message, .. } | AppError::Rejected { message } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(GENERIC_MESSAGE)
                .to_string(),
            AppError::UnknownCard(_)
            | AppError::Schema(_)
            | AppError::Storage(_)
            | AppError::Config(_)
            | AppError::Internal(_) => GENERIC_MESSAGE.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
