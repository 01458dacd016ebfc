use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::assembler::AssembleError;
use crate::catalog::CatalogError;
use crate::completion::CompletionError;
use crate::config::ConfigError;
use crate::extractor::ExtractError;
use crate::payment::PaymentError;

/// Every failure a route can report. Each variant becomes one `{"error": ...}`
/// body; the display string is the message the front end shows.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("{0}")]
    Extraction(String),
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Validation(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Transport(e) => {
                AppError::Transport(format!("Failed to generate playlist: {}", e))
            }
            CompletionError::Upstream { status, kind, message } => AppError::Upstream {
                status,
                message: format!("Failed to generate playlist: {} - {}", kind, message),
            },
            CompletionError::MalformedResponse => {
                AppError::Parse("Unexpected API response structure".to_string())
            }
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        let message = "Failed to parse playlist data".to_string();
        match err {
            ExtractError::NoArray => AppError::Extraction(message),
            ExtractError::Parse(_) => AppError::Parse(message),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Upstream {
            status: 500,
            message: format!("Spotify API error: {}", err),
        }
    }
}

impl From<AssembleError> for AppError {
    fn from(err: AssembleError) -> Self {
        AppError::Upstream {
            status: 500,
            message: format!("Spotify API error: {}", err),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Transport(e) => {
                AppError::Transport(format!("Failed to create payment session: {}", e))
            }
            other => AppError::Upstream {
                status: 500,
                message: format!("Failed to create payment session: {}", other),
            },
        }
    }
}
