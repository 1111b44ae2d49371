use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::credentials::keys::KeyService;
use crate::credentials::token::TokenConfig;
use crate::store::locks::TournamentLocks;
use crate::store::repository::RecordStore;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore + Send + Sync>,
    pub tokens: TokenConfig,
    pub keys: KeyService,
    pub locks: TournamentLocks,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore + Send + Sync>, tokens: TokenConfig) -> Self {
        Self {
            store,
            tokens,
            keys: KeyService::new(),
            locks: TournamentLocks::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Stored document invalid: {0}")]
    Structure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Shorthand for a single-message validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Validation(detalles) => {
                let body = if detalles.len() == 1 {
                    json!({ "error": detalles[0] })
                } else {
                    json!({ "error": "Datos inválidos", "detalles": detalles })
                };
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            // Data-integrity and I/O problems are server faults: log the
            // detail, answer with a generic body that leaks nothing.
            AppError::Structure(msg) => {
                error!(detail = %msg, "stored document failed validation");
                (StatusCode::INTERNAL_SERVER_ERROR, generic_500_body())
            }
            AppError::Io(err) => {
                error!(detail = %err, "filesystem operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, generic_500_body())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, generic_500_body()),
        };

        (status, Json(body)).into_response()
    }
}

fn generic_500_body() -> serde_json::Value {
    json!({
        "error": "Error interno del servidor",
        "timestamp": Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::store::repository::InMemoryRecordStore;

    pub const TEST_SECRET: &str = "secreto-de-prueba";

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        store: Option<Arc<dyn RecordStore + Send + Sync>>,
        tokens: Option<TokenConfig>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                store: None,
                tokens: None,
            }
        }

        pub fn with_store(mut self, store: Arc<dyn RecordStore + Send + Sync>) -> Self {
            self.store = Some(store);
            self
        }

        pub fn with_tokens(mut self, tokens: TokenConfig) -> Self {
            self.tokens = Some(tokens);
            self
        }

        pub fn build(self) -> AppState {
            AppState::new(
                self.store
                    .unwrap_or_else(|| Arc::new(InMemoryRecordStore::new())),
                self.tokens.unwrap_or_else(|| TokenConfig::new(TEST_SECRET)),
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
