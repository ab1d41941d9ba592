//! Error types and the JSON envelope for the HQ API.
//!
//! Every response has the shape `{ "ok": bool, "data"?: ..., "error"?: string }`.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError (validation)        ──► 422  ITEMS_REQUIRED, INVALID_ITEM…   │
//! │  CoreError (state conflict)    ──► 500  INSUFFICIENT_STOCK:<id>, …      │
//! │  lookup miss                   ──► 404  PRODUCT_NOT_FOUND, NOT_FOUND    │
//! │  malformed body / query        ──► 422  INVALID_REQUEST                 │
//! │  DbError                       ──► 500  INTERNAL_ERROR (logged, hidden) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use harbor_core::CoreError;
use harbor_db::{DbError, ServiceError};

// =============================================================================
// Envelope
// =============================================================================

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Successful handler result wrapped in the envelope.
pub struct ApiOk<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for ApiOk<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(Envelope::ok(self.0))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiOk<T>, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// HQ API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Business rule failure, carries its own wire code.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Infrastructure failure; details stay in the log.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Lookup miss with an explicit code.
    #[error("{0}")]
    NotFound(String),

    /// Body or query string could not be decoded.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(core) => ApiError::Core(core),
            ServiceError::Db(db) => ApiError::Db(db),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Machine-readable code placed in the envelope's `error` field.
    pub fn code(&self) -> String {
        match self {
            ApiError::Core(err) => err.code(),
            ApiError::Db(_) => "INTERNAL_ERROR".to_string(),
            ApiError::NotFound(code) => code.clone(),
            ApiError::InvalidRequest(_) => "INVALID_REQUEST".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Db(err) => error!(error = %err, "Database error while handling request"),
            ApiError::Core(err) if !err.is_validation() => {
                warn!(code = %err.code(), error = %err, "Request rejected")
            }
            ApiError::InvalidRequest(detail) => warn!(%detail, "Malformed request"),
            _ => {}
        }

        let body: Envelope<()> = Envelope {
            ok: false,
            data: None,
            error: Some(self.code()),
        };
        (self.status(), Json(body)).into_response()
    }
}
