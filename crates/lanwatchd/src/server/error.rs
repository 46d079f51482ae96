//! Mapping of registry failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use lanwatch_core::DomainError;
use lanwatch_protocol::ErrorBody;

use crate::registry::RegistryError;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The request body was not a JSON object.
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Registry(RegistryError::Domain(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Registry(RegistryError::Domain(err)) => match err {
                DomainError::EmptyField { .. } => StatusCode::BAD_REQUEST,
                DomainError::DuplicateIp { .. } => StatusCode::CONFLICT,
                DomainError::DeviceNotFound { .. } => StatusCode::NOT_FOUND,
            },
            Self::Registry(RegistryError::Storage(_) | RegistryError::ChannelClosed) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::MalformedBody(_) => ErrorBody::new("invalid JSON body"),
            Self::Registry(RegistryError::Domain(err)) => match err {
                DomainError::EmptyField { .. } => ErrorBody::fields_required(),
                DomainError::DuplicateIp { .. } => ErrorBody::duplicate_ip(),
                DomainError::DeviceNotFound { .. } => ErrorBody::not_found(),
            },
            Self::Registry(err) => ErrorBody::new(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
