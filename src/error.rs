//! Error taxonomy for employee lookups and toggles.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The backing store could not be reached or the statement failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// The manager chain loops back on itself.
    #[error("cyclic management chain: employee {employee_id} reports to {manager_id}, which is already in the tree")]
    CyclicHierarchy { employee_id: i64, manager_id: i64 },

    /// No employee with this id exists. Only raised by the toggle; lookups return `None`.
    #[error("employee {0} not found")]
    NotFound(i64),

    #[error("failed to encode response: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::CyclicHierarchy { .. } => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
