use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use capfund_core::{AllocationError, ErrorKind};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The engine refused the request.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// The body was not a well-formed allocation request.
    #[error("{message}")]
    InvalidRequest { status: StatusCode, message: String },

    /// More assets than the service is configured to accept.
    #[error("too many assets: {count} (at most {max} per request)")]
    TooManyAssets { count: usize, max: usize },
}

/// JSON error body, `{"detail": ..., "kind": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub kind: &'static str,
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Allocation(err) => match err.kind() {
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::InfeasibleConstraint => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::InvalidRequest { status, .. } => *status,
            Self::TooManyAssets { .. } => StatusCode::BAD_REQUEST,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Allocation(err) => match err.kind() {
                ErrorKind::InvalidInput => "invalid_input",
                ErrorKind::InfeasibleConstraint => "infeasible_constraint",
            },
            Self::InvalidRequest { .. } => "invalid_request",
            Self::TooManyAssets { .. } => "invalid_input",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            detail: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_maps_to_unprocessable() {
        let err = ApiError::from(AllocationError::InfeasibleConstraint {
            asset_cap: 0.1,
            asset_count: 5,
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind(), "infeasible_constraint");
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err = ApiError::from(AllocationError::InvalidInput {
            field: "asset_cap",
            symbol: None,
            value: "2".to_string(),
            reason: "must be in (0, 1]",
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "invalid_input");
        assert_eq!(err.to_string(), "invalid asset_cap: 2 (must be in (0, 1])");
    }

    #[test]
    fn too_many_assets_message() {
        let err = ApiError::TooManyAssets { count: 12, max: 10 };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "too many assets: 12 (at most 10 per request)");
    }
}
