//! API error handling for consistent JSON error responses.

use crate::error::{ConfigurationError, DecisionError, FeatureRequestError, MeetingError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

/// API error type that converts to JSON responses.
///
/// The body is always `{"error": true, "message": ...}`, plus any extra
/// fields in `details` (a failed meeting carries its partial transcript).
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Map<String, Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn with_detail(mut self, key: &str, value: impl serde::Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.details.insert(key.to_string(), value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = self.details;
        body.insert("error".to_string(), json!(true));
        body.insert("message".to_string(), json!(self.message));
        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", err))
    }
}

impl From<ConfigurationError> for ApiError {
    fn from(err: ConfigurationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<DecisionError> for ApiError {
    fn from(err: DecisionError) -> Self {
        match err {
            DecisionError::NotFound(_) => Self::not_found(err.to_string()),
            DecisionError::InvalidTransition { .. } => Self::conflict(err.to_string()),
            DecisionError::InvalidStatus(_) => Self::bad_request(err.to_string()),
            DecisionError::Storage(e) => e.into(),
        }
    }
}

impl From<FeatureRequestError> for ApiError {
    fn from(err: FeatureRequestError) -> Self {
        match err {
            FeatureRequestError::NotFound(_) => Self::not_found(err.to_string()),
            FeatureRequestError::InvalidTransition { .. } => Self::conflict(err.to_string()),
            FeatureRequestError::InvalidValue { .. } | FeatureRequestError::Configuration(_) => {
                Self::bad_request(err.to_string())
            }
            FeatureRequestError::Storage(e) => e.into(),
        }
    }
}

impl From<MeetingError> for ApiError {
    fn from(err: MeetingError) -> Self {
        let message = err.to_string();
        match err {
            MeetingError::Configuration(e) => e.into(),
            MeetingError::Generation {
                participant,
                turn_index,
                partial,
                source,
            } => Self::new(StatusCode::BAD_GATEWAY, message)
                .with_detail("participant", participant)
                .with_detail("turn_index", turn_index)
                .with_detail("retryable", source.is_retryable())
                .with_detail("transcript", partial),
            MeetingError::Cancelled { partial } => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, message).with_detail("transcript", partial)
            }
            MeetingError::Persistence { transcript, .. } => {
                Self::internal(message).with_detail("transcript", transcript)
            }
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_errors_map_to_status_codes() {
        assert_eq!(
            ApiError::from(DecisionError::NotFound(4)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DecisionError::InvalidTransition {
                id: 4,
                from: "completed".to_string(),
                to: "pending".to_string(),
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DecisionError::InvalidStatus("done".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_configuration_error_is_bad_request() {
        let err: ApiError = MeetingError::Configuration(ConfigurationError::UnknownMeetingType(
            "offsite".to_string(),
        ))
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("offsite"));
    }
}
