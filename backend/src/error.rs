//! Error handling for the Little Bites platform
//!
//! Every error is rendered as `{ "error": { code, message, field? } }`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Grading errors
    #[error("{0}")]
    GradingFailed(#[from] shared::GradingError),

    // Nutrition lookup errors
    #[error("Failed to retrieve nutrition data for barcode: {barcode}")]
    NutritionLookup {
        barcode: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Invalid API credentials or token expired")]
    ProviderUnauthorized,

    #[error("API access denied")]
    ProviderForbidden,

    #[error("Product not found in nutrition database")]
    ProductNotFound,

    #[error("API rate limit exceeded. Please try again later")]
    ProviderRateLimited,

    #[error("External service error: {0}")]
    ExternalService(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Shorthand for a field validation failure
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::GradingFailed(_) => (StatusCode::UNPROCESSABLE_ENTITY, "GRADING_FAILED"),
            AppError::NutritionLookup { source, .. } => match source.as_ref() {
                AppError::ProductNotFound => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
                _ => (StatusCode::BAD_GATEWAY, "NUTRITION_LOOKUP_FAILED"),
            },
            AppError::ProviderUnauthorized => (StatusCode::BAD_GATEWAY, "PROVIDER_UNAUTHORIZED"),
            AppError::ProviderForbidden => (StatusCode::BAD_GATEWAY, "PROVIDER_FORBIDDEN"),
            AppError::ProductNotFound => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
            AppError::ProviderRateLimited => {
                (StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_RATE_LIMITED")
            }
            AppError::ExternalService(_) => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, field) = match &self {
            AppError::Validation { field, message } => (message.clone(), Some(field.clone())),
            // Storage internals are not exposed to clients
            AppError::DatabaseError(_) => ("A database error occurred".to_string(), None),
            AppError::Internal(_) => ("An internal server error occurred".to_string(), None),
            other => (other.to_string(), None),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        let detail = ErrorDetail {
            code: code.to_string(),
            message,
            field,
        };
        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failure_wrapping_not_found_maps_to_404() {
        let err = AppError::NutritionLookup {
            barcode: "4006381333931".to_string(),
            source: Box::new(AppError::ProductNotFound),
        };
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(
            err.to_string(),
            "Failed to retrieve nutrition data for barcode: 4006381333931"
        );
    }

    #[test]
    fn grading_failure_keeps_generic_prefix() {
        let err = AppError::from(shared::GradingError::InvalidCriteria {
            field: "allergens".to_string(),
            message: "keywords cannot be blank".to_string(),
        });
        assert!(err.to_string().starts_with("Failed to grade product"));
        assert_eq!(err.status_and_code().1, "GRADING_FAILED");
    }
}
