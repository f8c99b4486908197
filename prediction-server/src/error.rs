//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use prediction_core::PredictError;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Validation errors
    ValidationError {
        message: String,
        field: Option<&'static str>,
        index: Option<usize>,
    },
    MalformedBody {
        status: StatusCode,
        message: String,
    },

    // Model errors
    ModelUnavailable(String),
    InferenceError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, field, index) = match self {
            AppError::ValidationError { message, field, index } => {
                tracing::debug!("Rejected input: {}", message);
                (StatusCode::BAD_REQUEST, message, field, index)
            }
            AppError::MalformedBody { status, message } => {
                tracing::debug!("Malformed body: {}", message);
                (status, message, None, None)
            }
            AppError::ModelUnavailable(reason) => {
                tracing::error!("Prediction requested without a model: {}", reason);
                (StatusCode::INTERNAL_SERVER_ERROR, "Model not loaded".to_string(), None, None)
            }
            AppError::InferenceError(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None, None)
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None, None)
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let Some(field) = field {
            body["field"] = json!(field);
        }
        if let Some(index) = index {
            body["index"] = json!(index);
        }

        (status, Json(body)).into_response()
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Invalid(e) => AppError::ValidationError {
                message: e.to_string(),
                field: e.field(),
                index: None,
            },
            PredictError::InvalidRecord { index, ref source } => AppError::ValidationError {
                field: source.field(),
                message: err.to_string(),
                index: Some(index),
            },
            PredictError::BatchTooLarge { .. } => AppError::ValidationError {
                message: err.to_string(),
                field: None,
                index: None,
            },
            PredictError::ModelUnavailable(reason) => AppError::ModelUnavailable(reason),
            PredictError::Inference(e) => AppError::InferenceError(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // Type and missing-field errors are input errors like any other
        let status = match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
            other => other,
        };

        AppError::MalformedBody {
            status,
            message: rejection.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("Prediction task failed: {}", err))
    }
}
