use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    response::{ErrorResponse, codes},
    services::order_client::OrderClientError,
};

#[derive(Debug, Error)]
pub enum AppError {
    /// Validation failure; the payload is the client-facing code.
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),

    #[error("order update failed: {0}")]
    OrderUpdate(#[from] OrderClientError),

    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::OrderUpdate(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(code) | AppError::NotFound(code) => code,
            AppError::InvalidBody(_) => codes::INVALID_BODY,
            AppError::Storage(_) => codes::SERVER_ERROR,
            AppError::OrderUpdate(_) => codes::ORDER_UPDATE_FAILED,
            AppError::Internal(_) => codes::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            AppError::BadRequest(_) | AppError::NotFound(_) => None,
            AppError::InvalidBody(rejection) => Some(rejection.body_text()),
            AppError::Storage(err) => Some(err.to_string()),
            AppError::OrderUpdate(err) => Some(err.to_string()),
            AppError::Internal(err) => Some(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }

        let body = ErrorResponse {
            success: false,
            message: self.code().to_string(),
            error: self.detail(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Renders a handler panic as the generic 500 body instead of dropping the connection.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    AppError::Internal(anyhow::anyhow!(detail)).into_response()
}

pub type AppResult<T> = Result<T, AppError>;
