use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use checkup::EngineError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("Check cycle already running")]
    Busy,
    #[error("Internal Server Error")]
    Engine(#[source] EngineError),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Busy => AppError::Busy,
            other => AppError::Engine(other),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Busy => StatusCode::CONFLICT,
            AppError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Nothing about the expected credential leaks into the body
            AppError::Unauthorized => HttpResponse::Unauthorized().finish(),
            AppError::Engine(source) => {
                error!("request failed: {source}");
                HttpResponse::InternalServerError().json(json!({ "error": self.to_string() }))
            }
            _ => HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() })),
        }
    }
}
