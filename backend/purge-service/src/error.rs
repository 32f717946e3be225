use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use amp_cache_purge::PurgeError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Purge(#[from] PurgeError),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_variants: Vec<String>,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        let failed_variants = match self {
            AppError::Purge(err) => err
                .report()
                .map(|report| {
                    report
                        .failed_variants()
                        .iter()
                        .map(|v| v.to_string())
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        HttpResponse::build(code).json(ErrorResponse {
            error: self.to_string(),
            code: code.as_u16(),
            failed_variants,
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Purge(PurgeError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            // Signing key problems are a deployment issue, not a request issue
            AppError::Purge(PurgeError::KeyLoad(_)) | AppError::Purge(PurgeError::Signing(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Purge(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
