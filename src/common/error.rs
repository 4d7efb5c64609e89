// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Referral code not found")]
    ReferralCodeNotFound,

    #[error("Referral not found")]
    ReferralNotFound,

    #[error("Users cannot use their own referral code")]
    SelfReferral,

    #[error("User was already referred")]
    AlreadyReferred,

    // O dono do código está abaixo de quem tenta se cadastrar
    #[error("Referral would create a cycle")]
    ReferralCycle,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Invalid session: {0}")]
    InvalidSession(&'static str),

    #[error("Could not generate a unique referral code")]
    CodeGenerationExhausted,

    #[error("QR code error: {0}")]
    QrCodeError(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    // Qualquer outro erro inesperado, com contexto do anyhow
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolve os detalhes por campo
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidSession(reason) => {
                let body = Json(json!({ "error": reason }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::ReferralCodeNotFound => (StatusCode::NOT_FOUND, "Referral code not found."),
            AppError::ReferralNotFound => (StatusCode::NOT_FOUND, "Referral not found."),
            AppError::SelfReferral => (StatusCode::BAD_REQUEST, "You cannot use your own referral code."),
            AppError::AlreadyReferred => (StatusCode::CONFLICT, "This user was already referred."),
            AppError::ReferralCycle => {
                (StatusCode::CONFLICT, "You cannot join through someone you referred.")
            }
            AppError::InvalidAmount => (StatusCode::BAD_REQUEST, "Amount must be greater than zero."),

            // Todo o resto vira 500. O detalhe fica só no log.
            ref e => {
                tracing::error!("Internal server error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
