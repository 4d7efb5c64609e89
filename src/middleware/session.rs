// src/middleware/session.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;
use crate::common::error::AppError; // Usamos o AppError como rejeição

// Cabeçalho preenchido pelo gateway depois do login
const USER_ID_HEADER: &str = "x-user-id";

// Usuário dono da sessão. Todas as leituras e escritas ficam presas a ele.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser(pub Uuid);

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        user_id_from_headers(&parts.headers).map(SessionUser)
    }
}

fn user_id_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or(AppError::InvalidSession("The x-user-id header is required."))?;

    let value_str = value
        .to_str()
        .map_err(|_| AppError::InvalidSession("The x-user-id header has invalid characters."))?;

    Uuid::parse_str(value_str.trim())
        .map_err(|_| AppError::InvalidSession("The x-user-id header is not a valid UUID."))
}
