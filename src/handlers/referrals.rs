// src/handlers/referrals.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::SessionUser,
    // Importamos os models para referenciar no Swagger
    models::{
        affiliate::{AffiliateStats, ReferralDashboard},
        referral::{Referral, ReferredUser, Role},
    },
};

// =============================================================================
//  ÁREA 1: CÓDIGO DE CONVITE
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCodePayload {
    #[validate(length(min = 1, max = 80, message = "Display name must have 1 to 80 characters."))]
    #[schema(example = "Coach Rivera")]
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCodeResponse {
    #[schema(example = "COAC7F3A")]
    pub code: String,
    pub role: Role,
    pub share_link: String,
    pub share_message: String,
}

// POST /api/referrals/code
#[utoipa::path(
    post,
    path = "/api/referrals/code",
    tag = "Referral Codes",
    request_body = IssueCodePayload,
    responses(
        (status = 201, description = "Código emitido (ou o já existente)", body = ReferralCodeResponse),
        (status = 400, description = "Payload ou sessão inválidos")
    ),
    security(
        ("session_user" = [])
    )
)]
pub async fn issue_code(
    State(app_state): State<AppState>,
    user: SessionUser,
    Json(payload): Json<IssueCodePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let service = &app_state.referral_service;
    let code = service
        .issue_code(user.0, &payload.display_name, payload.role)
        .await?;

    let response = ReferralCodeResponse {
        share_link: service.share_link(&code),
        share_message: service.share_message(&code),
        code: code.code,
        role: code.role,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/referrals/code
#[utoipa::path(
    get,
    path = "/api/referrals/code",
    tag = "Referral Codes",
    responses(
        (status = 200, description = "Código do usuário e textos de compartilhamento", body = ReferralCodeResponse),
        (status = 404, description = "Perfil ainda sem código")
    ),
    security(
        ("session_user" = [])
    )
)]
pub async fn get_code(
    State(app_state): State<AppState>,
    user: SessionUser,
) -> Result<impl IntoResponse, AppError> {
    let service = &app_state.referral_service;
    let code = service.get_code(user.0).await?;

    let response = ReferralCodeResponse {
        share_link: service.share_link(&code),
        share_message: service.share_message(&code),
        code: code.code,
        role: code.role,
    };

    Ok((StatusCode::OK, Json(response)))
}

// GET /api/referrals/code/qr
#[utoipa::path(
    get,
    path = "/api/referrals/code/qr",
    tag = "Referral Codes",
    responses(
        (status = 200, description = "QR code do link de convite", body = String, content_type = "image/svg+xml"),
        (status = 404, description = "Perfil ainda sem código")
    ),
    security(
        ("session_user" = [])
    )
)]
pub async fn get_code_qr(
    State(app_state): State<AppState>,
    user: SessionUser,
) -> Result<impl IntoResponse, AppError> {
    let service = &app_state.referral_service;
    let code = service.get_code(user.0).await?;
    let svg = service.share_qr_svg(&code)?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

// =============================================================================
//  ÁREA 2: INDICAÇÕES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReferralPayload {
    #[validate(length(min = 4, max = 16, message = "Referral codes have 4 to 16 characters."))]
    #[schema(example = "COAC7F3A")]
    pub code: String,
    #[validate(length(min = 1, max = 80, message = "Name must have 1 to 80 characters."))]
    #[schema(example = "Marcus Silva")]
    pub name: String,
    pub role: Role,
}

// POST /api/referrals
// Quem chama é o usuário novo, que acabou de se cadastrar com o código.
#[utoipa::path(
    post,
    path = "/api/referrals",
    tag = "Referrals",
    request_body = RegisterReferralPayload,
    responses(
        (status = 201, description = "Indicação registrada como pendente", body = Referral),
        (status = 400, description = "Payload inválido ou código próprio"),
        (status = 404, description = "Código desconhecido"),
        (status = 409, description = "Usuário já indicado ou indicação circular")
    ),
    security(
        ("session_user" = [])
    )
)]
pub async fn register_referral(
    State(app_state): State<AppState>,
    user: SessionUser,
    Json(payload): Json<RegisterReferralPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let referred_user = ReferredUser {
        id: user.0,
        name: payload.name,
        role: payload.role,
    };

    let referral = app_state
        .referral_service
        .register_referral(&payload.code, referred_user)
        .await?;

    Ok((StatusCode::CREATED, Json(referral)))
}

// POST /api/referrals/{id}/complete
// Chamado pelo app do indicado quando ele termina o perfil.
#[utoipa::path(
    post,
    path = "/api/referrals/{id}/complete",
    tag = "Referrals",
    responses(
        (status = 200, description = "Indicação concluída", body = Referral),
        (status = 404, description = "Indicação inexistente ou de outro usuário")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da indicação")
    ),
    security(
        ("session_user" = [])
    )
)]
pub async fn complete_referral(
    State(app_state): State<AppState>,
    user: SessionUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let referral = app_state
        .referral_service
        .complete_referral(user.0, id)
        .await?;

    Ok((StatusCode::OK, Json(referral)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordEarningsPayload {
    #[schema(example = "20.00")]
    pub amount: Decimal,
}

// POST /api/referrals/{id}/earnings
#[utoipa::path(
    post,
    path = "/api/referrals/{id}/earnings",
    tag = "Referrals",
    request_body = RecordEarningsPayload,
    responses(
        (status = 200, description = "Comissão creditada", body = Referral),
        (status = 400, description = "Valor menor ou igual a zero"),
        (status = 404, description = "Indicação inexistente ou de outro usuário")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da indicação")
    ),
    security(
        ("session_user" = [])
    )
)]
pub async fn record_earnings(
    State(app_state): State<AppState>,
    user: SessionUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordEarningsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let referral = app_state
        .referral_service
        .record_earnings(user.0, id, payload.amount)
        .await?;

    Ok((StatusCode::OK, Json(referral)))
}

// =============================================================================
//  ÁREA 3: LEITURA
// =============================================================================

// GET /api/referrals/stats
#[utoipa::path(
    get,
    path = "/api/referrals/stats",
    tag = "Affiliate Dashboard",
    responses(
        (status = 200, description = "Contadores das indicações diretas", body = AffiliateStats),
        (status = 404, description = "Perfil ainda sem código")
    ),
    security(
        ("session_user" = [])
    )
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    user: SessionUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.referral_service.stats(user.0).await?;

    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/referrals/dashboard
#[utoipa::path(
    get,
    path = "/api/referrals/dashboard",
    tag = "Affiliate Dashboard",
    responses(
        (status = 200, description = "Tela de indicações já formatada", body = ReferralDashboard),
        (status = 404, description = "Perfil ainda sem código")
    ),
    security(
        ("session_user" = [])
    )
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    user: SessionUser,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state
        .referral_service
        .dashboard(user.0, Utc::now())
        .await?;

    Ok((StatusCode::OK, Json(dashboard)))
}
