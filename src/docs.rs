// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Referral Codes ---
        handlers::referrals::issue_code,
        handlers::referrals::get_code,
        handlers::referrals::get_code_qr,

        // --- Referrals ---
        handlers::referrals::register_referral,
        handlers::referrals::complete_referral,
        handlers::referrals::record_earnings,

        // --- Affiliate Dashboard ---
        handlers::referrals::get_stats,
        handlers::referrals::get_dashboard,
    ),
    components(
        schemas(
            // --- Referrals ---
            models::referral::Role,
            models::referral::ReferralStatus,
            models::referral::ReferredUser,
            models::referral::Referral,

            // --- Dashboard ---
            models::role_config::RateStream,
            models::affiliate::AffiliateStats,
            models::affiliate::TierStats,
            models::affiliate::TierBreakdown,
            models::affiliate::EarningsRange,
            models::affiliate::CommissionEstimate,
            models::affiliate::StatusBadge,
            models::affiliate::ReferralListItem,
            models::affiliate::FormattedTotals,
            models::affiliate::ReferralDashboard,

            // --- Payloads ---
            handlers::referrals::IssueCodePayload,
            handlers::referrals::ReferralCodeResponse,
            handlers::referrals::RegisterReferralPayload,
            handlers::referrals::RecordEarningsPayload,
        )
    ),
    tags(
        (name = "Referral Codes", description = "Código de convite e compartilhamento"),
        (name = "Referrals", description = "Cadastro e ciclo de vida das indicações"),
        (name = "Affiliate Dashboard", description = "Contadores, níveis e projeção de ganhos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        // O gateway autentica e repassa o usuário neste cabeçalho
        components.add_security_scheme(
            "session_user",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-user-id"))),
        );
    }
}
