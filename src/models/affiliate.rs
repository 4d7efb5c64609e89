// src/models/affiliate.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    referral::Role,
    role_config::RateStream,
};

// 1. Contadores (os cards do topo da tela de indicações)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateStats {
    pub total_referrals: usize,
    pub completed_referrals: usize,
    pub pending_referrals: usize,
    // Só aparece para academias e treinadores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fighter_referrals: Option<usize>,
}

// 2. Quebra por nível
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierStats {
    pub rate: Decimal, // percentual, ex: 10 = 10%
    pub total_referrals: usize,
    pub total_earned: Decimal,
    pub pending_earned: Decimal,
}

impl TierStats {
    pub fn empty(rate: Decimal) -> Self {
        Self {
            rate,
            total_referrals: 0,
            total_earned: Decimal::ZERO,
            pending_earned: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierBreakdown {
    pub tier1: TierStats,
    pub tier2: TierStats,
    pub total_earned: Decimal,
    pub total_pending: Decimal,
}

// 3. Projeção de ganhos (só exibição, nunca persistida)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct EarningsRange {
    pub low: Decimal,
    pub high: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionEstimate {
    pub low: Decimal,
    pub high: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_fighter: Option<EarningsRange>,
}

impl CommissionEstimate {
    pub fn zero() -> Self {
        Self {
            low: Decimal::ZERO,
            high: Decimal::ZERO,
            per_fighter: None,
        }
    }
}

// 4. Modelo de leitura da tela (já formatado para o app)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusBadge {
    #[schema(value_type = String)]
    pub label: &'static str,
    #[schema(value_type = String)]
    pub tone: &'static str,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralListItem {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub status: StatusBadge,
    pub joined: String, // "3 days ago"
    pub earned: String, // "$20.00"
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormattedTotals {
    pub total_earned: String,
    pub total_pending: String,
    pub estimate_low: String,
    pub estimate_high: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralDashboard {
    pub code: String,
    pub share_message: String,
    pub role: Role,
    #[schema(value_type = String)]
    pub headline: &'static str,
    pub rate_streams: Vec<RateStream>,
    pub stats: AffiliateStats,
    pub tiers: TierBreakdown,
    pub estimate: CommissionEstimate,
    pub totals: FormattedTotals,
    pub referrals: Vec<ReferralListItem>,
}
