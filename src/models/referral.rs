// src/models/referral.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Fighter,
    Gym,
    Coach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "referral_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,   // Aguardando o perfil do indicado
    Completed, // Perfil concluído (não volta mais para Pending)
}

// --- Structs ---

/// Código de convite de um usuário. Emitido uma única vez e imutável.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCode {
    pub code: String,
    pub user_id: Uuid,
    // Papel do dono do código, decide a tabela de comissões
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferredUser {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

/// Aresta indicador -> indicado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_user: ReferredUser,
    pub status: ReferralStatus,
    // Comissão creditada para esta indicação
    #[schema(example = "20.00")]
    pub earned: Decimal,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Referral {
    /// Nova indicação, sempre nasce pendente e sem comissão.
    pub fn pending(referrer_id: Uuid, referred_user: ReferredUser, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            referrer_id,
            referred_user,
            status: ReferralStatus::Pending,
            earned: Decimal::ZERO,
            created_at,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ReferralStatus::Completed
    }
}

// Linha "achatada" da tabela referrals. O Postgres não devolve o ReferredUser aninhado.
#[derive(Debug, FromRow)]
pub struct ReferralRow {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_user_id: Uuid,
    pub referred_name: String,
    pub referred_role: Role,
    pub status: ReferralStatus,
    pub earned: Decimal,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<ReferralRow> for Referral {
    fn from(row: ReferralRow) -> Self {
        Self {
            id: row.id,
            referrer_id: row.referrer_id,
            referred_user: ReferredUser {
                id: row.referred_user_id,
                name: row.referred_name,
                role: row.referred_role,
            },
            status: row.status,
            earned: row.earned,
            created_at: row.created_at,
            completed_at: row.completed_at,
        }
    }
}
