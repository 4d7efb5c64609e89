// src/db/referral_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::referral::{Referral, ReferralCode, ReferralRow},
};

/// Fonte dos dados de indicação. O serviço só conhece este contrato;
/// quem implementa é o Postgres ou a versão em memória (mock).
#[async_trait]
pub trait ReferralStore: Send + Sync {
    async fn find_code_by_user(&self, user_id: Uuid) -> Result<Option<ReferralCode>, AppError>;

    async fn find_code(&self, code: &str) -> Result<Option<ReferralCode>, AppError>;

    /// `false` quando o código ou o usuário já existem.
    async fn insert_code(&self, code: &ReferralCode) -> Result<bool, AppError>;

    async fn insert_referral(&self, referral: &Referral) -> Result<(), AppError>;

    async fn find_referral(&self, id: Uuid) -> Result<Option<Referral>, AppError>;

    async fn find_by_referred_user(&self, user_id: Uuid) -> Result<Option<Referral>, AppError>;

    /// Pending -> Completed. Em uma indicação já concluída não muda nada.
    async fn mark_completed(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Referral>, AppError>;

    async fn add_earnings(&self, id: Uuid, amount: Decimal) -> Result<Option<Referral>, AppError>;

    /// Tier 1: indicações feitas diretamente pelo usuário.
    async fn list_direct(&self, referrer_id: Uuid) -> Result<Vec<Referral>, AppError>;

    /// Tier 2: indicações feitas pelos indicados diretos (um nível só).
    async fn list_network(&self, referrer_id: Uuid) -> Result<Vec<Referral>, AppError>;
}

const REFERRAL_COLUMNS: &str = r#"
    r.id, r.referrer_id, r.referred_user_id, r.referred_name,
    r.referred_role, r.status, r.earned, r.created_at, r.completed_at
"#;

#[derive(Clone)]
pub struct PgReferralRepository {
    pool: PgPool,
}

impl PgReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_referral(&self, sql: &str, id: Uuid) -> Result<Option<Referral>, AppError> {
        let row = sqlx::query_as::<_, ReferralRow>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Referral::from))
    }

    async fn fetch_referrals(&self, sql: &str, id: Uuid) -> Result<Vec<Referral>, AppError> {
        let rows = sqlx::query_as::<_, ReferralRow>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Referral::from).collect())
    }
}

#[async_trait]
impl ReferralStore for PgReferralRepository {
    // =========================================================================
    //  CÓDIGOS DE CONVITE
    // =========================================================================

    async fn find_code_by_user(&self, user_id: Uuid) -> Result<Option<ReferralCode>, AppError> {
        let code = sqlx::query_as::<_, ReferralCode>(
            "SELECT code, user_id, role, created_at FROM referral_codes WHERE user_id = $1",
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(code)
    }

    async fn find_code(&self, code: &str) -> Result<Option<ReferralCode>, AppError> {
        let code = sqlx::query_as::<_, ReferralCode>(
            "SELECT code, user_id, role, created_at FROM referral_codes WHERE code = $1",
        )
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(code)
    }

    async fn insert_code(&self, code: &ReferralCode) -> Result<bool, AppError> {
        // Conflito em qualquer uma das chaves (code ou user_id) não insere nada
        let result = sqlx::query(
            r#"
            INSERT INTO referral_codes (code, user_id, role, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
            .bind(&code.code)
            .bind(code.user_id)
            .bind(code.role)
            .bind(code.created_at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    //  INDICAÇÕES
    // =========================================================================

    async fn insert_referral(&self, referral: &Referral) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO referrals (
                id, referrer_id, referred_user_id, referred_name,
                referred_role, status, earned, created_at, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
            .bind(referral.id)
            .bind(referral.referrer_id)
            .bind(referral.referred_user.id)
            .bind(&referral.referred_user.name)
            .bind(referral.referred_user.role)
            .bind(referral.status)
            .bind(referral.earned)
            .bind(referral.created_at)
            .bind(referral.completed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    // Índice único em referred_user_id: cada usuário só é indicado uma vez
                    if db_err.is_unique_violation() {
                        return AppError::AlreadyReferred;
                    }
                }
                e.into()
            })?;

        Ok(())
    }

    async fn find_referral(&self, id: Uuid) -> Result<Option<Referral>, AppError> {
        let sql = format!("SELECT {} FROM referrals r WHERE r.id = $1", REFERRAL_COLUMNS);
        self.fetch_one_referral(&sql, id).await
    }

    async fn find_by_referred_user(&self, user_id: Uuid) -> Result<Option<Referral>, AppError> {
        let sql = format!(
            "SELECT {} FROM referrals r WHERE r.referred_user_id = $1",
            REFERRAL_COLUMNS
        );
        self.fetch_one_referral(&sql, user_id).await
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Referral>, AppError> {
        let sql = format!(
            r#"
            UPDATE referrals r
            SET status = 'completed',
                completed_at = COALESCE(r.completed_at, $2)
            WHERE r.id = $1
            RETURNING {}
            "#,
            REFERRAL_COLUMNS
        );

        let row = sqlx::query_as::<_, ReferralRow>(&sql)
            .bind(id)
            .bind(completed_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Referral::from))
    }

    async fn add_earnings(&self, id: Uuid, amount: Decimal) -> Result<Option<Referral>, AppError> {
        let sql = format!(
            "UPDATE referrals r SET earned = r.earned + $2 WHERE r.id = $1 RETURNING {}",
            REFERRAL_COLUMNS
        );

        let row = sqlx::query_as::<_, ReferralRow>(&sql)
            .bind(id)
            .bind(amount)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Referral::from))
    }

    async fn list_direct(&self, referrer_id: Uuid) -> Result<Vec<Referral>, AppError> {
        let sql = format!(
            "SELECT {} FROM referrals r WHERE r.referrer_id = $1 ORDER BY r.created_at DESC",
            REFERRAL_COLUMNS
        );
        self.fetch_referrals(&sql, referrer_id).await
    }

    async fn list_network(&self, referrer_id: Uuid) -> Result<Vec<Referral>, AppError> {
        // Um JOIN só: quem os meus indicados diretos indicaram
        let sql = format!(
            r#"
            SELECT {}
            FROM referrals r
            JOIN referrals direct ON direct.referred_user_id = r.referrer_id
            WHERE direct.referrer_id = $1
            ORDER BY r.created_at DESC
            "#,
            REFERRAL_COLUMNS
        );
        self.fetch_referrals(&sql, referrer_id).await
    }
}
