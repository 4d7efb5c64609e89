// src/services/referral_service.rs

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, format},
    db::ReferralStore,
    models::{
        affiliate::{AffiliateStats, FormattedTotals, ReferralDashboard, ReferralListItem},
        referral::{Referral, ReferralCode, ReferredUser, Role},
        role_config::RoleConfig,
    },
    services::{commission_estimator, tier_classifier},
};

const CODE_ATTEMPTS: usize = 5;
const FALLBACK_PREFIX: &str = "FGHT";

#[derive(Clone)]
pub struct ReferralService {
    store: Arc<dyn ReferralStore>,
    share_base_url: String,
}

impl ReferralService {
    pub fn new(store: Arc<dyn ReferralStore>, share_base_url: impl Into<String>) -> Self {
        Self {
            store,
            share_base_url: share_base_url.into(),
        }
    }

    // =========================================================================
    //  1. CÓDIGO DE CONVITE
    // =========================================================================

    /// Emite o código do usuário na conclusão do perfil. Se já existe,
    /// devolve o mesmo (o código nunca muda).
    pub async fn issue_code(
        &self,
        user_id: Uuid,
        display_name: &str,
        role: Role,
    ) -> Result<ReferralCode, AppError> {
        if let Some(existing) = self.store.find_code_by_user(user_id).await? {
            return Ok(existing);
        }

        for _ in 0..CODE_ATTEMPTS {
            let candidate = ReferralCode {
                code: generate_code(display_name),
                user_id,
                role,
                created_at: Utc::now(),
            };

            if self.store.insert_code(&candidate).await? {
                tracing::info!("🎟️ Referral code {} issued for user {}", candidate.code, user_id);
                return Ok(candidate);
            }

            // Pode ter sido o user_id (outra requisição ganhou a corrida)
            if let Some(existing) = self.store.find_code_by_user(user_id).await? {
                return Ok(existing);
            }
        }

        Err(AppError::CodeGenerationExhausted)
    }

    pub async fn get_code(&self, user_id: Uuid) -> Result<ReferralCode, AppError> {
        self.store
            .find_code_by_user(user_id)
            .await?
            .ok_or(AppError::ReferralCodeNotFound)
    }

    pub fn share_link(&self, code: &ReferralCode) -> String {
        format::share_link(&self.share_base_url, &code.code)
    }

    pub fn share_message(&self, code: &ReferralCode) -> String {
        format::share_message(&self.share_base_url, &code.code, code.role)
    }

    pub fn share_qr_svg(&self, code: &ReferralCode) -> Result<String, AppError> {
        format::share_qr_svg(&self.share_link(code))
    }

    // =========================================================================
    //  2. INDICAÇÕES
    // =========================================================================

    /// Novo usuário se cadastrando com o código de alguém.
    pub async fn register_referral(
        &self,
        code: &str,
        referred_user: ReferredUser,
    ) -> Result<Referral, AppError> {
        let normalized = code.trim().to_ascii_uppercase();

        let owner = self
            .store
            .find_code(&normalized)
            .await?
            .ok_or(AppError::ReferralCodeNotFound)?;

        if owner.user_id == referred_user.id {
            return Err(AppError::SelfReferral);
        }

        if self.store.find_by_referred_user(referred_user.id).await?.is_some() {
            return Err(AppError::AlreadyReferred);
        }

        if self.is_upline_of(referred_user.id, owner.user_id).await? {
            tracing::warn!(
                "🚫 User {} tried to join through {}, who is below them",
                referred_user.id,
                owner.code
            );
            return Err(AppError::ReferralCycle);
        }

        let referral = Referral::pending(owner.user_id, referred_user, Utc::now());
        self.store.insert_referral(&referral).await?;

        tracing::info!(
            "🔗 User {} joined through code {} (referral {})",
            referral.referred_user.id,
            owner.code,
            referral.id
        );

        Ok(referral)
    }

    /// Indicado terminou o perfil. Não existe caminho de volta para Pending.
    /// Só o próprio indicado conclui a indicação.
    pub async fn complete_referral(&self, actor: Uuid, id: Uuid) -> Result<Referral, AppError> {
        let current = self
            .store
            .find_referral(id)
            .await?
            .ok_or(AppError::ReferralNotFound)?;

        // Para quem não é o indicado, a indicação não existe
        if current.referred_user.id != actor {
            tracing::warn!("🚫 User {} tried to complete referral {}", actor, id);
            return Err(AppError::ReferralNotFound);
        }

        let referral = self
            .store
            .mark_completed(id, Utc::now())
            .await?
            .ok_or(AppError::ReferralNotFound)?;

        tracing::info!("✅ Referral {} completed", id);
        Ok(referral)
    }

    /// Credita comissão na indicação (calculada pelo backend de pagamentos,
    /// em nome do indicador).
    pub async fn record_earnings(
        &self,
        actor: Uuid,
        id: Uuid,
        amount: Decimal,
    ) -> Result<Referral, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let current = self
            .store
            .find_referral(id)
            .await?
            .ok_or(AppError::ReferralNotFound)?;

        if current.referrer_id != actor {
            tracing::warn!("🚫 User {} tried to credit referral {}", actor, id);
            return Err(AppError::ReferralNotFound);
        }

        let referral = self
            .store
            .add_earnings(id, amount)
            .await?
            .ok_or(AppError::ReferralNotFound)?;

        tracing::info!("💰 Credited {} to referral {}", format::format_currency(amount), id);
        Ok(referral)
    }

    /// `user_id` aparece na cadeia de indicadores acima de `member`?
    async fn is_upline_of(&self, user_id: Uuid, member: Uuid) -> Result<bool, AppError> {
        // Cada usuário tem no máximo um indicador, então a cadeia é um caminho.
        // O conjunto só protege contra dado inconsistente no banco.
        let mut seen = HashSet::new();
        let mut current = member;

        while seen.insert(current) {
            let Some(edge) = self.store.find_by_referred_user(current).await? else {
                return Ok(false);
            };
            if edge.referrer_id == user_id {
                return Ok(true);
            }
            current = edge.referrer_id;
        }

        Ok(false)
    }

    // =========================================================================
    //  3. LEITURA (STATS E DASHBOARD)
    // =========================================================================

    pub async fn stats(&self, user_id: Uuid) -> Result<AffiliateStats, AppError> {
        let code = self.get_code(user_id).await?;
        let direct = self.store.list_direct(user_id).await?;

        Ok(tier_classifier::summarize(code.role, &direct))
    }

    pub async fn dashboard(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ReferralDashboard, AppError> {
        let code = self.get_code(user_id).await?;
        let config = RoleConfig::for_role(code.role);

        let direct = self.store.list_direct(user_id).await?;
        let network = self.store.list_network(user_id).await?;

        let stats = tier_classifier::summarize(code.role, &direct);
        let tiers = tier_classifier::classify(&config, &direct, &network);
        let completed = u32::try_from(stats.completed_referrals).unwrap_or(u32::MAX);
        let estimate = commission_estimator::estimate_with(completed, &config);

        let totals = FormattedTotals {
            total_earned: format::format_currency(tiers.total_earned),
            total_pending: format::format_currency(tiers.total_pending),
            estimate_low: format::format_currency(estimate.low),
            estimate_high: format::format_currency(estimate.high),
        };

        let referrals = direct
            .iter()
            .map(|referral| ReferralListItem {
                id: referral.id,
                name: referral.referred_user.name.clone(),
                role: referral.referred_user.role,
                status: format::status_badge(referral.status),
                joined: format::format_relative_date(now, referral.created_at),
                earned: format::format_currency(referral.earned),
            })
            .collect();

        Ok(ReferralDashboard {
            share_message: self.share_message(&code),
            code: code.code,
            role: config.role,
            headline: config.headline,
            rate_streams: config.streams,
            stats,
            tiers,
            estimate,
            totals,
            referrals,
        })
    }
}

/// Até 4 letras/dígitos do nome + 4 hex aleatórios, tudo maiúsculo.
fn generate_code(display_name: &str) -> String {
    let prefix: String = display_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let prefix = if prefix.is_empty() { FALLBACK_PREFIX.to_string() } else { prefix };
    let suffix = Uuid::new_v4().simple().to_string()[..4].to_ascii_uppercase();

    format!("{}{}", prefix, suffix)
}
