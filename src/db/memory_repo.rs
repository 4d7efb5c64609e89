// src/db/memory_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::referral_repo::ReferralStore,
    models::referral::{Referral, ReferralCode, ReferralStatus, ReferredUser, Role},
};

/// Usuário fixo dos dados de demonstração (`SEED_DEMO_DATA=true`).
pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);
pub const DEMO_CODE: &str = "DEMO4F21";

#[derive(Default)]
struct Inner {
    // user_id -> código
    codes: HashMap<Uuid, ReferralCode>,
    referrals: Vec<Referral>,
}

/// Implementação em memória do `ReferralStore`. Usada nos testes e quando
/// não há DATABASE_URL (o app roda com dados mock).
#[derive(Default)]
pub struct InMemoryReferralRepository {
    inner: RwLock<Inner>,
}

impl InMemoryReferralRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treinador de demonstração com 3 indicações diretas e 2 na rede.
    pub fn seeded_demo(now: DateTime<Utc>) -> Self {
        let mut inner = Inner::default();

        inner.codes.insert(
            DEMO_USER_ID,
            ReferralCode {
                code: DEMO_CODE.to_string(),
                user_id: DEMO_USER_ID,
                role: Role::Coach,
                created_at: now - Duration::days(120),
            },
        );

        let direct = [
            ("Marcus Silva", Role::Fighter, ReferralStatus::Completed, 20, 45),
            ("Ana Costa", Role::Fighter, ReferralStatus::Completed, 20, 9),
            ("Iron Temple Gym", Role::Gym, ReferralStatus::Pending, 35, 1),
        ];

        let mut direct_ids = Vec::new();
        for (name, role, status, earned, age_days) in direct {
            let referral = demo_referral(DEMO_USER_ID, name, role, status, earned, now - Duration::days(age_days));
            direct_ids.push(referral.referred_user.id);
            inner.referrals.push(referral);
        }

        // Rede: indicados pelo Marcus
        for (name, age_days) in [("Leo Park", 3), ("Jade Rivers", 0)] {
            inner.referrals.push(demo_referral(
                direct_ids[0],
                name,
                Role::Fighter,
                ReferralStatus::Completed,
                5,
                now - Duration::days(age_days),
            ));
        }

        Self {
            inner: RwLock::new(inner),
        }
    }
}

fn demo_referral(
    referrer_id: Uuid,
    name: &str,
    role: Role,
    status: ReferralStatus,
    earned: i64,
    created_at: DateTime<Utc>,
) -> Referral {
    let mut referral = Referral::pending(
        referrer_id,
        ReferredUser {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role,
        },
        created_at,
    );
    referral.earned = Decimal::new(earned, 0);
    if status == ReferralStatus::Completed {
        referral.status = status;
        referral.completed_at = Some(created_at);
    }
    referral
}

fn newest_first(mut referrals: Vec<Referral>) -> Vec<Referral> {
    referrals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    referrals
}

#[async_trait]
impl ReferralStore for InMemoryReferralRepository {
    async fn find_code_by_user(&self, user_id: Uuid) -> Result<Option<ReferralCode>, AppError> {
        Ok(self.inner.read().await.codes.get(&user_id).cloned())
    }

    async fn find_code(&self, code: &str) -> Result<Option<ReferralCode>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.codes.values().find(|c| c.code == code).cloned())
    }

    async fn insert_code(&self, code: &ReferralCode) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;

        let taken = inner.codes.contains_key(&code.user_id)
            || inner.codes.values().any(|c| c.code == code.code);
        if taken {
            return Ok(false);
        }

        inner.codes.insert(code.user_id, code.clone());
        Ok(true)
    }

    async fn insert_referral(&self, referral: &Referral) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;

        if inner
            .referrals
            .iter()
            .any(|r| r.referred_user.id == referral.referred_user.id)
        {
            return Err(AppError::AlreadyReferred);
        }

        inner.referrals.push(referral.clone());
        Ok(())
    }

    async fn find_referral(&self, id: Uuid) -> Result<Option<Referral>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.referrals.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_referred_user(&self, user_id: Uuid) -> Result<Option<Referral>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .referrals
            .iter()
            .find(|r| r.referred_user.id == user_id)
            .cloned())
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Referral>, AppError> {
        let mut inner = self.inner.write().await;

        Ok(inner.referrals.iter_mut().find(|r| r.id == id).map(|referral| {
            referral.status = ReferralStatus::Completed;
            referral.completed_at.get_or_insert(completed_at);
            referral.clone()
        }))
    }

    async fn add_earnings(&self, id: Uuid, amount: Decimal) -> Result<Option<Referral>, AppError> {
        let mut inner = self.inner.write().await;

        Ok(inner.referrals.iter_mut().find(|r| r.id == id).map(|referral| {
            referral.earned += amount;
            referral.clone()
        }))
    }

    async fn list_direct(&self, referrer_id: Uuid) -> Result<Vec<Referral>, AppError> {
        let inner = self.inner.read().await;
        let direct = inner
            .referrals
            .iter()
            .filter(|r| r.referrer_id == referrer_id)
            .cloned()
            .collect();

        Ok(newest_first(direct))
    }

    async fn list_network(&self, referrer_id: Uuid) -> Result<Vec<Referral>, AppError> {
        let inner = self.inner.read().await;

        let direct_users: Vec<Uuid> = inner
            .referrals
            .iter()
            .filter(|r| r.referrer_id == referrer_id)
            .map(|r| r.referred_user.id)
            .collect();

        let network = inner
            .referrals
            .iter()
            .filter(|r| direct_users.contains(&r.referrer_id))
            .cloned()
            .collect();

        Ok(newest_first(network))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_seed_shapes_tiers() {
        let repo = InMemoryReferralRepository::seeded_demo(Utc::now());

        let code = repo.find_code(DEMO_CODE).await.unwrap().unwrap();
        assert_eq!(code.user_id, DEMO_USER_ID);

        let direct = repo.list_direct(DEMO_USER_ID).await.unwrap();
        let network = repo.list_network(DEMO_USER_ID).await.unwrap();
        assert_eq!(direct.len(), 3);
        assert_eq!(network.len(), 2);

        // Mais recente primeiro
        assert_eq!(direct[0].referred_user.name, "Iron Temple Gym");
    }

    #[tokio::test]
    async fn test_network_is_one_hop_only() {
        let repo = InMemoryReferralRepository::new();
        let now = Utc::now();
        let root = Uuid::new_v4();

        let user = |name: &str| ReferredUser {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role: Role::Fighter,
        };

        let tier1 = Referral::pending(root, user("tier1"), now);
        let tier2 = Referral::pending(tier1.referred_user.id, user("tier2"), now);
        let tier3 = Referral::pending(tier2.referred_user.id, user("tier3"), now);

        for referral in [&tier1, &tier2, &tier3] {
            repo.insert_referral(referral).await.unwrap();
        }

        let network = repo.list_network(root).await.unwrap();
        assert_eq!(network.len(), 1);
        assert_eq!(network[0].id, tier2.id);
    }

    #[tokio::test]
    async fn test_insert_code_rejects_duplicates() {
        let repo = InMemoryReferralRepository::new();
        let owner = Uuid::new_v4();
        let code = ReferralCode {
            code: "ABCD1234".to_string(),
            user_id: owner,
            role: Role::Gym,
            created_at: Utc::now(),
        };

        assert!(repo.insert_code(&code).await.unwrap());
        // Mesmo usuário, código diferente
        let again = ReferralCode { code: "WXYZ9876".to_string(), ..code.clone() };
        assert!(!repo.insert_code(&again).await.unwrap());
        // Mesmo código, outro usuário
        let stolen = ReferralCode { user_id: Uuid::new_v4(), ..code };
        assert!(!repo.insert_code(&stolen).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_completed_keeps_first_timestamp() {
        let repo = InMemoryReferralRepository::new();
        let now = Utc::now();
        let referral = Referral::pending(
            Uuid::new_v4(),
            ReferredUser { id: Uuid::new_v4(), name: "A".to_string(), role: Role::Coach },
            now,
        );
        repo.insert_referral(&referral).await.unwrap();

        let first = repo.mark_completed(referral.id, now).await.unwrap().unwrap();
        let second = repo
            .mark_completed(referral.id, now + Duration::days(1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.completed_at, Some(now));
        assert_eq!(second.completed_at, Some(now));
        assert_eq!(second.status, ReferralStatus::Completed);
    }
}
