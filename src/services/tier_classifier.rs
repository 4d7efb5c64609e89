// src/services/tier_classifier.rs

use rust_decimal::Decimal;

use crate::models::{
    affiliate::{AffiliateStats, TierBreakdown, TierStats},
    referral::{Referral, Role},
    role_config::RoleConfig,
};

/// Monta o Tier 1 (indicações diretas) e o Tier 2 (indicações feitas pelos
/// indicados diretos).
///
/// `network_referrals` já chega resolvido pelo banco, com um nível de
/// profundidade só. Aqui não existe caminhada no grafo.
pub fn classify(
    config: &RoleConfig,
    referrals: &[Referral],
    network_referrals: &[Referral],
) -> TierBreakdown {
    let tier1 = tier_stats(config.tier1_rate, referrals);
    let tier2 = tier_stats(config.tier2_rate_or_zero(), network_referrals);

    TierBreakdown {
        total_earned: tier1.total_earned + tier2.total_earned,
        total_pending: tier1.pending_earned + tier2.pending_earned,
        tier1,
        tier2,
    }
}

fn tier_stats(rate: Decimal, referrals: &[Referral]) -> TierStats {
    referrals.iter().fold(TierStats::empty(rate), |mut stats, referral| {
        stats.total_referrals += 1;
        if referral.is_completed() {
            stats.total_earned += referral.earned;
        } else {
            stats.pending_earned += referral.earned;
        }
        stats
    })
}

/// Contadores por status. Lutadores não veem o contador de lutadores.
pub fn summarize(owner_role: Role, referrals: &[Referral]) -> AffiliateStats {
    let completed_referrals = referrals.iter().filter(|r| r.is_completed()).count();

    let fighter_referrals = match owner_role {
        Role::Fighter => None,
        Role::Gym | Role::Coach => Some(
            referrals
                .iter()
                .filter(|r| r.referred_user.role == Role::Fighter)
                .count(),
        ),
    };

    AffiliateStats {
        total_referrals: referrals.len(),
        completed_referrals,
        pending_referrals: referrals.len() - completed_referrals,
        fighter_referrals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::referral::{ReferralStatus, ReferredUser};
    use chrono::Utc;
    use uuid::Uuid;

    fn referral(status: ReferralStatus, earned: i64, role: Role) -> Referral {
        let mut referral = Referral::pending(
            Uuid::new_v4(),
            ReferredUser {
                id: Uuid::new_v4(),
                name: "Test User".to_string(),
                role,
            },
            Utc::now(),
        );
        referral.status = status;
        referral.earned = Decimal::new(earned, 0);
        referral
    }

    fn completed(earned: i64) -> Referral {
        referral(ReferralStatus::Completed, earned, Role::Fighter)
    }

    fn pending(earned: i64) -> Referral {
        referral(ReferralStatus::Pending, earned, Role::Fighter)
    }

    #[test]
    fn test_coach_scenario() {
        let config = RoleConfig::for_role(Role::Coach);
        let direct = vec![completed(20), completed(20), completed(20)];
        let network = vec![completed(5), completed(5)];

        let breakdown = classify(&config, &direct, &network);

        assert_eq!(breakdown.tier1.total_referrals, 3);
        assert_eq!(breakdown.tier1.total_earned, Decimal::new(60, 0));
        assert_eq!(breakdown.tier2.total_referrals, 2);
        assert_eq!(breakdown.tier2.total_earned, Decimal::new(10, 0));
        assert_eq!(breakdown.total_earned, Decimal::new(70, 0));
        assert_eq!(breakdown.total_pending, Decimal::ZERO);
    }

    #[test]
    fn test_pending_goes_to_pending_earned() {
        let config = RoleConfig::for_role(Role::Coach);
        let direct = vec![completed(20), pending(15)];
        let network = vec![pending(4), completed(6)];

        let breakdown = classify(&config, &direct, &network);

        assert_eq!(breakdown.tier1.total_earned, Decimal::new(20, 0));
        assert_eq!(breakdown.tier1.pending_earned, Decimal::new(15, 0));
        assert_eq!(breakdown.tier2.total_earned, Decimal::new(6, 0));
        assert_eq!(breakdown.tier2.pending_earned, Decimal::new(4, 0));
        assert_eq!(
            breakdown.total_earned,
            breakdown.tier1.total_earned + breakdown.tier2.total_earned
        );
        assert_eq!(
            breakdown.total_pending,
            breakdown.tier1.pending_earned + breakdown.tier2.pending_earned
        );
    }

    #[test]
    fn test_empty_input_keeps_rates() {
        let config = RoleConfig::for_role(Role::Coach);
        let breakdown = classify(&config, &[], &[]);

        assert_eq!(breakdown.tier1.rate, Decimal::new(10, 0));
        assert_eq!(breakdown.tier2.rate, Decimal::new(3, 0));
        assert_eq!(breakdown.tier1.total_referrals, 0);
        assert_eq!(breakdown.tier2.total_referrals, 0);
        assert_eq!(breakdown.total_earned, Decimal::ZERO);
        assert_eq!(breakdown.total_pending, Decimal::ZERO);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let config = RoleConfig::for_role(Role::Gym);
        let direct = vec![completed(30), pending(12)];
        let network = vec![completed(3)];

        assert_eq!(
            classify(&config, &direct, &network),
            classify(&config, &direct, &network)
        );
    }

    #[test]
    fn test_summarize_counts() {
        let referrals = vec![
            referral(ReferralStatus::Completed, 0, Role::Fighter),
            referral(ReferralStatus::Pending, 0, Role::Fighter),
            referral(ReferralStatus::Completed, 0, Role::Coach),
        ];

        let gym_stats = summarize(Role::Gym, &referrals);
        assert_eq!(gym_stats.total_referrals, 3);
        assert_eq!(gym_stats.completed_referrals, 2);
        assert_eq!(gym_stats.pending_referrals, 1);
        assert_eq!(gym_stats.fighter_referrals, Some(2));

        let fighter_stats = summarize(Role::Fighter, &referrals);
        assert_eq!(fighter_stats.fighter_referrals, None);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(Role::Fighter, &[]), AffiliateStats::default());
    }
}
