// src/services/commission_estimator.rs

use rust_decimal::Decimal;

use crate::models::{
    affiliate::{CommissionEstimate, EarningsRange},
    referral::Role,
    role_config::{EstimateModel, RoleConfig},
};

/// Faixa de ganho mensal potencial a partir das indicações concluídas.
/// Só para exibição.
pub fn estimate(completed_referrals: u32, role: Role) -> CommissionEstimate {
    estimate_with(completed_referrals, &RoleConfig::for_role(role))
}

pub fn estimate_with(completed_referrals: u32, config: &RoleConfig) -> CommissionEstimate {
    if completed_referrals == 0 {
        return CommissionEstimate::zero();
    }

    let count = Decimal::from(completed_referrals);

    match config.estimate {
        EstimateModel::PerReferral { low, high } => CommissionEstimate {
            low: count * low,
            high: count * high,
            per_fighter: None,
        },
        EstimateModel::PerFighterCompounded { low, high } => {
            let per_fighter = EarningsRange {
                low: count * low,
                high: count * high,
            };
            // O total multiplica pela quantidade uma segunda vez (curva quadrática).
            // Mantido igual à tela atual até o produto decidir.
            CommissionEstimate {
                low: per_fighter.low * count,
                high: per_fighter.high * count,
                per_fighter: Some(per_fighter),
            }
        }
        EstimateModel::Unmodeled => CommissionEstimate::zero(),
    }
}
