// src/models/role_config.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::referral::Role;

// Tabela de comissões por papel. Tudo aqui é constante de configuração,
// nada é calculado a partir das indicações.

/// Uma fonte de receita exibida para o usuário (ex: "Merch 15%").
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateStream {
    #[schema(value_type = String)]
    pub label: &'static str,
    pub rate: Decimal,
    // None = pagamento único / sem recorrência
    pub recurring_months: Option<u32>,
}

/// Como a projeção mensal é montada para cada papel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateModel {
    /// Valor fixo por indicação concluída (low..high).
    PerReferral { low: Decimal, high: Decimal },
    /// Faixa por lutador, multiplicada de novo pela quantidade no total.
    PerFighterCompounded { low: Decimal, high: Decimal },
    /// Sem projeção para o papel.
    Unmodeled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleConfig {
    pub role: Role,
    pub tier1_rate: Decimal,
    pub tier2_rate: Option<Decimal>,
    pub streams: Vec<RateStream>,
    pub estimate: EstimateModel,
    pub headline: &'static str,
    pub share_pitch: &'static str,
}

impl RoleConfig {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Fighter => Self {
                role,
                tier1_rate: Decimal::new(10, 0),
                tier2_rate: None,
                streams: vec![RateStream {
                    label: "Referral commission",
                    rate: Decimal::new(10, 0),
                    recurring_months: None,
                }],
                estimate: EstimateModel::PerReferral {
                    low: Decimal::new(850, 2),
                    high: Decimal::new(15, 0),
                },
                headline: "Invite fighters, earn on every signup",
                share_pitch: "Train with me on FightNet!",
            },
            Role::Coach => Self {
                role,
                tier1_rate: Decimal::new(10, 0),
                tier2_rate: Some(Decimal::new(3, 0)),
                streams: vec![
                    RateStream {
                        label: "Direct referrals",
                        rate: Decimal::new(10, 0),
                        recurring_months: None,
                    },
                    RateStream {
                        label: "Network referrals",
                        rate: Decimal::new(3, 0),
                        recurring_months: None,
                    },
                ],
                estimate: EstimateModel::Unmodeled,
                headline: "Grow your coaching network",
                share_pitch: "Book sessions with me on FightNet!",
            },
            Role::Gym => Self {
                role,
                tier1_rate: Decimal::new(20, 0),
                tier2_rate: None,
                streams: vec![
                    RateStream {
                        label: "Membership revenue",
                        rate: Decimal::new(20, 0),
                        recurring_months: Some(12),
                    },
                    RateStream {
                        label: "Merch sales",
                        rate: Decimal::new(15, 0),
                        recurring_months: None,
                    },
                    RateStream {
                        label: "Premium upgrade",
                        rate: Decimal::new(25, 0),
                        recurring_months: None,
                    },
                ],
                estimate: EstimateModel::PerFighterCompounded {
                    low: Decimal::new(12, 0),
                    high: Decimal::new(25, 0),
                },
                headline: "Partner program for gyms",
                share_pitch: "Join our gym on FightNet!",
            },
        }
    }

    /// Taxa exibida no Tier 2. Papéis sem Tier 2 mostram 0%.
    pub fn tier2_rate_or_zero(&self) -> Decimal {
        self.tier2_rate.unwrap_or(Decimal::ZERO)
    }
}
