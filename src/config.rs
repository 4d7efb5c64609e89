// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{memory_repo::{DEMO_CODE, DEMO_USER_ID}, InMemoryReferralRepository, PgReferralRepository, ReferralStore},
    services::ReferralService,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SHARE_BASE_URL: &str = "https://app.fightnet.app/join";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // Sem DATABASE_URL o app roda com o repositório em memória
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub seed_demo_data: bool,
    pub share_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let seed_demo_data = match non_empty("SEED_DEMO_DATA") {
            None => false,
            Some(value) => parse_flag(&value)
                .with_context(|| format!("SEED_DEMO_DATA must be true/false, got '{}'", value))?,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            seed_demo_data,
            share_base_url: non_empty("SHARE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SHARE_BASE_URL.to_string()),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Clone)]
pub struct AppState {
    // O serviço é montado uma vez e injetado em todos os handlers
    pub referral_service: ReferralService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        // --- Monta o gráfico de dependências ---
        let store: Arc<dyn ReferralStore> = match &config.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;

                tracing::info!("✅ Database connection established");

                sqlx::migrate!()
                    .run(&db_pool)
                    .await
                    .context("Failed to run database migrations")?;

                tracing::info!("✅ Database migrations applied");

                Arc::new(PgReferralRepository::new(db_pool))
            }
            None if config.seed_demo_data => {
                tracing::warn!(
                    "⚠️ DATABASE_URL not set, using in-memory demo data (demo user {}, code {})",
                    DEMO_USER_ID,
                    DEMO_CODE
                );
                Arc::new(InMemoryReferralRepository::seeded_demo(Utc::now()))
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL not set, using an empty in-memory store");
                Arc::new(InMemoryReferralRepository::new())
            }
        };

        let referral_service = ReferralService::new(store, config.share_base_url.clone());

        Ok(Self { referral_service })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(!config.seed_demo_data);
        assert_eq!(config.share_base_url, DEFAULT_SHARE_BASE_URL);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/referrals"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("SEED_DEMO_DATA", "TRUE"),
            ("SHARE_BASE_URL", "https://example.com/invite"),
        ])
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/referrals"));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert!(config.seed_demo_data);
        assert_eq!(config.share_base_url, "https://example.com/invite");
    }

    #[test]
    fn test_blank_database_url_is_ignored() {
        let config = config_from(&[("DATABASE_URL", "   ")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_invalid_flag() {
        assert!(config_from(&[("SEED_DEMO_DATA", "maybe")]).is_err());
    }

    #[tokio::test]
    async fn test_state_with_demo_data() {
        let config = config_from(&[("SEED_DEMO_DATA", "1")]).unwrap();
        let state = AppState::new(&config).await.unwrap();

        let dashboard = state
            .referral_service
            .dashboard(DEMO_USER_ID, Utc::now())
            .await
            .unwrap();
        assert_eq!(dashboard.stats.total_referrals, 3);
        assert_eq!(dashboard.tiers.tier2.total_referrals, 2);
    }
}
