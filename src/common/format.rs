// src/common/format.rs

use chrono::{DateTime, Utc};
use qrcode::{render::svg, QrCode};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::error::AppError;
use crate::models::{
    affiliate::StatusBadge,
    referral::{ReferralStatus, Role},
    role_config::RoleConfig,
};

const MS_PER_DAY: i64 = 86_400_000;

/// `$X.XX`, arredondando meio centavo para cima.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

/// Data relativa ("Today", "3 days ago", ...) a partir do `created_at`.
///
/// Os textos seguem os limiares literais da tela: sem plural, sem
/// localização. Datas no futuro viram "Today".
pub fn format_relative_date(now: DateTime<Utc>, created: DateTime<Utc>) -> String {
    let diff_days = (now - created).num_milliseconds().div_euclid(MS_PER_DAY);

    if diff_days < 0 {
        tracing::debug!("created_at {} is in the future, showing as Today", created);
        return "Today".to_string();
    }

    match diff_days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n if n < 7 => format!("{} days ago", n),
        n if n < 30 => format!("{} weeks ago", n / 7),
        n => format!("{} months ago", n / 30),
    }
}

pub fn status_badge(status: ReferralStatus) -> StatusBadge {
    match status {
        ReferralStatus::Pending => StatusBadge { label: "Pending", tone: "warning" },
        ReferralStatus::Completed => StatusBadge { label: "Completed", tone: "success" },
    }
}

pub fn share_link(base_url: &str, code: &str) -> String {
    format!("{}?code={}", base_url.trim_end_matches('/'), code)
}

/// Texto entregue ao share sheet do app. O "copiar" usa só o código.
pub fn share_message(base_url: &str, code: &str, role: Role) -> String {
    let config = RoleConfig::for_role(role);
    format!(
        "{} Use my code {} when you sign up: {}",
        config.share_pitch,
        code,
        share_link(base_url, code)
    )
}

/// QR Code do link de convite, em SVG.
pub fn share_qr_svg(link: &str) -> Result<String, AppError> {
    let code = QrCode::new(link.as_bytes()).map_err(|e| AppError::QrCodeError(e.to_string()))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .build())
}
