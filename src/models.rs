pub mod affiliate;
pub mod referral;
pub mod role_config;
