pub mod commission_estimator;
pub mod tier_classifier;
pub mod referral_service;
pub use referral_service::ReferralService;
