pub mod referral_repo;
pub use referral_repo::{PgReferralRepository, ReferralStore};
pub mod memory_repo;
pub use memory_repo::InMemoryReferralRepository;
