pub mod hashing;
pub mod provision;
pub mod seed;

pub use hashing::{PasswordCheck, PasswordHasher};
pub use provision::{LoginCheck, ProvisionOutcome, check_admin_login, diagnose, ensure_admin};
pub use seed::{SeedCollection, SeedOutcome, seed_all, seed_if_empty};
