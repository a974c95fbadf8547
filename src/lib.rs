pub mod config;
pub mod db;
pub mod deployment;
pub mod env_check;
pub mod error;
pub mod google_oauth;
pub mod probe;
pub mod report;
pub mod runtime;
pub mod service;

pub use config::Config;
pub use error::OpsError;
