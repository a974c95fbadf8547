//! Google OAuth client setup for the web application's Drive/Calendar integration.

pub mod endpoints;
pub mod service;

pub use service::{GoogleSetup, setup};
