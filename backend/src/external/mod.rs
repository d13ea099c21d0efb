//! External API integrations

pub mod fatsecret;

pub use fatsecret::FatSecretClient;
