//! Shared types and grading engine for the Little Bites platform
//!
//! This crate contains the nutrition data model, the age-group grading
//! engine and barcode validation. It performs no I/O and is shared between
//! the backend and the on-device WASM build.

pub mod grading;
pub mod models;
pub mod validation;

pub use grading::*;
pub use models::*;
pub use validation::*;
