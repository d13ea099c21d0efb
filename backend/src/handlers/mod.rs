//! HTTP request handlers

mod criteria;
mod grading;
mod health;
mod history;
mod products;
mod scan;

pub use criteria::*;
pub use grading::*;
pub use health::*;
pub use history::*;
pub use products::*;
pub use scan::*;
