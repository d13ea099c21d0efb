//! Domain models for the Little Bites platform

mod criteria;
mod grade;
mod history;
mod nutrition;

pub use criteria::*;
pub use grade::*;
pub use history::*;
pub use nutrition::*;
