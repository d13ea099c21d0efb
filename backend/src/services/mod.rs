//! Business logic services for the Little Bites platform

pub mod criteria;
pub mod grading;
pub mod history;
pub mod nutrition;
pub mod scan;

pub use grading::GradingService;
pub use history::HistoryService;
pub use nutrition::NutritionService;
pub use scan::ScanService;
