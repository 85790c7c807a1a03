//! Synthetic academic dataset generation: an academic calendar, student
//! profiles, assessments with extensions, and submissions with simulated
//! marking delay, plus the risk and marking summaries built on top.

pub mod analysis;
pub mod assessment;
pub mod calendar;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod profile;
pub mod random;
pub mod report;
pub mod risk;
pub mod submission;

pub use calendar::AcademicCalendar;
pub use config::GeneratorConfig;
pub use dataset::{Dataset, DatasetGenerator};
pub use error::ConfigError;
pub use random::RandomSource;
