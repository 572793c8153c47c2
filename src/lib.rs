pub mod cleaner;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod loader;
pub mod output;
pub mod rating;
pub mod sentiment;

pub use config::Config;
pub use coordinator::AnalysisCoordinator;
pub use error::{Error, Result};
pub use rating::RankedResult;
