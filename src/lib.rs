pub mod config;
pub mod fetcher;
pub mod identity;
pub mod models;
pub mod notifier;
pub mod plugins;
pub mod store;
pub mod utils;
pub mod watcher;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;
pub use watcher::{RunSummary, Watcher};

pub type Result<T> = std::result::Result<T, AppError>;
