pub mod api;
pub mod config;
pub mod database;
pub mod food;
pub mod providers;
pub mod user;

// Re-export commonly used items
pub use config::AppConfig;
pub use food::{Analysis, Chef, Locale};
