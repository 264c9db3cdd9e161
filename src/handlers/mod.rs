pub mod auth;
pub mod catalog;
pub mod notifications;
pub mod orders;
pub mod sales;
pub mod settings;
pub mod tables;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
