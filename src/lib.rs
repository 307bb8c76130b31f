pub mod app;
pub mod authz;
pub mod cache;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod guard;
pub mod jwt;
pub mod models;
pub mod session;
pub mod utils;
pub mod views;

// Re-export commonly used items for tests
pub use app::{create_app, AppState};
