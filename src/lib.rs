pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod validation;

pub use app::router;
pub use config::AppConfig;
pub use error::Failure;
pub use state::AppState;
