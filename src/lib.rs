pub mod app;
pub mod common;
pub mod config;
pub mod docs;
pub mod infrastructure;
pub mod modules;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use common::error::DubError;
pub use config::AppConfig;
pub use state::AppState;
