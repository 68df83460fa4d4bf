pub mod app_state;
pub mod config;
pub mod cookies;
pub mod credentials;
pub mod guard;
pub mod ingest;
pub mod logging;
pub mod rate_limit;
pub mod server;
pub mod sessions;
pub mod templates;
