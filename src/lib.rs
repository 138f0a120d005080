//! GuildHQ backend library.
//!
//! Guild documents and their operations, the HTTP API over them, and the
//! daily prayer-streak batch job.

pub mod admin;
pub mod api;
pub mod auth;
pub mod blockchain;
pub mod config;
pub mod guild;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod prayer;
pub mod security;
pub mod store;

pub use config::schema::AppConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
pub use store::GuildStore;
