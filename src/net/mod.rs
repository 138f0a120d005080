//! Network layer subsystem.
//!
//! Plain TCP is served by `axum::serve`; TLS by `axum-server` with the
//! rustls config loaded here.

pub mod tls;

pub use tls::load_tls_config;
