//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → HTTP server drains, prayer scheduler stops between runs
//!     → store snapshot saved → exit
//! ```
//!
//! Shutdown has a deadline (`timeouts.shutdown_grace_secs`); open WebSocket
//! streams do not hold the process past it.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{shutdown_signal, spawn_signal_listener};
