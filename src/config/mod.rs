//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! guildhq.toml
//!     → loader.rs (parse, env overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via ArcSwap to handlers
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → atomic swap of Arc<AppConfig>
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Listener, store and chain settings are read once at startup; reloads
//!   affect per-request settings (auth secret, admin key, guild defaults)

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AdminConfig, AppConfig, AuthConfig, BlockchainConfig, GuildConfig, ListenerConfig,
    ObservabilityConfig, PrayerConfig, SecurityConfig, StoreConfig, TimeoutConfig, TlsConfig,
};
