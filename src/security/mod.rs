//! Security subsystem.
//!
//! Body size limits are applied in the HTTP layer from
//! `security.max_body_size`; response hardening headers live here.

pub mod headers;

pub use headers::security_header_layers;
