//! Configuration and bootstrap for Marquee.
//!
//! Loads [`MarqueeConfig`] from files and environment, installs the tracing
//! subscriber, and wires the core stores to the configured backend. The
//! `marquee` binary is a thin command-line client over these pieces.

pub mod models;
pub mod runtime;
pub mod telemetry;

pub use models::{
    ConfigSource, IdentityConfig, MarqueeConfig, StorageBackend, StorageConfig,
};
pub use runtime::build_stores;
