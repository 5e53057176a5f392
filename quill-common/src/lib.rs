//! Quill Common - Shared configuration and logging for the Quill ecosystem.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Logging setup and noise filtering
//!
//! Quill services share a unified configuration file at `~/.quill/config.json`;
//! each service reads the sections it cares about and ignores the rest.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;

pub use config::{Config, MarketsConfig, ObservabilityConfig};
pub use logging::init_logging;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, MarketsConfig, ObservabilityConfig};
    pub use crate::logging::init_logging;
}
