//! Shared utilities for the Catalyst console
//!
//! This crate provides:
//! - ID types (SessionId, ListenerId)
//! - Time utilities (mockable wall clock, duration helpers)
//! - Error types
//! - Activity throttling
//! - Default paths for config and data directories
//! - URL and display-text helpers

mod error;
mod ids;
mod paths;
mod text;
mod throttle;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use text::*;
pub use throttle::*;
pub use time::*;
