//! Shared types for the Catalyst console
//!
//! This crate defines the vocabulary shared by every other crate:
//! - Backend models (users, customers, tickets) and request payloads
//! - Session states, logout reasons and the login redirect
//! - Activity kinds that keep a session alive

mod models;
mod session;

pub use models::*;
pub use session::*;
