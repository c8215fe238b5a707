//! Session lifecycle guard for the Catalyst console
//!
//! This crate decides whether the console holds a usable credential:
//! - Session record (issued-at, absolute expiry, last activity)
//! - State machine (LoggedOut -> LoggedIn -> LoggedOut)
//! - Absolute and inactivity timers, expressed as scheduled deadlines
//! - Activity listener bookkeeping
//! - Request-time expiry checks

mod activity;
mod events;
mod guard;
mod session;

pub use activity::*;
pub use events::*;
pub use guard::*;
pub use session::*;
