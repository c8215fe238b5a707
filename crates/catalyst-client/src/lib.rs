//! HTTP client and backend services for the Catalyst console
//!
//! Every request passes through the same chain:
//! - auth: the session guard hands out the bearer token, or ends the
//!   session first when it has expired
//! - loading: in-flight counter for busy indicators
//! - notification: success/failure toasts for mutating requests
//!
//! Services wrap the backend's auth, user, customer and ticket endpoints.

mod auth;
mod client;
mod customers;
mod error;
mod loading;
mod mock;
mod notify;
mod reqwest_transport;
mod tickets;
mod transport;
mod users;

pub use auth::*;
pub use client::*;
pub use customers::*;
pub use error::*;
pub use loading::*;
pub use mock::*;
pub use notify::*;
pub use reqwest_transport::*;
pub use tickets::*;
pub use transport::*;
pub use users::*;
