//! Presentation models for the Catalyst console
//!
//! Shared by the user, customer and ticket screens:
//! - Column mappings and the filterable, sortable, exportable table
//! - Filter forms for each entity list
//! - Dynamic form model with validation and edit mode
//! - Route table with the authentication guard

mod columns;
mod filters;
mod forms;
mod routes;
mod table;

pub use columns::*;
pub use filters::*;
pub use forms::*;
pub use routes::*;
pub use table::*;
