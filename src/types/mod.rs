//! Data model shared by the generators, metrics and adapters
//!
//! Wire field names are camelCase; input rows also accept the spreadsheet
//! column headings.

mod customer;
mod event;
mod run;
mod service;

pub use customer::*;
pub use event::*;
pub use run::*;
pub use service::*;
