//! Error types

mod adapter;
mod state;
mod table;

pub use adapter::*;
pub use state::*;
pub use table::*;
