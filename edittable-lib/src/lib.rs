//! Editable table state library
//!
//! A controller for paginated, sortable tables with inline single-row
//! editing, backed by a pluggable persistence adapter (REST endpoint or
//! key-value storage).

pub mod adapter;
pub mod controller;
pub mod error;
pub mod model;
pub mod notify;
pub mod query;
pub mod storage;

pub use controller::LoadOutcome;
pub use controller::TableConfig;
pub use controller::TableController;
pub use error::Error;
