//! Sorting and pagination types

mod order;
mod page;

pub use order::*;
pub use page::*;
