//! Data model types

mod column;
mod row;
mod row_serde;
mod value;

pub(crate) use row_serde::ID_FIELD;

pub use column::*;
pub use row::*;
pub use value::*;
