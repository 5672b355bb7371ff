pub mod sql_value;
pub use sql_value::*;

pub mod raw_bytes;
pub use raw_bytes::*;

pub mod json;
pub use json::*;
