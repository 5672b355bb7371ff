pub mod sql_error;
pub use sql_error::*;

pub mod skipper;
pub use skipper::*;

pub mod named;
pub use named::*;

pub mod param_lookup;
pub use param_lookup::*;

pub mod placeholder;
pub use placeholder::*;

pub mod rebind;
pub use rebind::*;

mod _tests;
