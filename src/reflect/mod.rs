pub mod shape;
pub use shape::*;

pub mod tag;
pub use tag::*;

pub mod traits;
pub use traits::*;

pub mod impls;

pub mod macros;
