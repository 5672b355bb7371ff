//! Type-directed row mapping and dialect-aware named parameter rebinding.
//!
//! Destination types describe themselves through [`Mappable`] (usually via
//! [`impl_record!`], [`impl_named!`] or [`impl_decode!`]); a [`Mapper`] turns
//! cursor rows into those types using plans cached per column signature.
//! [`rebind`] resolves `:name` parameters from a record or text-keyed map and
//! rewrites `?` markers for the target [`Dialect`].

pub mod value;
pub use value::*;

pub mod reflect;
pub use reflect::*;

pub mod mapper;
pub use mapper::*;

pub mod sql;
pub use sql::*;

pub mod config;
pub use config::*;

#[doc(hidden)]
pub use indexmap;
