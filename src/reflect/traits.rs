use crate::{mapper::MapError, reflect::Shape, value::SqlValue};

/// Dynamic access to a value through its `Shape`.
///
/// The mapper writes through `field_mut`, `pointee_mut`, `scan` and the
/// `set_*` family; the binder reads through `field`, `pointee`, `elements`,
/// `entries` and `to_value`. Every method has a conservative default, so an
/// implementation only overrides what its kind supports.
///
/// `set_*` receive values already widened to 64 bits and narrow them into
/// the implementor's own width; a value that does not fit is a conversion
/// failure, never a silent truncation.
pub trait Reflect {
    fn shape(&self) -> Shape;

    fn field(&self, _index: usize) -> Option<&dyn Reflect> {
        None
    }

    /// Pointer layers on the way are allocated.
    fn field_mut(&mut self, _index: usize) -> Option<&mut dyn Reflect> {
        None
    }

    /// `None` for non-pointers and for empty pointers.
    fn pointee(&self) -> Option<&dyn Reflect> {
        None
    }

    /// Allocates an empty pointer before handing out its pointee.
    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        None
    }

    /// Items of an ordered sequence. Byte vectors are scalars and return `None`.
    fn elements(&self) -> Option<Vec<&dyn Reflect>> {
        None
    }

    /// Key/value pairs of a text-keyed mapping.
    fn entries(&self) -> Option<Vec<(&str, &dyn Reflect)>> {
        None
    }

    /// The driver-level form of a scalar.
    fn to_value(&self) -> Option<SqlValue> {
        None
    }

    /// The underlying scan primitive: store a raw driver value, converting
    /// on a best-effort basis.
    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        Err(MapError::unsupported(&value, self.shape().name))
    }

    fn set_bool(&mut self, _value: bool) -> Result<(), MapError> {
        Err(MapError::mismatch("bool", self.shape().name))
    }

    fn set_int(&mut self, _value: i64) -> Result<(), MapError> {
        Err(MapError::mismatch("i64", self.shape().name))
    }

    fn set_uint(&mut self, _value: u64) -> Result<(), MapError> {
        Err(MapError::mismatch("u64", self.shape().name))
    }

    fn set_float(&mut self, _value: f64) -> Result<(), MapError> {
        Err(MapError::mismatch("f64", self.shape().name))
    }

    fn set_text(&mut self, _value: String) -> Result<(), MapError> {
        Err(MapError::mismatch("text", self.shape().name))
    }

    fn set_bytes(&mut self, _value: Vec<u8>) -> Result<(), MapError> {
        Err(MapError::mismatch("bytes", self.shape().name))
    }
}

/// A destination type: describable without a value and zero-constructible.
pub trait Mappable: Reflect + Default + 'static {
    fn type_shape() -> Shape;
}

/// Custom decoding of a raw driver value. Types implementing it are
/// declared with `impl_decode!` and take over their own conversion.
pub trait Decode {
    fn decode(&mut self, value: SqlValue) -> Result<(), MapError>;
}
