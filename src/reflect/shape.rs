use std::any::{type_name, TypeId};

use crate::mapper::FieldPath;

/// Bit width of a numeric kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

/// The structural kind of a described type.
///
/// Pointer and sequence element shapes are produced lazily through function
/// pointers so that self-referential records stay describable.
#[derive(Debug, Clone)]
pub enum Kind {
    Bool,
    Int(Width),
    Uint(Width),
    Float(Width),
    Text,
    Bytes,
    Timestamp,
    RawBytes,
    Record(Vec<FieldDesc>),
    /// A nullable indirection layer (`Option<T>`).
    Pointer(fn() -> Shape),
    Sequence(fn() -> Shape),
    /// A text-keyed mapping.
    Map,
    Other,
}

/// Static description of a type the mapper or the binder can walk.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: TypeId,
    pub name: &'static str,
    pub kind: Kind,
    /// A derived type wrapping a primitive; its identity must survive conversion.
    pub named: bool,
    /// The type decodes raw driver values itself.
    pub decode: bool,
}

/// One declared field of a record.
#[derive(Debug, Clone)]
pub struct FieldDesc {
    pub name: &'static str,
    pub tag: &'static str,
    pub exported: bool,
    pub embedded: bool,
    shape_fn: fn() -> Shape,
}

struct MapMarker;

impl Shape {
    pub fn of<T: 'static>(kind: Kind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
            named: false,
            decode: false,
        }
    }

    pub fn record<T: 'static>(fields: Vec<FieldDesc>) -> Self {
        Self::of::<T>(Kind::Record(fields))
    }

    pub fn pointer<T: 'static>(pointee: fn() -> Shape) -> Self {
        Self::of::<T>(Kind::Pointer(pointee))
    }

    /// A derived type: keeps the underlying kind, takes its own identity.
    pub fn named<T: 'static>(underlying: Shape) -> Self {
        Self {
            named: true,
            ..Self::of::<T>(underlying.kind)
        }
    }

    pub fn decodable<T: 'static>() -> Self {
        Self {
            decode: true,
            ..Self::of::<T>(Kind::Other)
        }
    }

    /// Text-keyed maps share one identity; they are never destinations.
    pub fn map(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<MapMarker>(),
            name,
            kind: Kind::Map,
            named: false,
            decode: false,
        }
    }

    /// Removes every pointer layer, returning the base shape and the number
    /// of layers removed.
    pub fn peel(&self) -> (Shape, usize) {
        let mut shape = self.clone();
        let mut layers = 0;
        while let Kind::Pointer(pointee) = &shape.kind {
            let next = pointee();
            shape = next;
            layers += 1;
        }
        (shape, layers)
    }

    pub fn deref(&self) -> Shape {
        self.peel().0
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, Kind::Pointer(_))
    }

    /// True when the type, seen through any pointer layers, is a record.
    pub fn is_record(&self) -> bool {
        matches!(self.deref().kind, Kind::Record(_))
    }

    pub fn fields(&self) -> Option<&[FieldDesc]> {
        match &self.kind {
            Kind::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Resolves the shape of the field at `path`, dereferencing pointer
    /// layers between hops.
    pub fn field_shape(&self, path: &FieldPath) -> Option<Shape> {
        let mut shape = self.clone();
        for &index in path.indices() {
            let base = shape.deref();
            shape = base.fields()?.get(index)?.shape();
        }
        Some(shape)
    }

    /// Kinds the underlying scan primitive accepts as-is.
    pub fn is_directly_scannable(&self) -> bool {
        matches!(
            self.deref().kind,
            Kind::Bool
                | Kind::Int(_)
                | Kind::Uint(_)
                | Kind::Float(_)
                | Kind::Text
                | Kind::Bytes
                | Kind::Timestamp
                | Kind::RawBytes
        )
    }
}

impl FieldDesc {
    pub fn new(name: &'static str, shape_fn: fn() -> Shape) -> Self {
        Self {
            name,
            tag: "",
            exported: true,
            embedded: false,
            shape_fn,
        }
    }

    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }

    /// An anonymous field whose record contents belong to the parent namespace.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    pub fn shape(&self) -> Shape {
        (self.shape_fn)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mappable;

    #[test]
    fn test_peel_counts_pointer_layers() {
        let (base, layers) = <Option<Option<i32>>>::type_shape().peel();
        assert_eq!(layers, 2);
        assert!(matches!(base.kind, Kind::Int(Width::W32)));
        assert_eq!(base.id, TypeId::of::<i32>());
    }

    #[test]
    fn test_named_keeps_kind_and_takes_identity() {
        struct Cents;
        let shape = Shape::named::<Cents>(i64::type_shape());
        assert!(shape.named);
        assert!(matches!(shape.kind, Kind::Int(Width::W64)));
        assert_eq!(shape.id, TypeId::of::<Cents>());
    }

    #[test]
    fn test_directly_scannable() {
        assert!(bool::type_shape().is_directly_scannable());
        assert!(<Option<Vec<u8>>>::type_shape().is_directly_scannable());
        assert!(!crate::SqlValue::type_shape().is_directly_scannable());
    }
}
