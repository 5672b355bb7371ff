use std::{
    any::{Any, TypeId},
    collections::{BTreeMap, HashMap},
};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::{
    mapper::MapError,
    reflect::{Kind, Mappable, Reflect, Shape, Width},
    value::{RawBytes, SqlValue},
};

macro_rules! signed {
    ($($ty:ty => $width:ident),* $(,)?) => {$(
        impl Reflect for $ty {
            fn shape(&self) -> Shape { <$ty as Mappable>::type_shape() }

            fn to_value(&self) -> Option<SqlValue> { Some(SqlValue::Int(i64::from(*self))) }

            fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
                match value.to_i64()? {
                    Some(v) => self.set_int(v),
                    None => Err(MapError::null_into(stringify!($ty))),
                }
            }

            fn set_int(&mut self, value: i64) -> Result<(), MapError> {
                *self = <$ty>::try_from(value).map_err(|_| MapError::overflow(value, stringify!($ty)))?;
                Ok(())
            }

            fn set_uint(&mut self, value: u64) -> Result<(), MapError> {
                *self = <$ty>::try_from(value).map_err(|_| MapError::overflow(value, stringify!($ty)))?;
                Ok(())
            }
        }

        impl Mappable for $ty {
            fn type_shape() -> Shape { Shape::of::<$ty>(Kind::Int(Width::$width)) }
        }
    )*};
}

macro_rules! unsigned {
    ($($ty:ty => $width:ident),* $(,)?) => {$(
        impl Reflect for $ty {
            fn shape(&self) -> Shape { <$ty as Mappable>::type_shape() }

            fn to_value(&self) -> Option<SqlValue> { Some(SqlValue::Uint(u64::from(*self))) }

            fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
                match value.to_u64()? {
                    Some(v) => self.set_uint(v),
                    None => Err(MapError::null_into(stringify!($ty))),
                }
            }

            fn set_int(&mut self, value: i64) -> Result<(), MapError> {
                *self = <$ty>::try_from(value).map_err(|_| MapError::overflow(value, stringify!($ty)))?;
                Ok(())
            }

            fn set_uint(&mut self, value: u64) -> Result<(), MapError> {
                *self = <$ty>::try_from(value).map_err(|_| MapError::overflow(value, stringify!($ty)))?;
                Ok(())
            }
        }

        impl Mappable for $ty {
            fn type_shape() -> Shape { Shape::of::<$ty>(Kind::Uint(Width::$width)) }
        }
    )*};
}

signed!(i8 => W8, i16 => W16, i32 => W32, i64 => W64);
unsigned!(u8 => W8, u16 => W16, u32 => W32, u64 => W64);

impl Reflect for f32 {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn to_value(&self) -> Option<SqlValue> { Some(SqlValue::Float(f64::from(*self))) }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        match value.to_f64()? {
            Some(v) => self.set_float(v),
            None => Err(MapError::null_into("f32")),
        }
    }

    fn set_float(&mut self, value: f64) -> Result<(), MapError> {
        if value.is_finite() && value.abs() > f64::from(f32::MAX) {
            return Err(MapError::overflow(value, "f32"));
        }
        *self = value as f32;
        Ok(())
    }
}

impl Mappable for f32 {
    fn type_shape() -> Shape { Shape::of::<f32>(Kind::Float(Width::W32)) }
}

impl Reflect for f64 {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn to_value(&self) -> Option<SqlValue> { Some(SqlValue::Float(*self)) }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        match value.to_f64()? {
            Some(v) => self.set_float(v),
            None => Err(MapError::null_into("f64")),
        }
    }

    fn set_float(&mut self, value: f64) -> Result<(), MapError> {
        *self = value;
        Ok(())
    }
}

impl Mappable for f64 {
    fn type_shape() -> Shape { Shape::of::<f64>(Kind::Float(Width::W64)) }
}

impl Reflect for bool {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn to_value(&self) -> Option<SqlValue> { Some(SqlValue::Bool(*self)) }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        match value.to_bool()? {
            Some(v) => self.set_bool(v),
            None => Err(MapError::null_into("bool")),
        }
    }

    fn set_bool(&mut self, value: bool) -> Result<(), MapError> {
        *self = value;
        Ok(())
    }
}

impl Mappable for bool {
    fn type_shape() -> Shape { Shape::of::<bool>(Kind::Bool) }
}

impl Reflect for String {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn to_value(&self) -> Option<SqlValue> { Some(SqlValue::Text(self.clone())) }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        self.set_text(value.to_text().unwrap_or_default())
    }

    fn set_text(&mut self, value: String) -> Result<(), MapError> {
        *self = value;
        Ok(())
    }

    fn set_bytes(&mut self, value: Vec<u8>) -> Result<(), MapError> {
        *self = String::from_utf8_lossy(&value).into_owned();
        Ok(())
    }
}

impl Mappable for String {
    fn type_shape() -> Shape { Shape::of::<String>(Kind::Text) }
}

impl Reflect for &str {
    fn shape(&self) -> Shape { Shape::of::<&'static str>(Kind::Text) }

    fn to_value(&self) -> Option<SqlValue> { Some(SqlValue::Text((*self).to_string())) }
}

// Bind-only: scanning into a borrowed str is always a conversion failure.
impl Mappable for &'static str {
    fn type_shape() -> Shape { Shape::of::<&'static str>(Kind::Text) }
}

impl Reflect for DateTime<Utc> {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn to_value(&self) -> Option<SqlValue> { Some(SqlValue::Timestamp(*self)) }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        match value.to_timestamp()? {
            Some(ts) => {
                *self = ts;
                Ok(())
            }
            None => Err(MapError::null_into("timestamp")),
        }
    }
}

impl Mappable for DateTime<Utc> {
    fn type_shape() -> Shape { Shape::of::<DateTime<Utc>>(Kind::Timestamp) }
}

impl Reflect for RawBytes {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn to_value(&self) -> Option<SqlValue> { Some(SqlValue::Bytes(self.0.clone())) }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        self.absorb(&value);
        Ok(())
    }
}

impl Mappable for RawBytes {
    fn type_shape() -> Shape { Shape::of::<RawBytes>(Kind::RawBytes) }
}

// Holds whatever the driver produced, like an untyped interface slot.
impl Reflect for SqlValue {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn to_value(&self) -> Option<SqlValue> { Some(self.clone()) }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        *self = value;
        Ok(())
    }
}

impl Mappable for SqlValue {
    fn type_shape() -> Shape { Shape::of::<SqlValue>(Kind::Other) }
}

impl<T: Mappable> Reflect for Option<T> {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_ref()?.field(index)
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_or_insert_with(T::default).field_mut(index)
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(self.get_or_insert_with(T::default) as &mut dyn Reflect)
    }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> {
        self.as_ref()?.elements()
    }

    fn entries(&self) -> Option<Vec<(&str, &dyn Reflect)>> {
        self.as_ref()?.entries()
    }

    fn to_value(&self) -> Option<SqlValue> {
        match self {
            Some(v) => v.to_value(),
            None => Some(SqlValue::Null),
        }
    }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::default).scan(value)
    }

    fn set_bool(&mut self, value: bool) -> Result<(), MapError> {
        self.get_or_insert_with(T::default).set_bool(value)
    }

    fn set_int(&mut self, value: i64) -> Result<(), MapError> {
        self.get_or_insert_with(T::default).set_int(value)
    }

    fn set_uint(&mut self, value: u64) -> Result<(), MapError> {
        self.get_or_insert_with(T::default).set_uint(value)
    }

    fn set_float(&mut self, value: f64) -> Result<(), MapError> {
        self.get_or_insert_with(T::default).set_float(value)
    }

    fn set_text(&mut self, value: String) -> Result<(), MapError> {
        self.get_or_insert_with(T::default).set_text(value)
    }

    fn set_bytes(&mut self, value: Vec<u8>) -> Result<(), MapError> {
        self.get_or_insert_with(T::default).set_bytes(value)
    }
}

impl<T: Mappable> Mappable for Option<T> {
    fn type_shape() -> Shape { Shape::pointer::<Option<T>>(T::type_shape) }
}

// Boxes are transparent: they only exist to make recursive records sized.
impl<T: Mappable> Reflect for Box<T> {
    fn shape(&self) -> Shape { T::type_shape() }

    fn field(&self, index: usize) -> Option<&dyn Reflect> { (**self).field(index) }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> { (**self).field_mut(index) }

    fn pointee(&self) -> Option<&dyn Reflect> { (**self).pointee() }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> { (**self).pointee_mut() }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> { (**self).elements() }

    fn entries(&self) -> Option<Vec<(&str, &dyn Reflect)>> { (**self).entries() }

    fn to_value(&self) -> Option<SqlValue> { (**self).to_value() }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> { (**self).scan(value) }

    fn set_bool(&mut self, value: bool) -> Result<(), MapError> { (**self).set_bool(value) }

    fn set_int(&mut self, value: i64) -> Result<(), MapError> { (**self).set_int(value) }

    fn set_uint(&mut self, value: u64) -> Result<(), MapError> { (**self).set_uint(value) }

    fn set_float(&mut self, value: f64) -> Result<(), MapError> { (**self).set_float(value) }

    fn set_text(&mut self, value: String) -> Result<(), MapError> { (**self).set_text(value) }

    fn set_bytes(&mut self, value: Vec<u8>) -> Result<(), MapError> { (**self).set_bytes(value) }
}

impl<T: Mappable> Mappable for Box<T> {
    fn type_shape() -> Shape { T::type_shape() }
}

// Lets heterogeneous parameter maps hold borrowed values of any type.
impl<'r> Reflect for &'r (dyn Reflect + 'r) {
    fn shape(&self) -> Shape { (**self).shape() }

    fn field(&self, index: usize) -> Option<&dyn Reflect> { (**self).field(index) }

    fn pointee(&self) -> Option<&dyn Reflect> { (**self).pointee() }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> { (**self).elements() }

    fn entries(&self) -> Option<Vec<(&str, &dyn Reflect)>> { (**self).entries() }

    fn to_value(&self) -> Option<SqlValue> { (**self).to_value() }
}

fn is_byte<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<u8>()
}

fn byte_items<T: 'static>(items: &[T]) -> Vec<u8> {
    items.iter().filter_map(|item| (item as &dyn Any).downcast_ref::<u8>().copied()).collect()
}

fn sequence_shape<S: 'static, T: Mappable>() -> Shape {
    if is_byte::<T>() {
        Shape::of::<S>(Kind::Bytes)
    } else {
        Shape::of::<S>(Kind::Sequence(T::type_shape))
    }
}

fn sequence_elements<T: Mappable>(items: &[T]) -> Option<Vec<&dyn Reflect>> {
    if is_byte::<T>() {
        return None;
    }
    Some(items.iter().map(|item| item as &dyn Reflect).collect())
}

// Byte vectors are scalar bytes; every other element type expands.
impl<T: Mappable> Reflect for Vec<T> {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> { sequence_elements(self) }

    fn to_value(&self) -> Option<SqlValue> {
        is_byte::<T>().then(|| SqlValue::Bytes(byte_items(self)))
    }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        if !is_byte::<T>() {
            return Err(MapError::unsupported(&value, self.shape().name));
        }
        self.set_bytes(value.to_bytes().unwrap_or_default())
    }

    fn set_text(&mut self, value: String) -> Result<(), MapError> {
        self.set_bytes(value.into_bytes())
    }

    fn set_bytes(&mut self, value: Vec<u8>) -> Result<(), MapError> {
        if let Some(bytes) = (&mut *self as &mut dyn Any).downcast_mut::<Vec<u8>>() {
            *bytes = value;
            return Ok(());
        }
        Err(MapError::mismatch("bytes", self.shape().name))
    }
}

impl<T: Mappable> Mappable for Vec<T> {
    fn type_shape() -> Shape { sequence_shape::<Vec<T>, T>() }
}

impl<T: Mappable> Reflect for &[T] {
    fn shape(&self) -> Shape { sequence_shape::<&'static [T], T>() }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> { sequence_elements(self) }

    fn to_value(&self) -> Option<SqlValue> {
        is_byte::<T>().then(|| SqlValue::Bytes(byte_items(self)))
    }
}

// Arrays always expand, whatever the element type.
impl<T: Mappable, const N: usize> Reflect for [T; N] {
    fn shape(&self) -> Shape { Shape::of::<[T; N]>(Kind::Sequence(T::type_shape)) }

    fn elements(&self) -> Option<Vec<&dyn Reflect>> {
        Some(self.iter().map(|item| item as &dyn Reflect).collect())
    }
}

macro_rules! text_keyed_map {
    ($($map:ident),* $(,)?) => {$(
        impl<V: Reflect> Reflect for $map<String, V> {
            fn shape(&self) -> Shape { Shape::map(stringify!($map)) }

            fn entries(&self) -> Option<Vec<(&str, &dyn Reflect)>> {
                Some(self.iter().map(|(key, value)| (key.as_str(), value as &dyn Reflect)).collect())
            }
        }
    )*};
}

text_keyed_map!(HashMap, BTreeMap, IndexMap);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrowing_is_checked() {
        let mut small = 0i32;
        small.set_int(7).unwrap();
        assert_eq!(small, 7);
        assert!(small.set_int(i64::from(i32::MAX) + 1).is_err());
        assert_eq!(small, 7);

        let mut byte = 0u8;
        assert!(byte.set_int(-1).is_err());
        byte.set_uint(255).unwrap();
        assert_eq!(byte, 255);

        let mut float = 0f32;
        assert!(float.set_float(f64::MAX).is_err());
        float.set_float(1.5).unwrap();
        assert_eq!(float, 1.5);
    }

    #[test]
    fn test_option_allocates_and_clears() {
        let mut value: Option<i16> = None;
        value.set_int(3).unwrap();
        assert_eq!(value, Some(3));
        value.scan(SqlValue::Null).unwrap();
        assert_eq!(value, None);
        value.scan(SqlValue::Text("12".into())).unwrap();
        assert_eq!(value, Some(12));
    }

    #[test]
    fn test_null_into_plain_numeric_fails() {
        let mut value = 0i64;
        assert!(matches!(value.scan(SqlValue::Null), Err(MapError::ConversionFailure(_))));
    }

    #[test]
    fn test_bytes_are_scalar_but_arrays_expand() {
        let bytes = vec![1u8, 2, 3];
        assert!(bytes.elements().is_none());
        assert_eq!(bytes.to_value(), Some(SqlValue::Bytes(vec![1, 2, 3])));

        let array = [1u8, 2];
        assert_eq!(array.elements().map(|items| items.len()), Some(2));
    }

    #[test]
    fn test_sequence_elements_keep_order() {
        let ids = vec![7i64, 8, 9];
        let values: Vec<_> = ids.elements().unwrap().iter().map(|item| item.to_value()).collect();
        assert_eq!(values, vec![Some(SqlValue::Int(7)), Some(SqlValue::Int(8)), Some(SqlValue::Int(9))]);
    }

    #[test]
    fn test_any_element_type_expands() {
        let names = vec!["a", "b"];
        let maybe = vec![Some(1i64), None];
        let nested = vec![vec![1u8], vec![2u8]];
        let slice: &[u32] = &[4, 5, 6];

        fn values(items: Option<Vec<&dyn Reflect>>) -> Vec<Option<SqlValue>> {
            items.unwrap().iter().map(|item| item.to_value()).collect()
        }
        assert_eq!(values(names.elements()), vec![Some(SqlValue::Text("a".into())), Some(SqlValue::Text("b".into()))]);
        assert_eq!(values(maybe.elements()), vec![Some(SqlValue::Int(1)), Some(SqlValue::Null)]);
        assert_eq!(values(nested.elements()), vec![Some(SqlValue::Bytes(vec![1])), Some(SqlValue::Bytes(vec![2]))]);
        assert_eq!(slice.elements().map(|items| items.len()), Some(3));
        assert!(matches!(<Vec<Option<i64>>>::type_shape().kind, Kind::Sequence(_)));
    }

    #[test]
    fn test_byte_slices_and_vectors_stay_bytes() {
        let slice: &[u8] = b"raw";
        assert!(slice.elements().is_none());
        assert_eq!(slice.to_value(), Some(SqlValue::Bytes(b"raw".to_vec())));
        assert!(matches!(<Vec<u8>>::type_shape().kind, Kind::Bytes));

        let mut bytes: Vec<u8> = Vec::new();
        bytes.scan(SqlValue::Text("hi".into())).unwrap();
        assert_eq!(bytes, b"hi".to_vec());

        let mut ids: Vec<i64> = Vec::new();
        assert!(ids.scan(SqlValue::Bytes(vec![1])).is_err());
        assert!(ids.set_bytes(vec![1]).is_err());
    }

    #[test]
    fn test_map_entries_and_borrowed_values() {
        let ids = vec![1i64];
        let mut map: HashMap<String, &dyn Reflect> = HashMap::new();
        map.insert("ids".into(), &ids);
        map.insert("name".into(), &"bob");

        let entries = map.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(map.shape().kind, Kind::Map));
        let name = entries.iter().find(|(key, _)| *key == "name").unwrap().1;
        assert_eq!(name.to_value(), Some(SqlValue::Text("bob".into())));
    }
}
