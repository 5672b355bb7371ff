/// Describes a record so it can be scanned into and bound from.
///
/// Each field is listed with its type, an optional binding tag after `=`,
/// and optional flags in brackets: `embedded` for an anonymous field whose
/// record contents belong to the parent namespace, `private` for a field
/// the mapper and binder must not see.
///
/// ```
/// use rowbind::impl_record;
///
/// #[derive(Debug, Default)]
/// struct Audit { created_by: String }
/// impl_record!(Audit { created_by: String });
///
/// #[derive(Debug, Default)]
/// struct User { id: i64, email: String, audit: Audit, token: String }
/// impl_record!(User {
///     id: i64 = "id",
///     email: String,
///     audit: Audit [embedded],
///     token: String [private],
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ident { $( $field:ident : $fty:ty $(= $tag:literal)? $([ $($flag:ident),* ])? ),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn shape(&self) -> $crate::Shape {
                <$ty as $crate::Mappable>::type_shape()
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field(&self, index: usize) -> Option<&dyn $crate::Reflect> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return Some(&self.$field as &dyn $crate::Reflect);
                    }
                    position += 1;
                )*
                None
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field_mut(&mut self, index: usize) -> Option<&mut dyn $crate::Reflect> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return Some(&mut self.$field as &mut dyn $crate::Reflect);
                    }
                    position += 1;
                )*
                None
            }
        }

        impl $crate::Mappable for $ty {
            fn type_shape() -> $crate::Shape {
                $crate::Shape::record::<$ty>(vec![
                    $(
                        $crate::FieldDesc::new(stringify!($field), <$fty as $crate::Mappable>::type_shape)
                            $(.tag($tag))?
                            $($(.$flag())*)?
                    ),*
                ])
            }
        }
    };
}

/// Declares a newtype over a primitive as a derived type. Conversions write
/// through the wrapper, so the newtype's identity is preserved.
///
/// ```
/// use rowbind::impl_named;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct UserId(i64);
/// impl_named!(UserId(i64));
/// ```
#[macro_export]
macro_rules! impl_named {
    ($ty:ident($inner:ty)) => {
        impl $crate::Reflect for $ty {
            fn shape(&self) -> $crate::Shape {
                <$ty as $crate::Mappable>::type_shape()
            }

            fn pointee(&self) -> Option<&dyn $crate::Reflect> { $crate::Reflect::pointee(&self.0) }

            fn pointee_mut(&mut self) -> Option<&mut dyn $crate::Reflect> { $crate::Reflect::pointee_mut(&mut self.0) }

            fn elements(&self) -> Option<Vec<&dyn $crate::Reflect>> { $crate::Reflect::elements(&self.0) }

            fn to_value(&self) -> Option<$crate::SqlValue> { $crate::Reflect::to_value(&self.0) }

            fn scan(&mut self, value: $crate::SqlValue) -> Result<(), $crate::MapError> { $crate::Reflect::scan(&mut self.0, value) }

            fn set_bool(&mut self, value: bool) -> Result<(), $crate::MapError> { $crate::Reflect::set_bool(&mut self.0, value) }

            fn set_int(&mut self, value: i64) -> Result<(), $crate::MapError> { $crate::Reflect::set_int(&mut self.0, value) }

            fn set_uint(&mut self, value: u64) -> Result<(), $crate::MapError> { $crate::Reflect::set_uint(&mut self.0, value) }

            fn set_float(&mut self, value: f64) -> Result<(), $crate::MapError> { $crate::Reflect::set_float(&mut self.0, value) }

            fn set_text(&mut self, value: String) -> Result<(), $crate::MapError> { $crate::Reflect::set_text(&mut self.0, value) }

            fn set_bytes(&mut self, value: Vec<u8>) -> Result<(), $crate::MapError> { $crate::Reflect::set_bytes(&mut self.0, value) }
        }

        impl $crate::Mappable for $ty {
            fn type_shape() -> $crate::Shape {
                $crate::Shape::named::<$ty>(<$inner as $crate::Mappable>::type_shape())
            }
        }
    };
}

/// Declares a type implementing [`Decode`](crate::Decode) as a destination
/// that converts raw driver values itself.
#[macro_export]
macro_rules! impl_decode {
    ($ty:ty) => {
        impl $crate::Reflect for $ty {
            fn shape(&self) -> $crate::Shape {
                <$ty as $crate::Mappable>::type_shape()
            }

            fn scan(&mut self, value: $crate::SqlValue) -> Result<(), $crate::MapError> {
                $crate::Decode::decode(self, value)
            }
        }

        impl $crate::Mappable for $ty {
            fn type_shape() -> $crate::Shape {
                $crate::Shape::decodable::<$ty>()
            }
        }
    };
}

/// Builds an ordered, text-keyed parameter map of borrowed values.
///
/// Values are borrowed, so pass literals or bindings that outlive the map.
///
/// ```
/// use rowbind::{params, rebind, Dialect};
///
/// let ids = vec![1i64, 2];
/// let p = params! { "status" => "active", "ids" => ids };
/// let bound = rebind("status = :status AND id IN (:ids)", Dialect::Dollar, &[&p]).unwrap();
/// assert_eq!(bound.query, "status = $1 AND id IN ($2,$3)");
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::indexmap::IndexMap::<String, &dyn $crate::Reflect>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map: $crate::indexmap::IndexMap<String, &dyn $crate::Reflect> = $crate::indexmap::IndexMap::new();
        $( map.insert(::std::string::String::from($key), &$value as &dyn $crate::Reflect); )+
        map
    }};
}
