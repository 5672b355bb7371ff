use serde::{de::DeserializeOwned, Serialize};

use crate::{
    mapper::MapError,
    reflect::{Decode, Mappable, Reflect, Shape},
    value::SqlValue,
};

/// A column holding a JSON document, decoded into `T` with serde.
///
/// NULL leaves `T` at its default. Bound as a parameter, the document is
/// serialized back to text.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned> Decode for Json<T> {
    fn decode(&mut self, value: SqlValue) -> Result<(), MapError> {
        let parsed = match &value {
            SqlValue::Null => return Ok(()),
            SqlValue::Text(text) => serde_json::from_str(text),
            SqlValue::Bytes(bytes) => serde_json::from_slice(bytes),
            other => return Err(MapError::unsupported(other, "json")),
        };
        self.0 = parsed.map_err(|e| MapError::ConversionFailure(format!("invalid json document: {e}")))?;
        Ok(())
    }
}

impl<T: DeserializeOwned + Serialize + Default + 'static> Reflect for Json<T> {
    fn shape(&self) -> Shape { Self::type_shape() }

    fn to_value(&self) -> Option<SqlValue> {
        serde_json::to_string(&self.0).ok().map(SqlValue::Text)
    }

    fn scan(&mut self, value: SqlValue) -> Result<(), MapError> {
        self.decode(value)
    }
}

impl<T: DeserializeOwned + Serialize + Default + 'static> Mappable for Json<T> {
    fn type_shape() -> Shape { Shape::decodable::<Json<T>>() }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_decode_from_text_and_bytes() {
        let mut doc: Json<BTreeMap<String, i64>> = Json::default();
        doc.scan(SqlValue::Text(r#"{"a":1}"#.into())).unwrap();
        assert_eq!(doc.0.get("a"), Some(&1));

        doc.scan(SqlValue::Bytes(br#"{"b":2}"#.to_vec())).unwrap();
        assert_eq!(doc.0.get("b"), Some(&2));
        assert!(doc.0.get("a").is_none());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut doc: Json<Vec<i64>> = Json::default();
        assert!(matches!(doc.scan(SqlValue::Text("[1,".into())), Err(MapError::ConversionFailure(_))));
        assert!(doc.scan(SqlValue::Int(3)).is_err());
    }

    #[test]
    fn test_to_value_serializes() {
        let doc = Json(vec![1i64, 2]);
        assert_eq!(doc.to_value(), Some(SqlValue::Text("[1,2]".into())));
    }
}
