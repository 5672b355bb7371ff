use indexmap::IndexMap;

use crate::{
    reflect::{Kind, Reflect, Tag},
    sql::SqlError,
};

/// Case-insensitive name to value table built from one named-binding
/// argument.
#[derive(Default)]
pub struct ParamLookup<'a> {
    values: IndexMap<String, &'a dyn Reflect>,
}

impl<'a> ParamLookup<'a> {
    /// Accepts a text-keyed map or a record, behind any number of pointer
    /// layers. Record fields that resolve to the same name are an error.
    pub fn build(params: &'a dyn Reflect) -> Result<Self, SqlError> {
        let mut value = params;
        while value.shape().is_pointer() {
            value = value.pointee().ok_or(SqlError::NilParameters)?;
        }

        let mut lookup = Self::default();
        let shape = value.shape();
        match shape.kind {
            Kind::Map => {
                for (key, item) in value.entries().unwrap_or_default() {
                    lookup.values.insert(key.to_lowercase(), item);
                }
            }
            Kind::Record(_) => lookup.add_record_fields(value)?,
            _ => return Err(SqlError::UnsupportedArgument(shape.name)),
        }
        Ok(lookup)
    }

    fn add_record_fields(&mut self, record: &'a dyn Reflect) -> Result<(), SqlError> {
        let shape = record.shape();
        let Some(fields) = shape.fields() else {
            return Ok(());
        };

        for (position, field) in fields.iter().enumerate() {
            if !field.exported && !field.embedded {
                continue;
            }
            let tag = Tag::parse(field.tag);
            if tag.omit {
                continue;
            }
            let Some(value) = record.field(position) else {
                continue;
            };

            if field.embedded && field.shape().is_record() {
                // a nil pointer anywhere on the chain hides the whole subtree
                if let Some(inner) = follow_pointers(value) {
                    self.add_record_fields(inner)?;
                }
                continue;
            }
            if !field.exported {
                continue;
            }

            let key = tag.name_or(field.name).to_lowercase();
            if self.values.contains_key(&key) {
                return Err(SqlError::DuplicateKey(key));
            }
            self.values.insert(key, value);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&'a dyn Reflect> {
        self.values.get(&name.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

fn follow_pointers(value: &dyn Reflect) -> Option<&dyn Reflect> {
    let mut current = value;
    while current.shape().is_pointer() {
        current = current.pointee()?;
    }
    Some(current)
}
