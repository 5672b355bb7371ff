use std::{any::TypeId, collections::HashMap};

use crate::{
    mapper::MapError,
    reflect::{FieldDesc, Shape, Tag},
};

/// Positions of the fields to step through, from the root record down to
/// the destination field. Pointer layers on the way are allocated when the
/// path is replayed for writing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<usize>);

impl FieldPath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The destination itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }
}

/// Lowercased field name to field path, for one destination record type.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    by_name: HashMap<String, FieldPath>,
}

impl FieldIndex {
    /// Indexes the record behind `shape`. Inline and anonymous embedded
    /// records are merged into the parent namespace; the first field to
    /// claim a name keeps it.
    pub fn build(shape: &Shape, max_depth: usize) -> Result<Self, MapError> {
        let root = shape.deref();
        let mut index = Self::default();
        if let Some(fields) = root.fields() {
            let mut walking = vec![root.id];
            index.walk(fields, &FieldPath::root(), &mut walking, max_depth)?;
        }
        Ok(index)
    }

    fn walk(
        &mut self,
        fields: &[FieldDesc],
        prefix: &FieldPath,
        walking: &mut Vec<TypeId>,
        max_depth: usize,
    ) -> Result<(), MapError> {
        for (position, field) in fields.iter().enumerate() {
            if !field.exported && !field.embedded {
                continue;
            }
            let tag = Tag::parse(field.tag);
            if tag.omit {
                continue;
            }

            let path = prefix.child(position);
            let base = field.shape().deref();
            let flatten = base.is_record() && (tag.inline || (field.embedded && tag.name.is_empty()));

            if flatten {
                if walking.contains(&base.id) || walking.len() > max_depth {
                    return Err(MapError::RecursiveType { type_name: base.name });
                }
                walking.push(base.id);
                self.walk(base.fields().unwrap_or_default(), &path, walking, max_depth)?;
                walking.pop();
                continue;
            }

            if !field.exported {
                continue;
            }
            let name = tag.name_or(field.name).to_ascii_lowercase();
            // shadowed names are ignored
            self.by_name.entry(name).or_insert(path);
        }
        Ok(())
    }

    /// Looks up an already normalized column name.
    pub fn get(&self, name: &str) -> Option<&FieldPath> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}
