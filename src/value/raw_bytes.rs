use crate::value::SqlValue;

/// Opaque column bytes, accepted from any non-null value without
/// interpretation. Columns that map to no destination field are sunk into
/// one of these.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawBytes(pub Vec<u8>);

impl RawBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Replaces the contents with the byte form of `value`; NULL empties it.
    pub fn absorb(&mut self, value: &SqlValue) {
        self.0.clear();
        if let Some(bytes) = value.to_bytes() {
            self.0.extend_from_slice(&bytes);
        }
    }
}
