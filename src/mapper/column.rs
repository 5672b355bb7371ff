/// Strips one matching pair of `"…"`, `` `…` `` or `[…]` and lowercases
/// ASCII letters. Field index keys and column signatures both go through
/// here, so lookups are quote- and case-insensitive.
pub fn normalize_column(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut inner = name;
    if bytes.len() >= 2 {
        let last = bytes[bytes.len() - 1];
        let closes = match bytes[0] {
            b'"' => last == b'"',
            b'`' => last == b'`',
            b'[' => last == b']',
            _ => false,
        };
        if closes {
            inner = &name[1..name.len() - 1];
        }
    }
    inner.to_ascii_lowercase()
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// The normalized, ordered column names of a result set plus their hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSignature {
    pub names: Vec<String>,
    pub hash: u64,
}

impl ColumnSignature {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        let names: Vec<String> = columns.iter().map(|c| normalize_column(c.as_ref())).collect();

        // FNV-1a over each name followed by a NUL separator.
        let mut hash = FNV_OFFSET;
        for name in &names {
            for byte in name.bytes().chain(std::iter::once(0)) {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        }

        Self { names, hash }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_quote_styles() {
        for label in ["\"X\"", "`X`", "[X]", "X"] {
            assert_eq!(normalize_column(label), "x", "label {label}");
        }
    }

    #[test]
    fn test_normalize_requires_matching_pair() {
        assert_eq!(normalize_column("\"X`"), "\"x`");
        assert_eq!(normalize_column("[X"), "[x");
        assert_eq!(normalize_column("\""), "\"");
        assert_eq!(normalize_column("\"\""), "");
    }

    #[test]
    fn test_normalize_strips_one_layer_only() {
        assert_eq!(normalize_column("\"\"Id\"\""), "\"id\"");
    }

    #[test]
    fn test_normalize_lowercases_ascii_only() {
        assert_eq!(normalize_column("ÉTAT_Id"), "État_id");
    }

    #[test]
    fn test_signature_is_quote_and_case_insensitive() {
        let a = ColumnSignature::new(&["ID", "\"Email\""]);
        let b = ColumnSignature::new(&["id", "email"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_separates_names() {
        let a = ColumnSignature::new(&["ab", "c"]);
        let b = ColumnSignature::new(&["a", "bc"]);
        assert_ne!(a.hash, b.hash);
        assert_eq!(a.len(), 2);
    }
}
