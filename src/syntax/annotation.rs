//! Trailing `(key = value, ...)` metadata blocks.

use smol_str::SmolStr;

/// One `key = value` assignment inside an annotation block.
///
/// Values keep their source spelling, quotes included; a bare key has an
/// empty value and `key{...}` keeps the braces as an opaque value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotationPair {
    pub key: SmolStr,
    pub value: String,
}

impl AnnotationPair {
    pub fn new(key: impl AsRef<str>, value: impl Into<String>) -> Self {
        Self {
            key: SmolStr::new(key.as_ref()),
            value: value.into(),
        }
    }

    /// The value with one layer of matching quotes removed
    pub fn unquoted_value(&self) -> &str {
        let v = self.value.as_str();
        let bytes = v.as_bytes();
        if bytes.len() >= 2
            && (bytes[0] == b'"' || bytes[0] == b'\'')
            && bytes[bytes.len() - 1] == bytes[0]
        {
            &v[1..v.len() - 1]
        } else {
            v
        }
    }
}

/// A parenthesized annotation block.
///
/// `start_index`/`end_index` are byte offsets into the originating line
/// (plus whatever offset the caller supplied), covering the parentheses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    pub raw_text: String,
    pub pairs: Vec<AnnotationPair>,
    pub start_index: usize,
    pub end_index: usize,
}

impl Annotation {
    /// Look up the first value recorded for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.key == key)
            .map(|pair| pair.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
