//! Content fingerprints for cache validation.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// A cheap identity for a piece of text: its length plus an `FxHasher` digest.
///
/// Caches compare fingerprints first and only then the stored text, so a
/// digest collision can never serve stale nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint {
    len: usize,
    hash: u64,
}

impl ContentFingerprint {
    pub fn of(text: &str) -> Self {
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        Self {
            len: text.len(),
            hash: hasher.finish(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
