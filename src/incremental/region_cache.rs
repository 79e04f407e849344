//! Region cache
//!
//! Bounded-parse results keyed by document and line range. A hit needs the
//! same range and byte-identical text for that range; anything else is a
//! miss. Entries live until overwritten or until their document is cleared.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::base::{ContentFingerprint, DocumentId, LineRange};
use crate::parser::Fragment;

#[derive(Debug, Clone)]
struct RegionEntry {
    fingerprint: ContentFingerprint,
    text: Box<str>,
    fragment: Arc<Fragment>,
}

impl RegionEntry {
    fn matches(&self, fingerprint: ContentFingerprint, text: &str) -> bool {
        self.fingerprint == fingerprint && &*self.text == text
    }
}

/// Cache of [`Fragment`]s per document and line range
#[derive(Debug, Clone, Default)]
pub struct RegionCache {
    documents: FxHashMap<DocumentId, FxHashMap<LineRange, RegionEntry>>,
}

impl RegionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fragment stored for `range` if `content` is what was parsed.
    pub fn get_cached_ast_range(
        &self,
        document: &DocumentId,
        range: LineRange,
        content: &str,
    ) -> Option<Arc<Fragment>> {
        let entry = self.documents.get(document)?.get(&range)?;
        if entry.matches(ContentFingerprint::of(content), content) {
            trace!(%document, %range, "region cache hit");
            Some(Arc::clone(&entry.fragment))
        } else {
            trace!(%document, %range, "region cache stale");
            None
        }
    }

    /// Store `fragment` as the parse of `content` over `range`, replacing any
    /// previous entry for that range.
    pub fn set_cached_ast_range(
        &mut self,
        document: &DocumentId,
        range: LineRange,
        content: &str,
        fragment: Arc<Fragment>,
    ) {
        let entry = RegionEntry {
            fingerprint: ContentFingerprint::of(content),
            text: content.into(),
            fragment,
        };
        self.documents
            .entry(document.clone())
            .or_default()
            .insert(range, entry);
    }

    /// Drop every entry for `document`; returns whether anything was held.
    pub fn clear_ast_region_cache_for_document(&mut self, document: &DocumentId) -> bool {
        self.documents.remove(document).is_some()
    }

    /// Number of entries held for `document`
    pub fn entry_count(&self, document: &DocumentId) -> usize {
        self.documents.get(document).map_or(0, FxHashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.values().all(FxHashMap::is_empty)
    }
}
