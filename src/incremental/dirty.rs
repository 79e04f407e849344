//! Dirty-range tracking
//!
//! Accumulates the lines touched by editor changes, per document and per
//! consumer channel, until a consumer takes them. Channels never see each
//! other's events: a consumer marks every event it cares about on its own
//! channel, and that channel's pending spans follow the buffer (a later
//! change that adds or removes lines above a span moves it).

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::base::{ContentChange, DocumentId, LineRange, TextDocument};

/// Independent consumers of change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeChannel {
    Parsing,
    Diagnostics,
    SemanticTokens,
}

/// One editor notification: a batch of changes applied in order.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub document: DocumentId,
    pub language_id: SmolStr,
    pub changes: Vec<ContentChange>,
}

impl ChangeEvent {
    pub fn new(
        document: impl Into<DocumentId>,
        language_id: impl AsRef<str>,
        changes: Vec<ContentChange>,
    ) -> Self {
        Self {
            document: document.into(),
            language_id: SmolStr::new(language_id.as_ref()),
            changes,
        }
    }

    /// Event for changes made to `document`
    pub fn for_document(document: &TextDocument, changes: Vec<ContentChange>) -> Self {
        Self::new(document.id().clone(), document.language_id(), changes)
    }
}

/// Sorted, pairwise disjoint and non-adjacent spans
#[derive(Debug, Clone, Default)]
struct SpanSet {
    spans: Vec<LineRange>,
}

impl SpanSet {
    fn insert(&mut self, span: LineRange) {
        let mut merged = span;
        self.spans.retain(|existing| {
            if existing.overlaps_or_adjacent(&merged) {
                merged = merged.union(existing);
                false
            } else {
                true
            }
        });
        let at = self.spans.partition_point(|s| s.start < merged.start);
        self.spans.insert(at, merged);
    }

    /// Move every span through a change that replaced lines
    /// `first..=last_old` with `first..=last_new`.
    fn remap(&mut self, first: usize, last_old: usize, last_new: usize) {
        if self.spans.is_empty() {
            return;
        }
        let map = |line: usize| {
            if line > last_old {
                line - last_old + last_new
            } else if line >= first {
                line.min(last_new)
            } else {
                line
            }
        };
        let spans = std::mem::take(&mut self.spans);
        for span in spans {
            self.insert(LineRange::new(map(span.start), map(span.end)));
        }
    }

    fn bounds(&self) -> Option<LineRange> {
        let first = self.spans.first()?;
        let last = self.spans.last()?;
        Some(LineRange::new(first.start, last.end))
    }
}

/// Per-document, per-channel accumulator of edited line spans.
#[derive(Debug, Clone)]
pub struct DirtyRangeTracker {
    language_ids: Vec<SmolStr>,
    documents: FxHashMap<DocumentId, FxHashMap<ChangeChannel, SpanSet>>,
}

impl Default for DirtyRangeTracker {
    fn default() -> Self {
        Self::new([SmolStr::new_static("thrift")])
    }
}

impl DirtyRangeTracker {
    /// Tracker that only records documents of the given languages
    pub fn new<I, S>(language_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            language_ids: language_ids
                .into_iter()
                .map(|id| SmolStr::new(id.as_ref()))
                .collect(),
            documents: FxHashMap::default(),
        }
    }

    fn accepts(&self, language_id: &str) -> bool {
        self.language_ids.iter().any(|id| id == language_id)
    }

    /// Record the lines touched by `event` on `channel`. Other channels are
    /// left alone.
    ///
    /// Returns `false` when the document's language is not tracked; no state
    /// is created for it.
    pub fn mark_changes(&mut self, event: &ChangeEvent, channel: ChangeChannel) -> bool {
        if !self.accepts(&event.language_id) {
            trace!(document = %event.document, language = %event.language_id, "ignoring change");
            return false;
        }
        let channels = self.documents.entry(event.document.clone()).or_default();
        let set = channels.entry(channel).or_default();
        for change in &event.changes {
            let inserted = change.inserted_line_breaks();
            let Some(range) = change.range else {
                set.spans.clear();
                set.insert(LineRange::new(0, inserted));
                continue;
            };
            let first = range.start.line;
            let last_old = range.end.line.max(first);
            let last_new = first + inserted;
            set.remap(first, last_old, last_new);
            set.insert(LineRange::new(first, last_new));
        }
        debug!(
            document = %event.document,
            ?channel,
            pending = ?channels.get(&channel).and_then(SpanSet::bounds),
            "marked changes"
        );
        true
    }

    /// Pending spans on `channel`, without consuming them
    pub fn pending(&self, document: &DocumentId, channel: ChangeChannel) -> Vec<LineRange> {
        self.documents
            .get(document)
            .and_then(|channels| channels.get(&channel))
            .map(|set| set.spans.clone())
            .unwrap_or_default()
    }

    /// Take the bounding range of everything pending on `channel` and clear it.
    pub fn consume(&mut self, document: &DocumentId, channel: ChangeChannel) -> Option<LineRange> {
        let set = self.documents.get_mut(document)?.get_mut(&channel)?;
        let bounds = set.bounds();
        set.spans.clear();
        bounds
    }

    /// [`consume`](Self::consume) on the parsing channel
    pub fn consume_dirty_range(&mut self, document: &DocumentId) -> Option<LineRange> {
        self.consume(document, ChangeChannel::Parsing)
    }

    /// Whether any state exists for `document`
    pub fn is_tracked(&self, document: &DocumentId) -> bool {
        self.documents.contains_key(document)
    }

    /// Drop all pending spans for `document`
    pub fn forget(&mut self, document: &DocumentId) {
        self.documents.remove(document);
    }
}
