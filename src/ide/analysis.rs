//! AnalysisHost: the parse session for open documents.
//!
//! The host owns every cache the incremental path needs: the last full tree
//! per document, the region cache and the dirty-range tracker. Consumers get
//! trees as `Arc<SyntaxTree>` snapshots and never mutate them.
//!
//! A cached document keeps the line scan its tree was built from. An
//! incremental pass re-parses whole units (see [`LineScan::is_unit_start`])
//! and only stops at a line that starts a unit in both the old and the new
//! scan, so everything outside the region is exactly what a full parse
//! would produce.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! let mut doc = TextDocument::thrift("file:///a.thrift", text);
//! let tree = host.parse_with_cache(&doc);
//!
//! host.did_change(&mut doc, 2, &[change])?;
//! let result = host.reparse(&doc)?;
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::base::{
    ContentChange, ContentFingerprint, DocumentId, LineRange, Span, TextDocument, TextSize,
};
use crate::incremental::{
    ChangeChannel, ChangeEvent, DirtyRangeTracker, IncrementalError, IncrementalOptions,
    RegionCache, merge_diagnostics, merge_incremental_results,
};
use crate::parser::{
    Fragment, LineScan, SyntaxError, affected_region, parse_range_scanned, parse_scanned,
    scan_lines,
};
use crate::syntax::{NodeId, NodeSnapshot, SyntaxTree};

/// Last authoritative parse of a document
#[derive(Debug, Clone)]
struct CachedDocument {
    fingerprint: ContentFingerprint,
    line_count: usize,
    scan: LineScan,
    tree: Arc<SyntaxTree>,
    errors: Vec<SyntaxError>,
}

/// Result of [`AnalysisHost::parse_with_cache_cancellable`]
#[derive(Debug, Clone)]
pub struct DocumentParse {
    pub tree: Arc<SyntaxTree>,
    pub errors: Vec<SyntaxError>,
    /// Provisional result of a cancelled parse; it was not cached
    pub cancelled: bool,
}

/// Result of [`AnalysisHost::incremental_parse_with_cache`]
#[derive(Debug, Clone)]
pub struct IncrementalParse {
    /// The updated full tree
    pub ast: Arc<SyntaxTree>,
    /// Top-level nodes created by this pass, in document order
    pub new_nodes: Vec<NodeId>,
    /// Top-level nodes this pass replaced, as they were before the edit
    pub affected_nodes: Vec<NodeSnapshot>,
    /// Lines re-parsed, in current coordinates; `None` when nothing was
    /// re-parsed or the whole document was
    pub region: Option<LineRange>,
    /// The whole document was parsed
    pub full_reparse: bool,
    /// The bounded parse was served from the region cache
    pub region_cache_hit: bool,
}

impl IncrementalParse {
    fn full(ast: Arc<SyntaxTree>) -> Self {
        let new_nodes = ast.body().to_vec();
        Self {
            ast,
            new_nodes,
            affected_nodes: Vec::new(),
            region: None,
            full_reparse: true,
            region_cache_hit: false,
        }
    }

    fn unchanged(ast: Arc<SyntaxTree>) -> Self {
        Self {
            ast,
            new_nodes: Vec::new(),
            affected_nodes: Vec::new(),
            region: None,
            full_reparse: false,
            region_cache_hit: false,
        }
    }
}

/// Owns all parse state for a set of open documents.
#[derive(Debug, Default)]
pub struct AnalysisHost {
    options: IncrementalOptions,
    tracker: DirtyRangeTracker,
    regions: RegionCache,
    documents: FxHashMap<DocumentId, CachedDocument>,
}

impl AnalysisHost {
    /// Create a host with default options.
    pub fn new() -> Self {
        Self::with_options(IncrementalOptions::default())
    }

    pub fn with_options(options: IncrementalOptions) -> Self {
        Self {
            tracker: DirtyRangeTracker::new(options.language_ids.iter()),
            regions: RegionCache::new(),
            documents: FxHashMap::default(),
            options,
        }
    }

    pub fn options(&self) -> &IncrementalOptions {
        &self.options
    }

    /// Whether a full tree is cached for `document`
    pub fn is_cached(&self, document: &DocumentId) -> bool {
        self.documents.contains_key(document)
    }

    /// The cached tree, if any, regardless of freshness
    pub fn cached_tree(&self, document: &DocumentId) -> Option<Arc<SyntaxTree>> {
        self.documents.get(document).map(|cached| Arc::clone(&cached.tree))
    }

    /// Syntax diagnostics of the cached tree
    pub fn diagnostics(&self, document: &DocumentId) -> &[SyntaxError] {
        self.documents
            .get(document)
            .map_or(&[], |cached| cached.errors.as_slice())
    }

    // =========================================================================
    // Change tracking
    // =========================================================================

    /// Apply editor changes to `document` and mark them dirty for parsing.
    ///
    /// A batch with an invalid change is rejected whole: nothing is applied
    /// and nothing is marked.
    pub fn did_change(
        &mut self,
        document: &mut TextDocument,
        version: i32,
        changes: &[ContentChange],
    ) -> Result<(), IncrementalError> {
        let applied = document.apply_changes(version, changes)?;
        let event = ChangeEvent::for_document(document, applied);
        self.tracker.mark_changes(&event, ChangeChannel::Parsing);
        Ok(())
    }

    /// Record changes on any channel without touching a buffer
    pub fn mark_changes(&mut self, event: &ChangeEvent, channel: ChangeChannel) -> bool {
        self.tracker.mark_changes(event, channel)
    }

    /// Take the pending parsing range for `document`
    pub fn consume_dirty_range(&mut self, document: &DocumentId) -> Option<LineRange> {
        self.tracker.consume_dirty_range(document)
    }

    pub fn tracker(&self) -> &DirtyRangeTracker {
        &self.tracker
    }

    // =========================================================================
    // Full parses
    // =========================================================================

    /// Full parse of `document`, cached by identity and content.
    pub fn parse_with_cache(&mut self, document: &TextDocument) -> Arc<SyntaxTree> {
        let fingerprint = document.fingerprint();
        if let Some(cached) = self.documents.get(document.id()) {
            if cached.fingerprint == fingerprint {
                debug!(document = %document.id(), "document cache hit");
                return Arc::clone(&cached.tree);
            }
        }
        debug!(document = %document.id(), "document cache miss");
        self.full_parse(document)
    }

    /// Like [`parse_with_cache`](Self::parse_with_cache) but checks `cancel`
    /// between top-level declarations. A cancelled parse is returned as a
    /// provisional result and the previous cache entry is left alone.
    pub fn parse_with_cache_cancellable(
        &mut self,
        document: &TextDocument,
        cancel: &CancellationToken,
    ) -> DocumentParse {
        let fingerprint = document.fingerprint();
        if let Some(cached) = self.documents.get(document.id()) {
            if cached.fingerprint == fingerprint {
                return DocumentParse {
                    tree: Arc::clone(&cached.tree),
                    errors: cached.errors.clone(),
                    cancelled: false,
                };
            }
        }
        let scan = scan_lines(document.text(), document.line_index());
        let parse = parse_scanned(document.text(), document.line_index(), &scan, Some(cancel));
        let tree = Arc::new(parse.tree);
        if parse.cancelled {
            debug!(document = %document.id(), "parse cancelled, result not cached");
        } else {
            self.store(document, scan, Arc::clone(&tree), parse.errors.clone());
        }
        DocumentParse {
            tree,
            errors: parse.errors,
            cancelled: parse.cancelled,
        }
    }

    fn full_parse(&mut self, document: &TextDocument) -> Arc<SyntaxTree> {
        let scan = scan_lines(document.text(), document.line_index());
        let parse = parse_scanned(document.text(), document.line_index(), &scan, None);
        let tree = Arc::new(parse.tree);
        self.store(document, scan, Arc::clone(&tree), parse.errors);
        tree
    }

    fn store(
        &mut self,
        document: &TextDocument,
        scan: LineScan,
        tree: Arc<SyntaxTree>,
        errors: Vec<SyntaxError>,
    ) {
        self.documents.insert(
            document.id().clone(),
            CachedDocument {
                fingerprint: document.fingerprint(),
                line_count: document.line_count(),
                scan,
                tree,
                errors,
            },
        );
    }

    // =========================================================================
    // Incremental parses
    // =========================================================================

    /// Consume the pending dirty range of `document` and bring its tree up to
    /// date.
    pub fn reparse(&mut self, document: &TextDocument) -> Result<IncrementalParse, IncrementalError> {
        let dirty = self.tracker.consume_dirty_range(document.id());
        self.incremental_parse_with_cache(document, dirty)
    }

    /// Re-parse only the declarations around `dirty` (current coordinates)
    /// and splice them into the cached tree.
    ///
    /// Without a cached tree or a dirty range this is a full parse. All edits
    /// since the cached parse must lie inside `dirty`.
    pub fn incremental_parse_with_cache(
        &mut self,
        document: &TextDocument,
        dirty: Option<LineRange>,
    ) -> Result<IncrementalParse, IncrementalError> {
        if !self.options.accepts(document.language_id()) {
            return Err(IncrementalError::UnsupportedLanguage {
                document: document.id().clone(),
                language_id: document.language_id().to_string(),
            });
        }
        let fingerprint = document.fingerprint();
        let Some(cached) = self.documents.get(document.id()) else {
            return Ok(IncrementalParse::full(self.full_parse(document)));
        };
        if cached.fingerprint == fingerprint {
            return Ok(IncrementalParse::unchanged(Arc::clone(&cached.tree)));
        }
        let Some(dirty) = dirty else {
            debug!(document = %document.id(), "no dirty range, parsing whole document");
            return Ok(IncrementalParse::full(self.full_parse(document)));
        };

        let line_delta = document.line_count() as isize - cached.line_count as isize;
        let scan = scan_lines(document.text(), document.line_index());
        let Some((region, affected)) = self.settle_region(&scan, &cached.scan, dirty, line_delta)
        else {
            warn!(
                document = %document.id(),
                %dirty,
                "region kept growing, falling back to a full parse"
            );
            return Ok(IncrementalParse::full(self.full_parse(document)));
        };

        let (fragment, region_cache_hit) = self.fragment_for(document, &scan, region);
        let Some(cached) = self.documents.get_mut(document.id()) else {
            return Err(IncrementalError::UnknownDocument(document.id().clone()));
        };
        let tree = Arc::make_mut(&mut cached.tree);
        let report = merge_incremental_results(tree, affected, &fragment, line_delta);
        let text = document.text();
        let index = document.line_index();
        tree.set_document_range(Span::new(
            index.position(text, TextSize::from(0)),
            index.position(text, TextSize::of(text)),
        ));
        merge_diagnostics(&mut cached.errors, affected, &fragment.errors, line_delta);
        cached.fingerprint = fingerprint;
        cached.line_count = document.line_count();
        cached.scan = scan;

        debug!(
            document = %document.id(),
            %region,
            removed = report.removed.len(),
            inserted = report.inserted.len(),
            shifted = report.shifted,
            region_cache_hit,
            "incremental merge"
        );
        Ok(IncrementalParse {
            ast: Arc::clone(&cached.tree),
            new_nodes: report.inserted,
            affected_nodes: report.removed,
            region: Some(region),
            full_reparse: false,
            region_cache_hit,
        })
    }

    /// Grow the region around `dirty` until both of its edges are unit
    /// starts in the new scan and in the cached scan. Each unit pulled in
    /// past the end counts against `max_region_expansions`.
    ///
    /// Returns the region in current coordinates and the span it replaces in
    /// the cached tree's coordinates.
    fn settle_region(
        &self,
        scan: &LineScan,
        old: &LineScan,
        dirty: LineRange,
        line_delta: isize,
    ) -> Option<(LineRange, Span)> {
        let mut region = affected_region(scan, dirty, self.options.region_window);
        // Lines above the dirty range scan the same in both versions
        if !old.is_unit_start(region.start) {
            let start = (0..region.start)
                .rev()
                .find(|&line| scan.is_unit_start(line))
                .unwrap_or(0);
            debug!(from = region.start, to = start, "region start moved to a shared unit start");
            region = LineRange::new(start, region.end);
        }

        let mut expansions = 0;
        loop {
            let next = region.end + 1;
            let aligned = scan.is_unit_start(next)
                && usize::try_from(next as isize - line_delta)
                    .is_ok_and(|old_next| old.is_unit_start(old_next));
            if aligned {
                break;
            }
            if expansions == self.options.max_region_expansions {
                return None;
            }
            expansions += 1;
            let end = (next + 1..scan.line_count())
                .find(|&line| scan.is_unit_start(line))
                .unwrap_or(scan.line_count());
            debug!(expansions, from = %region, to = end - 1, "region end not shared, pulling in next unit");
            region = LineRange::new(region.start, end - 1);
        }

        let old_end = (region.end as isize - line_delta).max(region.start as isize) as usize;
        Some((region, LineRange::new(region.start, old_end).to_span()))
    }

    /// Bounded parse of `region`, from the region cache when possible.
    fn fragment_for(
        &mut self,
        document: &TextDocument,
        scan: &LineScan,
        region: LineRange,
    ) -> (Arc<Fragment>, bool) {
        let text = document.text();
        let index = document.line_index();
        let content = &text[index.byte_range(region)];
        if self.options.region_cache {
            if let Some(fragment) = self.regions.get_cached_ast_range(document.id(), region, content)
            {
                return (fragment, true);
            }
        }
        let fragment = Arc::new(parse_range_scanned(text, index, scan, region));
        if self.options.region_cache {
            self.regions
                .set_cached_ast_range(document.id(), region, content, Arc::clone(&fragment));
        }
        (fragment, false)
    }

    // =========================================================================
    // Region cache passthroughs
    // =========================================================================

    pub fn get_cached_ast_range(
        &self,
        document: &DocumentId,
        range: LineRange,
        content: &str,
    ) -> Option<Arc<Fragment>> {
        self.regions.get_cached_ast_range(document, range, content)
    }

    pub fn set_cached_ast_range(
        &mut self,
        document: &DocumentId,
        range: LineRange,
        content: &str,
        fragment: Arc<Fragment>,
    ) {
        self.regions.set_cached_ast_range(document, range, content, fragment);
    }

    pub fn clear_ast_region_cache_for_document(&mut self, document: &DocumentId) -> bool {
        self.regions.clear_ast_region_cache_for_document(document)
    }

    /// Drop every piece of state held for `document`.
    ///
    /// Returns whether anything was held.
    pub fn clear_document_cache(&mut self, document: &DocumentId) -> bool {
        let had_tree = self.documents.remove(document).is_some();
        let had_regions = self.regions.clear_ast_region_cache_for_document(document);
        let had_pending = self.tracker.is_tracked(document);
        self.tracker.forget(document);
        debug!(%document, "cleared document cache");
        had_tree || had_regions || had_pending
    }
}
