//! Per-document sharding for hosts that parse documents in parallel.
//!
//! Each open document gets its own [`AnalysisHost`] behind a mutex; the
//! registry itself sits behind a read-mostly lock. Work on different
//! documents never contends on the same lock.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::analysis::{AnalysisHost, IncrementalParse};
use crate::base::{ContentChange, DocumentId, TextDocument};
use crate::incremental::{IncrementalError, IncrementalOptions};
use crate::syntax::SyntaxTree;

type Shard = Arc<Mutex<AnalysisHost>>;

/// Registry of per-document [`AnalysisHost`] shards
#[derive(Debug, Default)]
pub struct SharedAnalysisHost {
    options: IncrementalOptions,
    shards: RwLock<FxHashMap<DocumentId, Shard>>,
}

impl SharedAnalysisHost {
    pub fn new() -> Self {
        Self::with_options(IncrementalOptions::default())
    }

    pub fn with_options(options: IncrementalOptions) -> Self {
        Self {
            options,
            shards: RwLock::new(FxHashMap::default()),
        }
    }

    /// The shard for `document`, created on first use
    fn shard(&self, document: &DocumentId) -> Shard {
        if let Some(shard) = self.shards.read().get(document) {
            return Arc::clone(shard);
        }
        let mut shards = self.shards.write();
        let shard = shards.entry(document.clone()).or_insert_with(|| {
            debug!(%document, "opening document shard");
            Arc::new(Mutex::new(AnalysisHost::with_options(self.options.clone())))
        });
        Arc::clone(shard)
    }

    /// Run `f` against the host of `document` while holding only its lock.
    pub fn with_document<R>(&self, document: &DocumentId, f: impl FnOnce(&mut AnalysisHost) -> R) -> R {
        let shard = self.shard(document);
        let mut host = shard.lock();
        f(&mut host)
    }

    pub fn parse_with_cache(&self, document: &TextDocument) -> Arc<SyntaxTree> {
        self.with_document(document.id(), |host| host.parse_with_cache(document))
    }

    pub fn did_change(
        &self,
        document: &mut TextDocument,
        version: i32,
        changes: &[ContentChange],
    ) -> Result<(), IncrementalError> {
        let shard = self.shard(document.id());
        let mut host = shard.lock();
        host.did_change(document, version, changes)
    }

    pub fn reparse(&self, document: &TextDocument) -> Result<IncrementalParse, IncrementalError> {
        self.with_document(document.id(), |host| host.reparse(document))
    }

    /// Drop the shard of a closed document.
    pub fn close(&self, document: &DocumentId) -> Result<(), IncrementalError> {
        let shard = self
            .shards
            .write()
            .remove(document)
            .ok_or_else(|| IncrementalError::UnknownDocument(document.clone()))?;
        shard.lock().clear_document_cache(document);
        Ok(())
    }

    pub fn document_count(&self) -> usize {
        self.shards.read().len()
    }
}
