//! Incremental parsing options

use smol_str::SmolStr;

use crate::parser::DEFAULT_REGION_WINDOW;

/// Tuning knobs for the incremental parse path
#[derive(Debug, Clone)]
pub struct IncrementalOptions {
    /// Lines searched above and below an edit for a declaration boundary
    pub region_window: usize,
    /// Units a region may pull in past its end while the old and new line
    /// scans disagree on where it stops, before the host parses the whole
    /// document instead
    pub max_region_expansions: usize,
    /// Document language ids handled by the tracker and host
    pub language_ids: Vec<SmolStr>,
    /// Serve bounded parses from the region cache
    pub region_cache: bool,
}

impl Default for IncrementalOptions {
    fn default() -> Self {
        Self {
            region_window: DEFAULT_REGION_WINDOW,
            max_region_expansions: 4,
            language_ids: vec![SmolStr::new_static("thrift")],
            region_cache: true,
        }
    }
}

impl IncrementalOptions {
    pub fn with_region_window(mut self, lines: usize) -> Self {
        self.region_window = lines;
        self
    }

    pub fn with_max_region_expansions(mut self, expansions: usize) -> Self {
        self.max_region_expansions = expansions;
        self
    }

    pub fn with_language_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.language_ids = ids.into_iter().map(|id| SmolStr::new(id.as_ref())).collect();
        self
    }

    pub fn with_region_cache(mut self, enabled: bool) -> Self {
        self.region_cache = enabled;
        self
    }

    /// Whether documents of `language_id` are tracked and parsed
    pub fn accepts(&self, language_id: &str) -> bool {
        self.language_ids.iter().any(|id| id == language_id)
    }
}
