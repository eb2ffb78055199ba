use crate::assemble::{assemble, RankedResult};
use crate::corpus::{Corpus, CorpusSource};
use crate::error::EngineError;
use crate::index::{build, IndexOptions, TfIdfIndex};
use crate::rank::score;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A corpus together with the index built from it. Never mutated.
#[derive(Debug)]
pub struct IndexSnapshot {
    corpus: Corpus,
    index: TfIdfIndex,
}

impl IndexSnapshot {
    pub fn build(corpus: Corpus, options: IndexOptions) -> Result<Self, EngineError> {
        let index = build(corpus.documents(), options)?;
        Ok(Self { corpus, index })
    }

    pub fn corpus(&self) -> &Corpus { &self.corpus }
    pub fn index(&self) -> &TfIdfIndex { &self.index }

    pub fn search(&self, query: &str, k: usize) -> Vec<RankedResult> {
        let scores = score(query, &self.index);
        let results = assemble(&scores, k, &self.corpus);
        tracing::debug!(query, k, hits = results.len(), "search");
        results
    }
}

#[derive(Debug, Clone)]
pub enum IndexState {
    Uninitialized,
    Building,
    Ready(Arc<IndexSnapshot>),
}

/// Owns the index lifecycle.
///
/// At most one build runs at a time; callers that arrive while a build is in
/// flight wait for it and reuse its result. Readers only ever see a complete
/// snapshot, and keep seeing the previous one while a reload is running.
pub struct SearchEngine {
    source: Box<dyn CorpusSource>,
    options: IndexOptions,
    state: RwLock<IndexState>,
    build_guard: Mutex<()>,
}

impl SearchEngine {
    pub fn new<S: CorpusSource + 'static>(source: S, options: IndexOptions) -> Self {
        Self {
            source: Box::new(source),
            options,
            state: RwLock::new(IndexState::Uninitialized),
            build_guard: Mutex::new(()),
        }
    }

    pub fn options(&self) -> IndexOptions { self.options }

    pub fn state(&self) -> IndexState { self.state.read().clone() }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), IndexState::Ready(_))
    }

    /// Build the index unless one is already cached.
    pub fn ensure_index_built(&self) -> Result<(), EngineError> {
        if self.is_ready() {
            return Ok(());
        }
        let _guard = self.build_guard.lock();
        if self.is_ready() {
            return Ok(());
        }
        self.rebuild_locked().map(|_| ())
    }

    /// Reload the corpus and rebuild unconditionally. On failure the previous
    /// snapshot, if any, stays in place.
    pub fn reload(&self) -> Result<Arc<IndexSnapshot>, EngineError> {
        let _guard = self.build_guard.lock();
        self.rebuild_locked()
    }

    pub fn snapshot(&self) -> Result<Arc<IndexSnapshot>, EngineError> {
        match &*self.state.read() {
            IndexState::Ready(snapshot) => Ok(Arc::clone(snapshot)),
            _ => Err(EngineError::IndexNotReady),
        }
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<RankedResult>, EngineError> {
        Ok(self.snapshot()?.search(query, k))
    }

    pub fn ensure_and_search(&self, query: &str, k: usize) -> Result<Vec<RankedResult>, EngineError> {
        self.ensure_index_built()?;
        self.search(query, k)
    }

    // caller holds build_guard
    fn rebuild_locked(&self) -> Result<Arc<IndexSnapshot>, EngineError> {
        let previous = {
            let mut state = self.state.write();
            match &*state {
                IndexState::Ready(snapshot) => Some(Arc::clone(snapshot)),
                _ => {
                    *state = IndexState::Building;
                    None
                }
            }
        };

        tracing::info!(source = %self.source.describe(), "loading corpus");
        let built = self
            .source
            .load()
            .map_err(EngineError::from)
            .and_then(|corpus| IndexSnapshot::build(corpus, self.options));

        match built {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.state.write() = IndexState::Ready(Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(err) => {
                tracing::warn!(error = %err, "index build failed");
                *self.state.write() = match previous {
                    Some(snapshot) => IndexState::Ready(snapshot),
                    None => IndexState::Uninitialized,
                };
                Err(err)
            }
        }
    }
}
