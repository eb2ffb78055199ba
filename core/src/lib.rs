//! TF-IDF retrieval over a small news corpus.

pub mod assemble;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod rank;
pub mod summary;
pub mod tokenizer;

pub use assemble::{assemble, RankedResult, DEFAULT_K};
pub use corpus::{Corpus, CorpusRecord, CorpusSource, Document, InMemorySource, JsonFileSource};
pub use engine::{IndexSnapshot, IndexState, SearchEngine};
pub use error::{CorpusLoadError, EngineError, SummaryError};
pub use index::{build, DocId, IndexOptions, TermId, TfIdfIndex, TfIdfMatrix, Vocabulary};
pub use rank::{score, ScoredResult};
pub use summary::{summarize_or_fallback, Summarizer, TemplateSummarizer};
pub use tokenizer::{tokenize, StopWordLanguage};
