use std::path::PathBuf;

/// Failures of the retrieval engine that callers have to act on.
///
/// Empty queries, out-of-vocabulary queries and zero matches are not errors;
/// they produce empty result sets.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("cannot build an index over an empty corpus")]
    EmptyCorpus,
    #[error(transparent)]
    CorpusLoad(#[from] CorpusLoadError),
    #[error("index has not been built yet")]
    IndexNotReady,
}

#[derive(thiserror::Error, Debug)]
pub enum CorpusLoadError {
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed corpus {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid corpus record #{position}: {source}")]
    InvalidRecord {
        position: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported corpus format: {0}")]
    UnsupportedFormat(String),
}

#[derive(thiserror::Error, Debug)]
pub enum SummaryError {
    #[error("summarizer unavailable: {0}")]
    Unavailable(String),
    #[error("summarizer request failed: {0}")]
    Request(String),
    #[error("malformed summarizer response: {0}")]
    MalformedResponse(String),
}
