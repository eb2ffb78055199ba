use crate::error::CorpusLoadError;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One news article as it appears in the corpus file.
///
/// Accepts both the English field names and the ones written by the original
/// Portuguese crawler. Unknown fields (such as a stored `index`) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "texto")]
    pub body: String,
    pub url: String,
    #[serde(alias = "publicado")]
    pub published_at: String,
    #[serde(default, alias = "modificado")]
    pub modified_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub body: String,
    pub url: String,
    pub published_at: String,
    pub modified_at: Option<String>,
}

impl Document {
    /// Text fed to the vectorizer: title and body, unweighted.
    pub fn indexing_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// Ordered, immutable document collection. Ids are positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    docs: Vec<Document>,
}

impl Corpus {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CorpusRecord>,
    {
        let docs = records
            .into_iter()
            .enumerate()
            .map(|(pos, r)| Document {
                id: pos as DocId,
                title: r.title,
                body: r.body,
                url: r.url,
                published_at: r.published_at,
                modified_at: r.modified_at,
            })
            .collect();
        Self { docs }
    }

    pub fn len(&self) -> usize { self.docs.len() }
    pub fn is_empty(&self) -> bool { self.docs.is_empty() }
    pub fn get(&self, id: DocId) -> Option<&Document> { self.docs.get(id as usize) }
    pub fn documents(&self) -> &[Document] { &self.docs }
}

/// Something the engine can pull a whole corpus from.
///
/// Loading is all-or-nothing: any bad record fails the load.
pub trait CorpusSource: Send + Sync {
    fn load(&self) -> Result<Corpus, CorpusLoadError>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Corpus stored as a JSON array (`.json`) or JSON lines (`.jsonl`).
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    fn is_jsonl(&self) -> bool {
        self.path.extension().and_then(|s| s.to_str()) == Some("jsonl")
    }
}

impl CorpusSource for JsonFileSource {
    fn load(&self) -> Result<Corpus, CorpusLoadError> {
        let text = fs::read_to_string(&self.path)
            .map_err(|source| CorpusLoadError::Io { path: self.path.clone(), source })?;
        let records = if self.is_jsonl() {
            parse_jsonl(&text)?
        } else {
            let json: serde_json::Value = serde_json::from_str(&text)
                .map_err(|source| CorpusLoadError::Parse { path: self.path.clone(), source })?;
            parse_json(json)?
        };
        Ok(Corpus::from_records(records))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn parse_json(json: serde_json::Value) -> Result<Vec<CorpusRecord>, CorpusLoadError> {
    match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .enumerate()
            .map(|(position, v)| {
                serde_json::from_value(v).map_err(|source| CorpusLoadError::InvalidRecord { position, source })
            })
            .collect(),
        serde_json::Value::Object(_) => {
            let record = serde_json::from_value(json)
                .map_err(|source| CorpusLoadError::InvalidRecord { position: 0, source })?;
            Ok(vec![record])
        }
        _ => Err(CorpusLoadError::UnsupportedFormat(
            "expected a JSON array of records or a single record object".into(),
        )),
    }
}

fn parse_jsonl(text: &str) -> Result<Vec<CorpusRecord>, CorpusLoadError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(position, line)| {
            serde_json::from_str(line).map_err(|source| CorpusLoadError::InvalidRecord { position, source })
        })
        .collect()
}

/// Records held in memory, handed out as a fresh corpus on every load.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<CorpusRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<CorpusRecord>) -> Self { Self { records } }
}

impl CorpusSource for InMemorySource {
    fn load(&self) -> Result<Corpus, CorpusLoadError> {
        Ok(Corpus::from_records(self.records.clone()))
    }

    fn describe(&self) -> String {
        format!("in-memory ({} records)", self.records.len())
    }
}
