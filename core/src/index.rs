use crate::corpus::Document;
use crate::error::EngineError;
use crate::tokenizer::{tokenize, StopWordLanguage};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexOptions {
    pub language: StopWordLanguage,
    /// Use `1 + ln(count)` instead of the raw count as term frequency.
    pub sublinear_tf: bool,
}

/// Term to column mapping. Columns follow lexicographic term order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>, // sorted, unique; position is the column
}

impl Vocabulary {
    fn from_sorted(terms: Vec<String>) -> Self { Self { terms } }

    pub fn column(&self, term: &str) -> Option<TermId> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok().map(|i| i as TermId)
    }

    pub fn term(&self, column: TermId) -> Option<&str> {
        self.terms.get(column as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize { self.terms.len() }
    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TermId)> {
        self.terms.iter().enumerate().map(|(i, t)| (t.as_str(), i as TermId))
    }
}

/// L2-normalized sparse row; entries sorted by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
    pub entries: Vec<(TermId, f32)>,
}

impl SparseRow {
    /// Dot product against another column-sorted row.
    pub fn dot(&self, other: &SparseRow) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_col, a_w) = self.entries[i];
            let (b_col, b_w) = other.entries[j];
            if a_col == b_col {
                sum += a_w * b_w;
                i += 1;
                j += 1;
            } else if a_col < b_col {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }

    pub fn is_zero(&self) -> bool { self.entries.is_empty() }
}

/// Document-term weights, one row per document in corpus order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfIdfMatrix {
    rows: Vec<SparseRow>,
    num_cols: usize,
}

impl TfIdfMatrix {
    pub fn row(&self, doc_id: DocId) -> Option<&SparseRow> { self.rows.get(doc_id as usize) }
    pub fn rows(&self) -> &[SparseRow] { &self.rows }
    pub fn num_rows(&self) -> usize { self.rows.len() }
    pub fn num_cols(&self) -> usize { self.num_cols }
}

#[derive(Debug)]
pub struct TfIdfIndex {
    options: IndexOptions,
    vocabulary: Vocabulary,
    df: Vec<u32>,
    idf: Vec<f32>,
    matrix: TfIdfMatrix,
}

impl TfIdfIndex {
    pub fn options(&self) -> IndexOptions { self.options }
    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }
    pub fn matrix(&self) -> &TfIdfMatrix { &self.matrix }
    pub fn idf(&self) -> &[f32] { &self.idf }
    pub fn df(&self) -> &[u32] { &self.df }
    pub fn num_docs(&self) -> usize { self.matrix.num_rows() }

    /// Terms ordered by document frequency, most common first.
    pub fn top_terms(&self, n: usize) -> Vec<(&str, u32)> {
        let mut terms: Vec<(&str, u32)> = self
            .vocabulary
            .iter()
            .map(|(term, col)| (term, self.df[col as usize]))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(n);
        terms
    }

    /// Weighted, normalized vector for arbitrary text using this index's
    /// vocabulary and IDF. Unknown terms are dropped.
    pub fn project(&self, text: &str) -> SparseRow {
        let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
        for token in tokenize(text, self.options.language) {
            if let Some(col) = self.vocabulary.column(&token) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }
        weighted_row(counts, &self.idf, self.options.sublinear_tf)
    }
}

/// Build the vocabulary, IDF weights and TF-IDF matrix for `docs`.
///
/// `idf(t) = ln((1 + N) / (1 + df(t))) + 1`, rows L2-normalized. The result
/// depends only on the documents and options, so rebuilding from the same
/// input is bit-for-bit reproducible.
pub fn build(docs: &[Document], options: IndexOptions) -> Result<TfIdfIndex, EngineError> {
    if docs.is_empty() {
        return Err(EngineError::EmptyCorpus);
    }
    let started = Instant::now();

    let tokenized: Vec<Vec<String>> = docs
        .iter()
        .map(|d| tokenize(&d.indexing_text(), options.language))
        .collect();

    let terms: BTreeSet<&str> = tokenized.iter().flatten().map(String::as_str).collect();
    let vocabulary = Vocabulary::from_sorted(terms.into_iter().map(str::to_string).collect());

    let mut df = vec![0u32; vocabulary.len()];
    let mut counts_per_doc: Vec<BTreeMap<TermId, u32>> = Vec::with_capacity(docs.len());
    for tokens in &tokenized {
        let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
        for token in tokens {
            if let Some(col) = vocabulary.column(token) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }
        for col in counts.keys() {
            df[*col as usize] += 1;
        }
        counts_per_doc.push(counts);
    }

    let n = docs.len() as f32;
    let idf: Vec<f32> = df
        .iter()
        .map(|&d| ((1.0 + n) / (1.0 + d as f32)).ln() + 1.0)
        .collect();

    let rows = counts_per_doc
        .into_iter()
        .map(|counts| weighted_row(counts, &idf, options.sublinear_tf))
        .collect();
    let matrix = TfIdfMatrix { rows, num_cols: vocabulary.len() };

    tracing::info!(
        num_docs = docs.len(),
        num_terms = vocabulary.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "built tf-idf index"
    );
    Ok(TfIdfIndex { options, vocabulary, df, idf, matrix })
}

fn tf_weight(count: u32, sublinear: bool) -> f32 {
    if sublinear {
        1.0 + (count as f32).ln()
    } else {
        count as f32
    }
}

fn weighted_row(counts: BTreeMap<TermId, u32>, idf: &[f32], sublinear: bool) -> SparseRow {
    let mut entries: Vec<(TermId, f32)> = counts
        .into_iter()
        .map(|(col, count)| (col, tf_weight(count, sublinear) * idf[col as usize]))
        .collect();
    let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm == 0.0 {
        return SparseRow::default();
    }
    for (_, w) in entries.iter_mut() {
        *w /= norm;
    }
    SparseRow { entries }
}
