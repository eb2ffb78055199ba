use crate::index::{DocId, TfIdfIndex};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredResult {
    pub doc_id: DocId,
    pub score: f32,
}

/// Cosine similarity of `query` against every indexed document, in corpus order.
///
/// A query with no in-vocabulary terms scores 0 everywhere.
pub fn score(query: &str, index: &TfIdfIndex) -> Vec<ScoredResult> {
    let q = index.project(query);
    index
        .matrix()
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let score = if q.is_zero() { 0.0 } else { row.dot(&q).clamp(0.0, 1.0) };
            ScoredResult { doc_id: i as DocId, score }
        })
        .collect()
}
