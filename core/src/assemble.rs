use crate::corpus::Corpus;
use crate::index::DocId;
use crate::rank::ScoredResult;
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub doc_id: DocId,
    pub score: f32,
    pub title: String,
    pub url: String,
    pub body: String,
    pub published_at: String,
}

/// Keep positive scores, order by score descending, cut to `k`, attach metadata.
///
/// Equal scores keep corpus order (lower id first) regardless of input order.
pub fn assemble(scores: &[ScoredResult], k: usize, corpus: &Corpus) -> Vec<RankedResult> {
    let mut hits: Vec<ScoredResult> = scores.iter().copied().filter(|s| s.score > 0.0).collect();
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    hits.into_iter()
        .filter_map(|hit| {
            let doc = corpus.get(hit.doc_id)?;
            Some(RankedResult {
                doc_id: hit.doc_id,
                score: hit.score,
                title: doc.title.clone(),
                url: doc.url.clone(),
                body: doc.body.clone(),
                published_at: doc.published_at.clone(),
            })
        })
        .take(k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusRecord;

    fn corpus(n: usize) -> Corpus {
        Corpus::from_records((0..n).map(|i| CorpusRecord {
            title: format!("title {i}"),
            body: format!("body {i}"),
            url: format!("u{i}"),
            published_at: format!("day {i}"),
            modified_at: None,
        }))
    }

    fn s(doc_id: DocId, score: f32) -> ScoredResult { ScoredResult { doc_id, score } }

    #[test]
    fn drops_non_positive_scores() {
        let out = assemble(&[s(0, 0.0), s(1, 0.4), s(2, -0.1)], 10, &corpus(3));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "u1");
        assert_eq!(out[0].published_at, "day 1");
    }

    #[test]
    fn sorts_descending() {
        let out = assemble(&[s(0, 0.1), s(1, 0.9), s(2, 0.5)], 10, &corpus(3));
        let ids: Vec<_> = out.iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn equal_scores_keep_corpus_order() {
        // fed in reverse to make sure the tie-break is not input order
        let out = assemble(&[s(3, 0.5), s(2, 0.7), s(1, 0.5), s(0, 0.5)], 10, &corpus(4));
        let ids: Vec<_> = out.iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![2, 0, 1, 3]);
    }

    #[test]
    fn truncates_to_k() {
        let scores: Vec<_> = (0..5).map(|i| s(i, 0.1 * (i + 1) as f32)).collect();
        assert_eq!(assemble(&scores, 2, &corpus(5)).len(), 2);
        assert!(assemble(&scores, 0, &corpus(5)).is_empty());
        assert_eq!(assemble(&scores, 50, &corpus(5)).len(), 5);
    }

    #[test]
    fn no_positive_scores_is_empty() {
        assert!(assemble(&[s(0, 0.0), s(1, 0.0)], DEFAULT_K, &corpus(2)).is_empty());
    }
}
