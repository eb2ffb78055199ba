use newsqa_core::{
    build, score, Corpus, CorpusRecord, InMemorySource, IndexOptions, SearchEngine, StopWordLanguage,
};

fn record(title: &str, body: &str, url: &str) -> CorpusRecord {
    CorpusRecord {
        title: title.into(),
        body: body.into(),
        url: url.into(),
        published_at: "2024-03-01".into(),
        modified_at: None,
    }
}

fn english() -> IndexOptions {
    IndexOptions { language: StopWordLanguage::English, sublinear_tf: false }
}

fn news() -> Vec<CorpusRecord> {
    vec![
        record("Enrollment opens", "Enrollment period starts in March", "u1"),
        record("Sports day", "Annual sports day celebration", "u2"),
    ]
}

fn ready_engine(records: Vec<CorpusRecord>, options: IndexOptions) -> SearchEngine {
    let engine = SearchEngine::new(InMemorySource::new(records), options);
    engine.ensure_index_built().unwrap();
    engine
}

fn larger_corpus() -> Vec<CorpusRecord> {
    vec![
        record("Campus library extends hours", "The library will stay open until midnight during exams", "a"),
        record("Robotics team wins regional", "Students built a robot that sorts recycling", "b"),
        record("Enrollment for evening courses", "Evening courses accept enrollment until Friday", "c"),
        record("Library receives donation", "A donation of two thousand books arrived at the library", "d"),
        record("Exams schedule published", "The exams schedule for the semester is available online", "e"),
    ]
}

#[test]
fn rebuilding_is_bit_for_bit_identical() {
    let corpus = Corpus::from_records(larger_corpus());
    let first = build(corpus.documents(), english()).unwrap();
    let second = build(corpus.documents(), english()).unwrap();
    assert_eq!(first.vocabulary(), second.vocabulary());
    let bits = |idx: &newsqa_core::TfIdfIndex| -> Vec<Vec<(u32, u32)>> {
        idx.matrix()
            .rows()
            .iter()
            .map(|r| r.entries.iter().map(|(c, w)| (*c, w.to_bits())).collect())
            .collect()
    };
    assert_eq!(bits(&first), bits(&second));
    assert_eq!(
        first.idf().iter().map(|w| w.to_bits()).collect::<Vec<_>>(),
        second.idf().iter().map(|w| w.to_bits()).collect::<Vec<_>>()
    );
}

#[test]
fn a_document_is_most_similar_to_itself() {
    let records = larger_corpus();
    let corpus = Corpus::from_records(records.clone());
    let index = build(corpus.documents(), english()).unwrap();
    for doc in corpus.documents() {
        let scores = score(&doc.indexing_text(), &index);
        let own = scores[doc.id as usize].score;
        assert!((own - 1.0).abs() < 1e-5, "doc {} scored {own}", doc.id);
        assert!(scores.iter().all(|s| s.score <= own));
    }
}

#[test]
fn a_unique_matching_term_raises_relative_score() {
    let corpus = Corpus::from_records(vec![
        record("Sports day", "Annual sports day celebration", "d0"),
        record("Sports news", "Local sports league results", "d1"),
    ]);
    let index = build(corpus.documents(), english()).unwrap();
    let base = score("sports", &index);
    let boosted = score("sports celebration", &index);
    assert!(boosted[0].score - boosted[1].score > base[0].score - base[1].score);
    assert!(boosted[0].score > boosted[1].score);
}

#[test]
fn empty_query_returns_nothing() {
    let engine = ready_engine(news(), english());
    assert!(engine.search("", 10).unwrap().is_empty());
    assert!(engine.search("   ", 10).unwrap().is_empty());
}

#[test]
fn out_of_vocabulary_query_returns_nothing() {
    let engine = ready_engine(news(), english());
    assert!(engine.search("xyzabc", 10).unwrap().is_empty());
    assert!(engine.search("qwerty zxcvb", 10).unwrap().is_empty());
}

#[test]
fn equal_scores_follow_corpus_order() {
    let engine = ready_engine(
        vec![
            record("Other story", "Nothing related", "x"),
            record("Graduation ceremony", "Ceremony on Friday", "first"),
            record("Graduation ceremony", "Ceremony on Friday", "second"),
        ],
        english(),
    );
    let results = engine.search("graduation", 10).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].score, results[1].score);
    assert_eq!(results[0].url, "first");
    assert_eq!(results[1].url, "second");
}

#[test]
fn result_count_never_exceeds_k() {
    let engine = ready_engine(larger_corpus(), english());
    for q in ["library", "exams library enrollment", "robot", "courses evening exams schedule"] {
        assert!(engine.search(q, 0).unwrap().is_empty());
        for k in 1..6 {
            assert!(engine.search(q, k).unwrap().len() <= k);
        }
    }
}

#[test]
fn enrollment_finds_only_the_enrollment_article() {
    let engine = ready_engine(news(), IndexOptions::default());
    let results = engine.search("enrollment", 10).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "u1");
    assert!(results[0].score > 0.0);
    assert_eq!(results[0].title, "Enrollment opens");
    assert_eq!(results[0].published_at, "2024-03-01");
}

#[test]
fn celebration_finds_only_sports_day() {
    let engine = ready_engine(news(), IndexOptions::default());
    let results = engine.search("celebration", 10).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "u2");
}

#[test]
fn unknown_word_finds_nothing() {
    let engine = ready_engine(news(), IndexOptions::default());
    assert!(engine.search("xyzabc", 10).unwrap().is_empty());
}

#[test]
fn portuguese_question_ranks_matching_news_first() {
    let engine = ready_engine(
        vec![
            record("Campus realiza semana de ciência", "A semana de ciência acontece em outubro", "ciencia"),
            record("Inscrições abertas para o processo seletivo", "As inscrições do processo seletivo vão até março", "selecao"),
            record("Biblioteca amplia horário", "A biblioteca funciona até as 22h", "biblioteca"),
        ],
        IndexOptions::default(),
    );
    let results = engine.search("quando abrem as inscrições para o processo seletivo", 10).unwrap();
    assert_eq!(results[0].url, "selecao");
    assert_eq!(results.len(), 1);
}
