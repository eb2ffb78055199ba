use criterion::{criterion_group, criterion_main, Criterion};
use newsqa_core::tokenizer::{tokenize, StopWordLanguage};
use newsqa_core::{build, score, Corpus, CorpusRecord, IndexOptions};

const SAMPLE: &str = "O campus Igarassu abre inscrições para cursos técnicos. \
    As aulas começam em março e as vagas são limitadas. \
    Estudantes podem consultar o edital no portal institucional.";

fn corpus(n: usize) -> Corpus {
    Corpus::from_records((0..n).map(|i| CorpusRecord {
        title: format!("Notícia {i} do campus"),
        body: format!("{SAMPLE} Número {i}, turma {}.", i % 17),
        url: format!("https://example.org/noticias/{i}"),
        published_at: String::new(),
        modified_at: None,
    }))
}

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_sample", |b| b.iter(|| tokenize(SAMPLE, StopWordLanguage::Portuguese)));
}

fn bench_build_and_score(c: &mut Criterion) {
    let docs = corpus(1_000);
    c.bench_function("build_1000_docs", |b| b.iter(|| build(docs.documents(), IndexOptions::default())));
    let index = build(docs.documents(), IndexOptions::default()).expect("non-empty corpus");
    c.bench_function("score_1000_docs", |b| b.iter(|| score("inscrições cursos técnicos março", &index)));
}

criterion_group!(benches, bench_tokenize, bench_build_and_score);
criterion_main!(benches);
