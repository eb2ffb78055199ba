use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const CORPUS: &str = r#"[
  {"url": "u1", "title": "Enrollment opens", "published_at": "01/03/2024", "body": "Enrollment period starts in March"},
  {"url": "u2", "title": "Sports day", "published_at": "05/03/2024", "body": "Annual sports day celebration"}
]"#;

fn run(dir: &Path, args: &[&str]) -> Output {
    let corpus = dir.join("noticias.json");
    fs::write(&corpus, CORPUS).unwrap();
    Command::new(env!("CARGO_BIN_EXE_newsqa"))
        .args(args)
        .arg("--corpus")
        .arg(&corpus)
        .env_remove("DEEPSEEK_API_KEY")
        .output()
        .expect("run CLI")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn search_prints_matching_article() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout(&run(dir.path(), &["search", "enrollment"]));
    assert!(out.starts_with("Question: enrollment\n"));
    assert!(out.contains("Title: Enrollment opens\nURL: u1\n"));
    assert!(!out.contains("Sports day"));
    assert!(out.contains("Excerpt: Enrollment period starts in March ..."));
}

#[test]
fn search_without_matches_says_so() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout(&run(dir.path(), &["search", "xyzabc"]));
    assert!(out.contains("No results related to your query were found."));
}

#[test]
fn summarize_falls_back_to_template() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout(&run(dir.path(), &["search", "sports enrollment", "--summarize"]));
    assert!(out.contains("Answer:\nFound 2 relevant result(s). The main ones are:"));
}

#[test]
fn stats_reports_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout(&run(dir.path(), &["stats", "--language", "english", "--top", "3"]));
    assert!(out.contains("documents: 2\n"));
    assert!(out.contains("stop words: english"));
    assert!(out.contains("annual\n"));
    assert!(out.contains("celebration\n"));
    assert!(out.contains("day\n"));
    assert!(!out.contains("enrollment\n"));
}

#[test]
fn search_logs_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("noticias.json");
    fs::write(&corpus, CORPUS).unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_newsqa"))
        .args(["search", "enrollment", "--corpus"])
        .arg(&corpus)
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .output()
        .expect("run CLI");
    let out = stdout(&output);
    assert!(out.starts_with("Question: enrollment\n"));
    assert!(!out.contains("search finished"));
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("search finished"));
    assert!(err.contains("hits"));
}

#[test]
fn missing_corpus_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_newsqa"))
        .args(["search", "anything", "--corpus", "/no/such/corpus.json"])
        .output()
        .expect("run CLI");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to build index"));
}
