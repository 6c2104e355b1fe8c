use clap::Parser;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;
use tfidf_cli::{load, render, Cli, Commands};

fn corpus_dir() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("doc1.txt"), "the cat sat").unwrap();
    fs::write(dir.path().join("doc2.txt"), "the dog sat").unwrap();
    fs::write(dir.path().join("garbled.txt"), [0xffu8, 0x00]).unwrap();
    dir
}

fn run(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    let (corpus, _) = load(&cli.input).unwrap();
    let mut out = Vec::new();
    render(&corpus, &cli.command, cli.json, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn load_reports_skipped_files() {
    let dir = corpus_dir();
    let (corpus, report) = load(dir.path()).unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "garbled.txt");
}

#[test]
fn list_prints_one_line_per_document() {
    let dir = corpus_dir();
    let input = dir.path().to_str().unwrap();
    let text = run(&["tfidf", "--input", input, "list"]);
    assert_eq!(text, "0\tdoc1.txt\t3\n1\tdoc2.txt\t3\n");
}

#[test]
fn top_for_one_document_as_json() {
    let dir = corpus_dir();
    let input = dir.path().to_str().unwrap();
    let text = run(&["tfidf", "--input", input, "--json", "top", "--k", "1", "--doc", "1"]);
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json[0]["name"], "doc2.txt");
    assert_eq!(json[0]["terms"][0]["term"], "dog");
}

#[test]
fn top_with_unknown_document_fails() {
    let dir = corpus_dir();
    let (corpus, _) = load(dir.path()).unwrap();
    let mut out = Vec::new();
    let err = render(&corpus, &Commands::Top { k: 3, doc: Some(42) }, false, &mut out).unwrap_err();
    assert!(err.to_string().contains("42"));
}

#[test]
fn term_prints_scores_per_document() {
    let dir = corpus_dir();
    let input = dir.path().to_str().unwrap();
    let text = run(&["tfidf", "--input", input, "term", "Cat"]);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "cat df=1 max=0.2310");
    assert_eq!(lines[1], "  0\tdoc1.txt\t0.2310");
    assert_eq!(lines[2], "  1\tdoc2.txt\t0.0000");
}

#[test]
fn stats_as_text() {
    let dir = corpus_dir();
    let input = dir.path().to_str().unwrap();
    let text = run(&["tfidf", "--input", input, "stats"]);
    assert_eq!(text, "documents: 2\nvocabulary: 4\ntokens: 6\n");
}
