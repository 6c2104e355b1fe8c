use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tfidf_core::ingest::read_documents;
use tfidf_core::tokenizer::normalize_term;
use tfidf_core::{CorpusIndex, DocId, DocumentScore, IngestReport, TermScore};

#[derive(Parser)]
#[command(name = "tfidf")]
#[command(about = "Inspect TF-IDF term rankings for a set of documents", long_about = None)]
pub struct Cli {
    /// Input path (file or directory)
    #[arg(long)]
    pub input: PathBuf,
    /// Print JSON instead of plain text
    #[arg(long, default_value_t = false)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List loaded documents with their word counts
    List,
    /// Show the highest-scoring terms per document
    Top {
        /// Number of terms per document
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// Only this document id
        #[arg(long)]
        doc: Option<DocId>,
    },
    /// Show one term's score in every document
    Term {
        term: String,
    },
    /// Corpus size and vocabulary statistics
    Stats,
}

#[derive(Serialize)]
struct DocumentTopTerms<'a> {
    id: DocId,
    name: &'a str,
    terms: Vec<TermScore>,
}

#[derive(Serialize)]
struct TermReport {
    term: String,
    document_frequency: u32,
    max_score: f64,
    scores: Vec<DocumentScore>,
}

/// Read documents from `path` into a fresh corpus. Unreadable or undecodable
/// files end up in the report's skipped list.
pub fn load(path: &Path) -> Result<(CorpusIndex, IngestReport)> {
    let batch = read_documents(path)?;
    let mut corpus = CorpusIndex::new();
    let report = corpus.add_batch(batch);
    tracing::info!(path = %path.display(), added = report.added.len(), skipped = report.skipped.len(), "loaded documents");
    Ok((corpus, report))
}

pub fn render<W: Write>(corpus: &CorpusIndex, command: &Commands, json: bool, out: &mut W) -> Result<()> {
    match command {
        Commands::List => {
            let docs = corpus.list_documents();
            if json {
                serde_json::to_writer_pretty(&mut *out, &docs)?;
                writeln!(out)?;
            } else {
                for d in docs {
                    writeln!(out, "{}\t{}\t{}", d.id, d.name, d.word_count)?;
                }
            }
        }
        Commands::Top { k, doc } => {
            let selected: Vec<_> = match doc {
                Some(id) => vec![corpus.document(*id).ok_or_else(|| anyhow!("document {id} not found"))?],
                None => corpus.documents().collect(),
            };
            let tables: Vec<DocumentTopTerms> = selected
                .into_iter()
                .map(|d| DocumentTopTerms { id: d.id(), name: d.name(), terms: corpus.top_terms(d.id(), *k) })
                .collect();
            if json {
                serde_json::to_writer_pretty(&mut *out, &tables)?;
                writeln!(out)?;
            } else {
                for t in tables {
                    writeln!(out, "{} {}", t.id, t.name)?;
                    for ts in t.terms {
                        writeln!(out, "  {}\t{:.4}", ts.term, ts.score)?;
                    }
                }
            }
        }
        Commands::Term { term } => {
            let report = TermReport {
                term: normalize_term(term),
                document_frequency: corpus.document_frequency(term),
                max_score: corpus.max_score(term),
                scores: corpus.term_scores(term),
            };
            if json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{} df={} max={:.4}", report.term, report.document_frequency, report.max_score)?;
                for s in report.scores {
                    writeln!(out, "  {}\t{}\t{:.4}", s.id, s.name, s.score)?;
                }
            }
        }
        Commands::Stats => {
            let stats = corpus.stats();
            if json {
                serde_json::to_writer_pretty(&mut *out, &stats)?;
                writeln!(out)?;
            } else {
                writeln!(out, "documents: {}", stats.documents)?;
                writeln!(out, "vocabulary: {}", stats.vocabulary_size)?;
                writeln!(out, "tokens: {}", stats.total_tokens)?;
            }
        }
    }
    Ok(())
}
