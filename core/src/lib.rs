pub mod error;
pub mod index;
pub mod ingest;
pub mod tokenizer;

pub use error::IngestError;
pub use index::{CorpusIndex, CorpusStats, DocId, Document, DocumentScore, DocumentSummary, NewDocument, TermScore};
pub use ingest::{IngestReport, LoadedBatch, RawDocument, SkippedDocument};
