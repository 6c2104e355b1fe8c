use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::IngestError;
use crate::index::{DocId, NewDocument};

/// File extensions picked up when walking a directory. Everything is read as
/// plain text; pdf/doc variants get no format-specific parsing.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "text", "md", "pdf", "doc", "docs"];

/// Undecoded input: a display name and the bytes read from wherever.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: String,
}

impl SkippedDocument {
    pub fn new(name: impl Into<String>, err: &IngestError) -> Self {
        Self { name: name.into(), reason: err.to_string() }
    }
}

/// Documents that decoded, plus the ones that did not.
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub documents: Vec<NewDocument>,
    pub skipped: Vec<SkippedDocument>,
}

/// Outcome of adding a batch: ids assigned to the documents that made it in,
/// and the ones left out with the reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub added: Vec<DocId>,
    pub skipped: Vec<SkippedDocument>,
}

pub fn decode(name: &str, bytes: Vec<u8>) -> Result<NewDocument, IngestError> {
    match String::from_utf8(bytes) {
        Ok(text) => Ok(NewDocument::new(name, text)),
        Err(_) => Err(IngestError::Decode { name: name.to_string() }),
    }
}

/// Load a single file, or every accepted file under a directory (sorted by path).
/// Files that cannot be read or decoded are skipped; only an unusable root is an error.
pub fn read_documents<P: AsRef<Path>>(path: P) -> Result<LoadedBatch, IngestError> {
    let root = path.as_ref();
    let meta = fs::metadata(root).map_err(|source| IngestError::Io { path: root.to_path_buf(), source })?;

    let mut files = Vec::new();
    if meta.is_dir() {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && is_accepted(entry.path()) {
                files.push(entry.into_path());
            }
        }
    } else {
        files.push(root.to_path_buf());
    }

    let mut batch = LoadedBatch::default();
    for file in files {
        let name = display_name(&file);
        let result = fs::read(&file)
            .map_err(|source| IngestError::Io { path: file.clone(), source })
            .and_then(|bytes| decode(&name, bytes));
        match result {
            Ok(doc) => batch.documents.push(doc),
            Err(err) => {
                warn!(file = %file.display(), error = %err, "skipping document");
                batch.skipped.push(SkippedDocument::new(name, &err));
            }
        }
    }
    Ok(batch)
}

fn is_accepted(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ACCEPTED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
