use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a candidate source into document text.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{name}: content is not valid UTF-8 text")]
    Decode { name: String },
    #[error("{path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
