use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("catalog unavailable at {}: {reason}", .path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    #[error("catalog error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("record encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("unsupported record version: {0}")]
    UnsupportedRecordVersion(u8),

    #[error("empty record value")]
    EmptyRecord,

    #[error("catalog schema version {db} is newer than supported version {code}")]
    SchemaTooNew { db: u32, code: u32 },

    #[error("cannot read {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walkdir error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("source path does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("source path is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("destination path does not exist: {}", .0.display())]
    DestinationNotFound(PathBuf),

    #[error("not a regular file: {}", .0.display())]
    NotRegularFile(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    DestinationWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no catalog record for {}", .0.display())]
    MissingRecord(PathBuf),

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

impl Error {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::SourceUnreadable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::DestinationWriteFailed {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
