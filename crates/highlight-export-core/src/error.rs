//! Error types and exit codes for highlight-export
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args)
//! - 3: Data error (invalid frontmatter, invalid config, unresolvable bookmark)

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - invalid notes, config or upstream records (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors raised while decoding a source hash token
#[derive(Error, Debug)]
pub enum HashError {
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is not a highlight id list: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Errors that can occur while exporting highlights
#[derive(Error, Debug)]
pub enum ExportError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    // Data errors (exit code 3)
    #[error("invalid frontmatter in {path:?}: {reason}")]
    InvalidFrontmatter { path: PathBuf, reason: String },

    #[error("note {path:?} has no local id")]
    MissingLocalId { path: PathBuf },

    #[error("note file already exists: {path:?}")]
    NoteExists { path: PathBuf },

    #[error("could not resolve bookmark {id}: {reason}")]
    BookmarkUnresolved { id: String, reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid source hash: {0}")]
    Hash(#[from] HashError),

    // Generic failures (exit code 1)
    #[error("request to {url} failed: {reason}")]
    Source { url: String, reason: String },

    #[error("IO error at {path:?}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl ExportError {
    /// Wrap an I/O error with the path it happened on
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ExportError::UnknownFormat(_) | ExportError::UsageError(_) => ExitCode::Usage,

            ExportError::InvalidFrontmatter { .. }
            | ExportError::MissingLocalId { .. }
            | ExportError::NoteExists { .. }
            | ExportError::BookmarkUnresolved { .. }
            | ExportError::InvalidConfig { .. }
            | ExportError::Hash(_) => ExitCode::Data,

            ExportError::Source { .. }
            | ExportError::FileIo { .. }
            | ExportError::Io(_)
            | ExportError::Yaml(_)
            | ExportError::Json(_)
            | ExportError::Toml(_)
            | ExportError::Other(_) => ExitCode::Failure,
        }
    }

    /// Whether this error must abort a sync run rather than fail a single note.
    ///
    /// Filesystem failures on the notes directory stop the run; everything
    /// else is scoped to the note being processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExportError::FileIo { .. } | ExportError::Io(_))
    }

    /// Convert error to JSON representation for structured error output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            ExportError::UnknownFormat(_) => "unknown_format",
            ExportError::UsageError(_) => "usage_error",
            ExportError::InvalidFrontmatter { .. } => "invalid_frontmatter",
            ExportError::MissingLocalId { .. } => "missing_local_id",
            ExportError::NoteExists { .. } => "note_exists",
            ExportError::BookmarkUnresolved { .. } => "bookmark_unresolved",
            ExportError::InvalidConfig { .. } => "invalid_config",
            ExportError::Hash(_) => "invalid_hash",
            ExportError::Source { .. } => "source_error",
            ExportError::FileIo { .. } | ExportError::Io(_) => "io_error",
            ExportError::Yaml(_) => "yaml_error",
            ExportError::Json(_) => "json_error",
            ExportError::Toml(_) => "toml_error",
            ExportError::Other(_) => "other",
        }
    }
}

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
