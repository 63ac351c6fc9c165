//! Error types for `BankSorter`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `BankSorter` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file move within the output tree failed.
    #[error("failed to move {from} to {to}: {source}")]
    MoveFailed {
        /// The file being moved.
        from: PathBuf,
        /// The intended destination.
        to: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    // ==================== External Tool Errors ====================
    /// A required external tool could not be located.
    #[error("{tool} not found at {path}")]
    ToolNotFound {
        /// Human-readable tool name (e.g. `wwiser`, `vgmstream-cli`).
        tool: &'static str,
        /// The path that was checked.
        path: PathBuf,
    },

    /// An external tool could not be started.
    #[error("failed to run {tool}: {source}")]
    ToolSpawnFailed {
        /// Human-readable tool name.
        tool: &'static str,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// An external tool exited with a non-zero status.
    #[error("{tool} failed on {input} (exit code {code:?}): {stderr}")]
    ToolFailed {
        /// Human-readable tool name.
        tool: &'static str,
        /// The file the tool was run on.
        input: PathBuf,
        /// The process exit code, if any.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// An external tool exceeded the configured time limit and was killed.
    #[error("{tool} timed out after {secs}s on {input}")]
    ToolTimedOut {
        /// Human-readable tool name.
        tool: &'static str,
        /// The file the tool was run on.
        input: PathBuf,
        /// The time limit in seconds.
        secs: u64,
    },

    /// An external tool reported success but its output file is missing.
    #[error("{tool} produced no output at {expected}")]
    ToolOutputMissing {
        /// Human-readable tool name.
        tool: &'static str,
        /// The output path that was expected to exist.
        expected: PathBuf,
    },

    // ==================== Knowledge Base Errors ====================
    /// The knowledge base snapshot does not exist.
    #[error("knowledge base not found: {0}")]
    KnowledgeBaseMissing(PathBuf),

    // ==================== Parsing Errors ====================
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttrError(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),

    // ==================== Pipeline Errors ====================
    /// The operation was cancelled through a cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration could not be used as given.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttrError(err.to_string())
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `BankSorter` operations.
pub type Result<T> = std::result::Result<T, Error>;
