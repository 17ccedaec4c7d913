use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal errors. Any of these stops the program before (or instead of) indexing.
#[derive(Error, Debug)]
pub enum UmodexError {
    // Configuration
    #[error("umodel executable not found: {}", .0.display())]
    ToolNotFound(PathBuf),

    #[error("{} does not look like umodel", .0.display())]
    ToolNotRecognised(PathBuf),

    #[error("no root directory given and none configured")]
    MissingRoot,

    #[error("no umodel executable given and none configured")]
    MissingTool,

    #[error("invalid config file {}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid thread count: {0}")]
    InvalidThreadCount(usize),

    // Traversal
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("symlink loop at {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("walk error: {0}")]
    Walk(String),

    // Runtime
    #[error("worker pool failure: {0}")]
    ThreadPool(String),

    #[error("IO error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UmodexError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::ToolNotFound(p)
            | Self::ToolNotRecognised(p)
            | Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::SymlinkLoop(p)
            | Self::Config { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether discovery can keep going after this error.
    ///
    /// Unreadable subdirectories and symlink loops below the root are skipped
    /// and reported; everything else halts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::SymlinkLoop(_) | Self::Io { .. } | Self::Walk(_)
        )
    }
}

/// Why a single package could not be listed.
///
/// Never fatal: the indexer records it next to the package path and moves on.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to run umodel")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read umodel output")]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("umodel exited with status {}", .code.map_or_else(|| "<signal>".to_string(), |c| c.to_string()))]
    NonZeroExit { code: Option<i32> },

    #[error("umodel did not finish within {after:?}")]
    TimedOut { after: Duration },

    #[error("report contained no records")]
    NoRecords,

    #[error("listing panicked: {message}")]
    Panicked { message: String },
}

/// An [`ExtractError`] tied to the package file it happened on.
#[derive(Debug)]
pub struct ExtractionFailure {
    pub path: PathBuf,
    pub error: ExtractError,
}
