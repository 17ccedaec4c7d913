use std::path::Path;

use crate::error::ExtractError;

/// Raw result of listing one package: captured stdout and the exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOutput {
    /// Undecoded stdout. umodel writes Windows-1252, not UTF-8.
    pub stdout: Vec<u8>,

    /// Process exit code. `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl ListOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Something that can produce a `-list` report for a package file.
///
/// [`UModelTool`](crate::tool::UModelTool) is the real implementation; tests
/// substitute a double that returns canned reports.
///
/// # Thread Safety
///
/// `Send + Sync` are required: one lister is shared by every indexing worker
/// and called concurrently on different paths.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use umodex::{ExtractError, ListOutput, Lister};
///
/// struct Canned(&'static str);
///
/// impl Lister for Canned {
///     fn list(&self, _path: &Path) -> Result<ListOutput, ExtractError> {
///         Ok(ListOutput { stdout: self.0.as_bytes().to_vec(), code: Some(0) })
///     }
/// }
/// ```
pub trait Lister: Send + Sync {
    /// Run the listing for `path`.
    ///
    /// Return `Err` only when no report could be obtained at all (spawn
    /// failure, timeout). A process that ran and exited non-zero is reported
    /// through [`ListOutput::code`].
    fn list(&self, path: &Path) -> Result<ListOutput, ExtractError>;
}

/// Observer for indexing progress.
///
/// Called once per finished package, from the aggregating thread, with a
/// monotonically increasing `done` count. Never affects the result.
pub trait Progress: Send + Sync {
    fn on_complete(&self, done: usize, total: usize, path: &Path);
}

impl<F> Progress for F
where
    F: Fn(usize, usize, &Path) + Send + Sync,
{
    fn on_complete(&self, done: usize, total: usize, path: &Path) {
        self(done, total, path)
    }
}
