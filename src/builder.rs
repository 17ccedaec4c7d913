use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::discovery::discover;
use crate::engine::{run, EngineOptions};
use crate::error::UmodexError;
use crate::extractor::Extractor;
use crate::results::{IndexReport, ScanStats};
use crate::tool::UModelTool;
use crate::traits::{Lister, Progress};

/// Worker count used unless [`IndexBuilder::threads`] says otherwise.
pub const DEFAULT_THREADS: usize = 8;

enum ListerChoice {
    Tool(PathBuf),
    Custom(Arc<dyn Lister>),
}

// ---------------------------------------------------------------------------
// IndexBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing an indexing run.
///
/// Created via [`umodex::index()`](crate::index). Configure with chained
/// builder methods, then call [`run()`](IndexBuilder::run) to execute.
///
/// # Example
///
/// ```rust,ignore
/// let report = umodex::index()
///     .root("C:/Games/RedOrchestra")
///     .tool("C:/Tools/umodel.exe")
///     .threads(8)
///     .timeout(Duration::from_secs(60))
///     .run()?;
/// ```
pub struct IndexBuilder {
    root:     Option<PathBuf>,
    lister:   Option<ListerChoice>,
    threads:  usize,
    timeout:  Option<Duration>,
    progress: Option<Arc<dyn Progress>>,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self {
            root:     None,
            lister:   None,
            threads:  DEFAULT_THREADS,
            timeout:  None,
            progress: None,
        }
    }
}

impl IndexBuilder {
    // ── Inputs ────────────────────────────────────────────────────────────

    /// Directory to scan for package files.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// List packages with the umodel executable at `exe`.
    pub fn tool(mut self, exe: impl Into<PathBuf>) -> Self {
        self.lister = Some(ListerChoice::Tool(exe.into()));
        self
    }

    /// List packages with a custom [`Lister`] instead of umodel.
    ///
    /// [`timeout`](Self::timeout) does not apply; the lister is responsible
    /// for its own deadlines.
    pub fn lister(mut self, lister: impl Lister + 'static) -> Self {
        self.lister = Some(ListerChoice::Custom(Arc::new(lister)));
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Number of packages listed concurrently. Defaults to [`DEFAULT_THREADS`].
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Kill a umodel process that runs longer than `limit` and record the
    /// package as failed. Unlimited by default.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Observe each finished package. See [`Progress`].
    pub fn on_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Discover, list and aggregate every package under the root.
    ///
    /// Blocks until every package has been listed or recorded as failed.
    ///
    /// # Errors
    ///
    /// Returns `Err` for fatal problems only: no root or lister configured,
    /// a zero thread count, a missing or unreadable root, or a broken worker
    /// pool. Per-package failures land in [`IndexReport::failures`].
    pub fn run(self) -> Result<IndexReport, UmodexError> {
        let root = self.root.ok_or(UmodexError::MissingRoot)?;

        let lister: Arc<dyn Lister> = match self.lister {
            Some(ListerChoice::Tool(exe)) => Arc::new(UModelTool::new(exe).timeout(self.timeout)),
            Some(ListerChoice::Custom(lister)) => lister,
            None => return Err(UmodexError::MissingTool),
        };

        if self.threads == 0 {
            return Err(UmodexError::InvalidThreadCount(0));
        }

        let start = Instant::now();
        let discovered = discover(&root, self.threads)?;

        let opts = EngineOptions {
            threads:   self.threads,
            extractor: Extractor::new(lister),
            progress:  self.progress,
        };
        let (index, failures) = run(&discovered.paths, opts)?;

        let stats = ScanStats {
            packages: discovered.paths.len(),
            records:  index.record_count(),
            failed:   failures.len(),
            duration: start.elapsed(),
        };
        info!(records = stats.records, failed = stats.failed, "indexing complete");

        Ok(IndexReport {
            index,
            failures,
            walk_errors: discovered.errors,
            stats,
        })
    }
}
