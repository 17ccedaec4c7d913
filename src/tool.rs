use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::{ExtractError, UmodexError};
use crate::extractor::decode_report;
use crate::traits::{ListOutput, Lister};

/// Substring every genuine umodel build prints for `-version`.
pub const UMODEL_SIGNATURE: &str = "https://www.gildor.org/en/projects/umodel";

/// The real umodel executable.
///
/// Each call spawns its own process. With a timeout set, a process that
/// outlives it is killed and the call fails with [`ExtractError::TimedOut`].
#[derive(Debug, Clone)]
pub struct UModelTool {
    exe: PathBuf,
    timeout: Option<Duration>,
}

impl UModelTool {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Check that `exe` exists and identifies itself as umodel.
    pub fn check_version(&self) -> Result<(), UmodexError> {
        if !self.exe.is_file() {
            return Err(UmodexError::ToolNotFound(self.exe.clone()));
        }

        let output = self
            .run([OsStr::new("-version")])
            .map_err(|e| {
                warn!(error = %e, "umodel -version failed");
                UmodexError::ToolNotRecognised(self.exe.clone())
            })?;

        let text = decode_report(&output.stdout);
        if output.success() && text.contains(UMODEL_SIGNATURE) {
            Ok(())
        } else {
            Err(UmodexError::ToolNotRecognised(self.exe.clone()))
        }
    }

    fn run<I, S>(&self, args: I) -> Result<ListOutput, ExtractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut child = Command::new(&self.exe)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExtractError::Spawn { source })?;

        // Drain stdout on its own thread so a chatty process can't fill the
        // pipe and block while we wait on it.
        let mut stdout = child.stdout.take().ok_or_else(|| ExtractError::Io {
            source: std::io::Error::other("stdout was not captured"),
        })?;
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        });

        let status = match self.timeout {
            Some(limit) => child
                .wait_timeout(limit)
                .map_err(|source| ExtractError::Io { source })?,
            None => Some(child.wait().map_err(|source| ExtractError::Io { source })?),
        };

        let Some(status) = status else {
            // Killing closes the pipe, so the reader finishes too.
            let _ = child.kill();
            let _ = child.wait();
            let _ = reader.join();
            return Err(ExtractError::TimedOut {
                after: self.timeout.unwrap_or_default(),
            });
        };

        let stdout = reader
            .join()
            .map_err(|_| ExtractError::Io {
                source: std::io::Error::other("stdout reader panicked"),
            })?
            .map_err(|source| ExtractError::Io { source })?;

        Ok(ListOutput {
            stdout,
            code: status.code(),
        })
    }
}

impl Lister for UModelTool {
    fn list(&self, path: &Path) -> Result<ListOutput, ExtractError> {
        debug!(path = %path.display(), "running umodel -list");
        self.run([OsStr::new("-list"), path.as_os_str()])
    }
}
