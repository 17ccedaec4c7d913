use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use crate::error::{ExtractError, ExtractionFailure, UmodexError};
use crate::extractor::{Extraction, Extractor};
use crate::model::Package;
use crate::results::Index;
use crate::traits::Progress;

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions {
    pub threads:   usize,
    pub extractor: Extractor,
    pub progress:  Option<Arc<dyn Progress>>,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// List every path on a bounded pool of workers and aggregate the results.
///
/// Workers pull the next path off a shared cursor, so a hung listing only
/// occupies its own slot. Finished extractions go over a channel to the
/// calling thread, which is the only writer to the index. Returns once every
/// path has been accounted for.
pub(crate) fn run(
    paths: &[PathBuf],
    opts: EngineOptions,
) -> Result<(Index, Vec<ExtractionFailure>), UmodexError> {
    let total = paths.len();
    let workers = opts.threads.min(total).max(1);
    info!(packages = total, workers, "indexing");

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Extraction)>();

    thread::scope(|s| -> Result<(Index, Vec<ExtractionFailure>), UmodexError> {
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let extractor = &opts.extractor;

            let handle = thread::Builder::new()
                .name(format!("umodex-worker-{id}"))
                .spawn_scoped(s, move || loop {
                    let i = next.fetch_add(1, Ordering::Relaxed);
                    let Some(path) = paths.get(i) else {
                        break;
                    };
                    let extraction = extract_isolated(extractor, path);
                    if tx.send((i, extraction)).is_err() {
                        break;
                    }
                })
                .map_err(|e| UmodexError::ThreadPool(e.to_string()))?;
            handles.push(handle);
        }
        // Only workers hold senders now; the loop below ends when they all exit.
        drop(tx);

        let mut index = Index::default();
        let mut failures = Vec::new();
        let mut done = 0;

        for (i, extraction) in rx {
            let path = &paths[i];
            done += 1;

            match extraction.error {
                Some(error) => {
                    warn!(path = %path.display(), %error, "extraction failed");
                    failures.push(ExtractionFailure {
                        path: path.clone(),
                        error,
                    });
                }
                None => debug!(
                    path = %path.display(),
                    records = extraction.package.len(),
                    "indexed"
                ),
            }
            index.insert(path.clone(), extraction.package);

            if let Some(progress) = &opts.progress {
                progress.on_complete(done, total, path);
            }
        }

        for handle in handles {
            handle
                .join()
                .map_err(|_| UmodexError::ThreadPool("indexing worker panicked".into()))?;
        }

        if done != total {
            return Err(UmodexError::ThreadPool(format!(
                "{done} of {total} packages finished"
            )));
        }

        failures.sort_by(|a, b| a.path.cmp(&b.path));
        Ok((index, failures))
    })
}

/// Run one extraction, turning a panic into a failure of that package alone.
fn extract_isolated(extractor: &Extractor, path: &Path) -> Extraction {
    panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(path))).unwrap_or_else(|payload| {
        Extraction {
            package: Package::from_path(path),
            error: Some(ExtractError::Panicked {
                message: panic_message(payload.as_ref()),
            }),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
