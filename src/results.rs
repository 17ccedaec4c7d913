use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ExtractionFailure, UmodexError};
use crate::model::{Package, Record};

/// Every listed package, keyed by the path it was read from.
///
/// Built once by the indexer and read-only afterwards, so it can be shared
/// between any number of reader threads as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    packages: BTreeMap<PathBuf, Package>,
}

impl Index {
    pub(crate) fn insert(&mut self, path: PathBuf, package: Package) {
        self.packages.insert(path, package);
    }

    pub fn get(&self, path: &Path) -> Option<&Package> {
        self.packages.get(path)
    }

    pub fn packages(&self) -> impl Iterator<Item = (&Path, &Package)> {
        self.packages.iter().map(|(p, pkg)| (p.as_path(), pkg))
    }

    /// Every record of every package.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.packages.values().flat_map(|pkg| pkg.records.values())
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.packages.values().map(Package::len).sum()
    }
}

/// The output of a completed indexing run.
pub struct IndexReport {
    /// Everything that was listed, including (possibly empty) packages whose
    /// listing failed.
    pub index: Index,

    /// Packages whose listing failed, in path order.
    pub failures: Vec<ExtractionFailure>,

    /// Subdirectories discovery could not read. Always recoverable.
    pub walk_errors: Vec<UmodexError>,

    pub stats: ScanStats,
}

impl IndexReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.walk_errors.is_empty()
    }
}

/// Counters for a completed indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Package files submitted to the workers.
    pub packages: usize,

    /// Records across the whole index.
    pub records: usize,

    /// Packages whose listing failed.
    pub failed: usize,

    /// Wall-clock time from discovery start to the barrier.
    pub duration: Duration,
}
