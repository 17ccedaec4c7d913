use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use umodex::discovery::{discover, is_package};
use umodex::{index, ExtractError, ListOutput, Lister, SearchEngine, UmodexError};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a temporary game directory for testing.
///
/// Structure:
/// ```text
/// tmp/
///   Textures/
///     Weapons.utx
///     Broken.utx
///   Maps/
///     Maps.usx
///   System/
///     Default.ini
/// ```
fn setup_game_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    for sub in ["Textures", "Maps", "System"] {
        fs::create_dir(root.join(sub)).unwrap();
    }
    fs::write(root.join("Textures/Weapons.utx"), b"").unwrap();
    fs::write(root.join("Textures/Broken.utx"), b"").unwrap();
    fs::write(root.join("Maps/Maps.usx"), b"").unwrap();
    fs::write(root.join("System/Default.ini"), b"").unwrap();

    dir
}

/// Canned umodel: answers by package name, exits 1 for anything unknown.
struct FixtureLister {
    reports: HashMap<&'static str, &'static str>,
    calls: Arc<AtomicUsize>,
}

impl FixtureLister {
    fn new() -> Self {
        let mut reports = HashMap::new();
        reports.insert(
            "Weapons",
            concat!(
                "Loading package: Weapons.utx\r\n",
                "\r\n",
                "    0     1A3F     400 Texture Grip\r\n",
                "    1     1E3F      10 Package Group\r\n",
            ),
        );
        reports.insert(
            "Maps",
            concat!(
                "Loading package: Maps.usx\r\n",
                "    0      200    2000 StaticMesh Rock\r\n",
                "    1      300       4 VertexColor Rock\r\n",
            ),
        );
        Self {
            reports,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Lister for FixtureLister {
    fn list(&self, path: &Path) -> Result<ListOutput, ExtractError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let stem = path.file_stem().unwrap().to_str().unwrap();
        Ok(match self.reports.get(stem) {
            Some(report) => ListOutput {
                stdout: report.as_bytes().to_vec(),
                code: Some(0),
            },
            None => ListOutput {
                stdout: b"Error: cannot load package\r\n".to_vec(),
                code: Some(1),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn end_to_end_search() {
    let dir = setup_game_dir();
    let report = index()
        .root(dir.path())
        .lister(FixtureLister::new())
        .run()
        .unwrap();

    let engine = SearchEngine::new(&report.index);

    let rock = engine.search("ROCK");
    assert_eq!(rock.len(), 1, "VertexColor row must be excluded");
    assert_eq!(rock[0].identifier, "StaticMesh'Maps.Rock'");
    assert_eq!(rock[0].size_bytes, 8192);

    assert!(engine.search("GROUP").is_empty(), "Package row must be excluded");
    assert_eq!(engine.search("grip")[0].identifier, "Texture'Weapons.Grip'");
}

#[test]
fn failed_package_is_reported_not_fatal() {
    let dir = setup_game_dir();
    let report = index()
        .root(dir.path())
        .lister(FixtureLister::new())
        .threads(2)
        .run()
        .unwrap();

    assert_eq!(report.stats.packages, 3);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.records, 2);
    assert!(!report.is_clean());

    let failure = &report.failures[0];
    assert!(failure.path.ends_with("Textures/Broken.utx"));
    assert!(matches!(
        failure.error,
        ExtractError::NonZeroExit { code: Some(1) }
    ));

    // Siblings are still queryable.
    assert_eq!(SearchEngine::new(&report.index).search("rock").len(), 1);
}

#[test]
fn every_package_listed_once() {
    let dir = setup_game_dir();
    let lister = FixtureLister::new();
    let calls = Arc::clone(&lister.calls);

    index().root(dir.path()).lister(lister).run().unwrap();

    assert_eq!(calls.load(Ordering::Relaxed), 3);
}

#[test]
fn sequential_matches_parallel() {
    let dir = setup_game_dir();
    for n in 0..20 {
        fs::write(dir.path().join(format!("Textures/Extra{n}.utx")), b"").unwrap();
    }

    let one = index()
        .root(dir.path())
        .lister(FixtureLister::new())
        .threads(1)
        .run()
        .unwrap();
    let eight = index()
        .root(dir.path())
        .lister(FixtureLister::new())
        .threads(8)
        .run()
        .unwrap();

    assert_eq!(one.index, eight.index);
    let fail_paths = |r: &umodex::IndexReport| -> Vec<PathBuf> {
        r.failures.iter().map(|f| f.path.clone()).collect()
    };
    assert_eq!(fail_paths(&one), fail_paths(&eight));
}

#[test]
fn discovery_agrees_with_walkdir() {
    let dir = setup_game_dir();
    let found = discover(dir.path(), 4).unwrap();

    let mut expected: Vec<PathBuf> = walkdir::WalkDir::new(dir.path())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_package(e.path()))
        .map(|e| e.into_path())
        .collect();
    expected.sort();

    assert_eq!(found.paths, expected);
}

#[test]
fn missing_root_halts_before_indexing() {
    let dir = tempfile::tempdir().unwrap();
    let lister = FixtureLister::new();
    let calls = Arc::clone(&lister.calls);

    let err = index()
        .root(dir.path().join("missing"))
        .lister(lister)
        .run()
        .err()
        .unwrap();

    assert!(matches!(err, UmodexError::NotFound(_)));
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn zero_threads_rejected() {
    let dir = setup_game_dir();
    let result = index()
        .root(dir.path())
        .lister(FixtureLister::new())
        .threads(0)
        .run();
    assert!(matches!(result, Err(UmodexError::InvalidThreadCount(0))));
}

#[test]
fn unconfigured_builder_is_config_error() {
    assert!(matches!(index().run(), Err(UmodexError::MissingRoot)));

    let dir = setup_game_dir();
    assert!(matches!(
        index().root(dir.path()).run(),
        Err(UmodexError::MissingTool)
    ));
}

#[test]
fn index_is_shareable_across_readers() {
    let dir = setup_game_dir();
    let report = index()
        .root(dir.path())
        .lister(FixtureLister::new())
        .run()
        .unwrap();
    let idx = &report.index;

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| SearchEngine::new(idx).search("o")))
            .collect();
        let first = SearchEngine::new(idx).search("o");
        for h in handles {
            assert_eq!(h.join().unwrap(), first);
        }
    });
}
