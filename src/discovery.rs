use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ignore::{DirEntry, WalkBuilder, WalkState};
use tracing::{debug, instrument, warn};

use crate::error::UmodexError;

/// Package extensions worth listing. Compared case-sensitively.
pub const PACKAGE_EXTENSIONS: [&str; 4] = ["utx", "ukx", "usx", "uax"];

/// Package files found under a root, plus the subdirectories that could not be read.
#[derive(Debug, Default)]
pub struct Discovered {
    /// Sorted for reproducible runs; callers must not depend on it.
    pub paths: Vec<PathBuf>,
    pub errors: Vec<UmodexError>,
}

/// Whether `path` carries one of the [`PACKAGE_EXTENSIONS`].
pub fn is_package(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| PACKAGE_EXTENSIONS.contains(&ext))
}

/// Fail unless `root` is an existing, readable directory.
pub fn check_root(root: &Path) -> Result<(), UmodexError> {
    let meta = fs::metadata(root).map_err(|e| map_io_error(root, e))?;
    if !meta.is_dir() {
        return Err(UmodexError::NotADirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|e| map_io_error(root, e))?;
    Ok(())
}

/// Recursively collect every package file under `root`.
///
/// A missing or unreadable root is fatal. Anything that goes wrong further
/// down is logged, collected into [`Discovered::errors`] and skipped.
#[instrument(skip(root), fields(root = %root.display()))]
pub fn discover(root: &Path, threads: usize) -> Result<Discovered, UmodexError> {
    check_root(root)?;

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .threads(threads)
        .build_parallel();

    let paths = Arc::new(Mutex::new(Vec::<PathBuf>::new()));
    let errors = Arc::new(Mutex::new(Vec::<UmodexError>::new()));

    walker.run(|| {
        let paths = Arc::clone(&paths);
        let errors = Arc::clone(&errors);

        Box::new(move |res: Result<DirEntry, ignore::Error>| -> WalkState {
            let entry = match res {
                Ok(e) => e,
                Err(e) => {
                    let err = map_ignore_error(e);
                    warn!(error = %err, "skipping unreadable entry");
                    if let Ok(mut errs) = errors.lock() {
                        errs.push(err);
                    }
                    return WalkState::Continue;
                }
            };

            let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
            if is_file && is_package(entry.path()) {
                if let Ok(mut p) = paths.lock() {
                    p.push(entry.into_path());
                }
            }

            WalkState::Continue
        })
    });

    let mut paths = Arc::try_unwrap(paths)
        .map_err(|_| UmodexError::ThreadPool("walker still holds results".into()))?
        .into_inner()
        .map_err(|e| UmodexError::ThreadPool(e.to_string()))?;
    let errors = Arc::try_unwrap(errors)
        .map_err(|_| UmodexError::ThreadPool("walker still holds errors".into()))?
        .into_inner()
        .map_err(|e| UmodexError::ThreadPool(e.to_string()))?;

    paths.sort();
    debug!(packages = paths.len(), errors = errors.len(), "discovery finished");

    Ok(Discovered { paths, errors })
}

fn map_io_error(path: &Path, e: std::io::Error) -> UmodexError {
    match e.kind() {
        ErrorKind::NotFound => UmodexError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => UmodexError::PermissionDenied(path.to_path_buf()),
        _ => UmodexError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

fn map_ignore_error(e: ignore::Error) -> UmodexError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => map_io_error(&path, io_err),
            other => UmodexError::Walk(format!("{}: {}", path.display(), other)),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => UmodexError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => UmodexError::Walk(io_err.to_string()),
        other => UmodexError::Walk(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list_is_case_sensitive() {
        assert!(is_package(Path::new("Textures/Weapons.utx")));
        assert!(is_package(Path::new("Maps.usx")));
        assert!(!is_package(Path::new("Weapons.UTX")));
        assert!(!is_package(Path::new("Weapons.u")));
        assert!(!is_package(Path::new("utx")));
    }

    #[test]
    fn finds_packages_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Textures/Sub")).unwrap();
        fs::write(root.join("Textures/Weapons.utx"), b"").unwrap();
        fs::write(root.join("Textures/Sub/Deep.ukx"), b"").unwrap();
        fs::write(root.join("Sounds.uax"), b"").unwrap();
        fs::write(root.join("System.ini"), b"").unwrap();
        fs::write(root.join("Shout.UAX"), b"").unwrap();

        let found = discover(root, 2).unwrap();
        let names: Vec<_> = found
            .paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"Weapons.utx".to_string()));
        assert!(names.contains(&"Deep.ukx".to_string()));
        assert!(names.contains(&"Sounds.uax".to_string()));
        assert!(found.errors.is_empty());
    }

    #[test]
    fn pathless_walk_error_has_no_path() {
        let err = map_ignore_error(ignore::Error::Io(std::io::Error::other("device gone")));
        assert!(matches!(err, UmodexError::Walk(_)));
        assert_eq!(err.path(), None);
        assert!(err.is_recoverable());
    }

    #[test]
    fn io_error_with_path_keeps_it() {
        let err = map_ignore_error(ignore::Error::WithPath {
            path: PathBuf::from("/ro/Locked"),
            err: Box::new(ignore::Error::Io(std::io::Error::from(ErrorKind::PermissionDenied))),
        });
        assert!(matches!(err, UmodexError::PermissionDenied(_)));
        assert_eq!(err.path(), Some(&PathBuf::from("/ro/Locked")));
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&dir.path().join("nope"), 1).unwrap_err();
        assert!(matches!(err, UmodexError::NotFound(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn file_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Maps.usx");
        fs::write(&file, b"").unwrap();
        assert!(matches!(
            discover(&file, 1),
            Err(UmodexError::NotADirectory(_))
        ));
    }
}
