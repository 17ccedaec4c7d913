use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discovery::check_root;
use crate::error::UmodexError;
use crate::tool::UModelTool;

/// Default location of the persisted configuration, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Persisted settings: where umodel lives and which directory to scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub umodel_path: Option<PathBuf>,

    #[serde(default)]
    pub root_path: Option<PathBuf>,
}

impl Config {
    /// Read `path`. A missing file yields an empty config.
    pub fn load(path: &Path) -> Result<Self, UmodexError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(UmodexError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&text).map_err(|source| UmodexError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), UmodexError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| UmodexError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| UmodexError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The root to scan: `flag` if given, else the configured one.
    pub fn resolve_root(&self, flag: Option<PathBuf>) -> Result<PathBuf, UmodexError> {
        flag.or_else(|| self.root_path.clone())
            .ok_or(UmodexError::MissingRoot)
    }

    /// The umodel executable: `flag` if given, else the configured one.
    pub fn resolve_tool(&self, flag: Option<PathBuf>) -> Result<PathBuf, UmodexError> {
        flag.or_else(|| self.umodel_path.clone())
            .ok_or(UmodexError::MissingTool)
    }

    /// Check that the tool is really umodel and the root is a readable directory.
    pub fn validate(tool: &Path, root: &Path) -> Result<(), UmodexError> {
        UModelTool::new(tool).check_version()?;
        check_root(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn reads_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"umodel_path": "C:/umodel.exe", "root_path": null}"#).unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.umodel_path, Some(PathBuf::from("C:/umodel.exe")));
        assert_eq!(cfg.root_path, None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cfg = Config {
            umodel_path: Some("/opt/umodel".into()),
            root_path: Some("/games/ro".into()),
        };
        cfg.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(UmodexError::Config { .. })));
    }

    #[test]
    fn flag_overrides_configured_root() {
        let cfg = Config {
            umodel_path: None,
            root_path: Some("/games/ro".into()),
        };
        assert_eq!(cfg.resolve_root(Some("/mods".into())).unwrap(), PathBuf::from("/mods"));
        assert_eq!(cfg.resolve_root(None).unwrap(), PathBuf::from("/games/ro"));
        assert!(matches!(
            Config::default().resolve_root(None),
            Err(UmodexError::MissingRoot)
        ));
        assert!(matches!(
            Config::default().resolve_tool(None),
            Err(UmodexError::MissingTool)
        ));
    }
}
