use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// One asset archive on disk (`.utx`, `.ukx`, `.usx`, `.uax`).
///
/// A package owns its records exclusively. Records are keyed by name, so a
/// later record with the same name replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// File base name with the extension stripped, e.g. `Weapons` for `Weapons.utx`.
    pub name: String,

    /// Records keyed by record name.
    pub records: HashMap<String, Record>,
}

impl Package {
    /// An empty package with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: HashMap::new(),
        }
    }

    /// An empty package named after `path`'s file stem.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name)
    }

    /// Insert a record built from the given fields, replacing any record of the same name.
    pub fn insert(&mut self, name: impl Into<String>, kind: impl Into<String>, size_bytes: u64) {
        let record = Record {
            package: self.name.clone(),
            name: name.into(),
            kind: kind.into(),
            size_bytes,
        };
        self.records.insert(record.name.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A named entry inside a [`Package`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Name of the owning package. Only used to render [`Record::identifier`].
    pub package: String,

    /// Record name as printed by umodel. May contain any character.
    pub name: String,

    /// Type token, e.g. `Texture` or `StaticMesh`.
    pub kind: String,

    /// Export size in bytes.
    pub size_bytes: u64,
}

impl Record {
    /// `type'package.name'`, the form the engine uses to reference objects.
    pub fn identifier(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{}.{}'", self.kind, self.package, self.name)
    }
}
