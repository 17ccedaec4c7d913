//! # umodex
//!
//! Parallel asset indexer for Unreal Engine packages.
//!
//! umodex walks a game directory for package files (`.utx`, `.ukx`, `.usx`,
//! `.uax`), lists each one through [umodel](https://www.gildor.org/en/projects/umodel)'s
//! `-list` report on a bounded pool of workers, and aggregates the records
//! into an [`Index`] that [`SearchEngine`] queries by name.
//!
//! A package whose listing fails never stops the run: it is recorded in
//! [`IndexReport::failures`] and every other package is still indexed.
//!
//! # Quick Start
//!
//! ```rust
//! use std::path::Path;
//! use umodex::{ExtractError, ListOutput, Lister, SearchEngine};
//!
//! // Stands in for umodel: every package holds one texture.
//! struct OneTexture;
//!
//! impl Lister for OneTexture {
//!     fn list(&self, _path: &Path) -> Result<ListOutput, ExtractError> {
//!         Ok(ListOutput {
//!             stdout: b"    0    1A3F    400 Texture Grip\r\n".to_vec(),
//!             code: Some(0),
//!         })
//!     }
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("Weapons.utx"), b"").unwrap();
//!
//! let report = umodex::index()
//!     .root(dir.path())
//!     .lister(OneTexture)
//!     .run()
//!     .unwrap();
//!
//! let hits = SearchEngine::new(&report.index).search("grip");
//! assert_eq!(hits[0].identifier, "Texture'Weapons.Grip'");
//! assert_eq!(hits[0].size_bytes, 1024);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod discovery;
pub mod extractor;
pub mod progress;
pub mod repl;
pub mod size;
pub mod tool;

mod builder;
mod engine;
mod error;
mod model;
mod results;
mod search;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{IndexBuilder, DEFAULT_THREADS};
pub use config::Config;
pub use error::{ExtractError, ExtractionFailure, UmodexError};
pub use extractor::{Extraction, Extractor};
pub use model::{Package, Record};
pub use progress::ProgressDisplay;
pub use results::{Index, IndexReport, ScanStats};
pub use search::{Hit, SearchEngine};
pub use tool::UModelTool;
pub use traits::{ListOutput, Lister, Progress};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`IndexBuilder`] to configure and run an indexing pass.
pub fn index() -> IndexBuilder {
    IndexBuilder::default()
}
