use std::path::Path;
use std::sync::{Arc, LazyLock};

use encoding_rs::WINDOWS_1252;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::error::ExtractError;
use crate::model::Package;
use crate::traits::Lister;

/// Type tokens that describe grouping metadata rather than real assets.
pub const EXCLUDED_TYPES: [&str; 3] = ["Package", "ConstantColor", "VertexColor"];

// ordinal, offset (hex), size (hex), type, name
static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+\d+\s+([A-Fa-f0-9]+)\s+([A-Fa-f0-9]+)\s+(\w+)\s+(.+)$")
        .expect("row pattern is valid")
});

// Looks like a table row but may not match `ROW`.
static ROW_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+\d+\s").expect("row-like pattern is valid"));

/// Outcome of listing one package.
///
/// `package` is always present, possibly empty. `error` distinguishes a
/// failed listing from a package that legitimately holds no assets.
#[derive(Debug)]
pub struct Extraction {
    pub package: Package,
    pub error: Option<ExtractError>,
}

impl Extraction {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Turns `-list` reports into [`Package`]s.
#[derive(Clone)]
pub struct Extractor {
    lister: Arc<dyn Lister>,
}

impl Extractor {
    pub fn new(lister: Arc<dyn Lister>) -> Self {
        Self { lister }
    }

    /// List `path` and parse the report.
    ///
    /// Never fails outright. A non-zero exit keeps whatever rows were parsed
    /// and sets [`ExtractError::NonZeroExit`]; a clean exit with no table rows
    /// at all sets [`ExtractError::NoRecords`].
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn extract(&self, path: &Path) -> Extraction {
        let mut package = Package::from_path(path);

        let output = match self.lister.list(path) {
            Ok(output) => output,
            Err(error) => {
                warn!(%error, "listing failed");
                return Extraction {
                    package,
                    error: Some(error),
                };
            }
        };

        let report = decode_report(&output.stdout);
        let rows = parse_report(&mut package, &report);
        debug!(rows, records = package.len(), "parsed report");

        let error = if !output.success() {
            Some(ExtractError::NonZeroExit { code: output.code })
        } else if rows == 0 {
            Some(ExtractError::NoRecords)
        } else {
            None
        };

        Extraction { package, error }
    }
}

/// Decode umodel's Windows-1252 output and strip carriage returns.
pub fn decode_report(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.replace('\r', "")
}

/// Add every non-excluded row of `report` to `package`.
///
/// Returns the number of lines that matched the row pattern, excluded types
/// included, so callers can tell "no table" from "only grouping entries".
pub fn parse_report(package: &mut Package, report: &str) -> usize {
    let mut rows = 0;

    for line in report.lines() {
        let Some(caps) = ROW.captures(line) else {
            if ROW_LIKE.is_match(line) {
                debug!(line, "unrecognised table row");
            }
            continue;
        };
        rows += 1;

        let kind = &caps[3];
        if EXCLUDED_TYPES.contains(&kind) {
            continue;
        }

        let size = match u64::from_str_radix(&caps[2], 16) {
            Ok(size) => size,
            Err(_) => {
                debug!(line, "size out of range");
                continue;
            }
        };

        package.insert(&caps[4], kind, size);
    }

    rows
}
