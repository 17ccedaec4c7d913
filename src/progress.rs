use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::traits::Progress;

const TEMPLATE: &str = "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}";

/// Terminal progress bar for an indexing run, labelled with the package just finished.
///
/// Draws to stderr and stays silent when stderr is not a terminal.
#[derive(Clone)]
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    pub fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━━─");
        bar.set_style(style);
        Self { bar }
    }

    /// Remove the bar so the summary prints on a clean line.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ProgressDisplay {
    fn on_complete(&self, done: usize, total: usize, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
        self.bar.set_message(name);
    }
}
