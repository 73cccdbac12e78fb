//! Transfer and checkout progress reporting.
//!
//! libgit2 reports progress through two hooks: transfer progress while
//! objects are received and indexed, and checkout progress while files are
//! written. Both feed the same [`ProgressData`] so a single status line shows
//! network, index and checkout state together.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgressData {
    pub received_bytes: usize,
    pub received_objects: usize,
    pub indexed_objects: usize,
    pub total_objects: usize,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub path: Option<PathBuf>,
}

impl ProgressData {
    pub fn set_transfer(
        &mut self,
        received_bytes: usize,
        received_objects: usize,
        indexed_objects: usize,
        total_objects: usize,
    ) {
        self.received_bytes = received_bytes;
        self.received_objects = received_objects;
        self.indexed_objects = indexed_objects;
        self.total_objects = total_objects;
    }

    pub fn set_checkout(&mut self, path: Option<&Path>, completed: usize, total: usize) {
        self.completed_steps = completed;
        self.total_steps = total;
        self.path = path.map(Path::to_path_buf);
    }

    pub fn network_percent(&self) -> usize {
        percent(self.received_objects, self.total_objects)
    }

    pub fn index_percent(&self) -> usize {
        percent(self.indexed_objects, self.total_objects)
    }

    pub fn checkout_percent(&self) -> usize {
        percent(self.completed_steps, self.total_steps)
    }

    pub fn render(&self) -> String {
        let path = self
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        format!(
            "net {:3}% ({:4} kb, {:5}/{:5})  /  idx {:3}% ({:5}/{:5})  /  chk {:3}% ({:4}/{:4}) {}",
            self.network_percent(),
            self.received_bytes / 1024,
            self.received_objects,
            self.total_objects,
            self.index_percent(),
            self.indexed_objects,
            self.total_objects,
            self.checkout_percent(),
            self.completed_steps,
            self.total_steps,
            path
        )
        .trim_end()
        .to_string()
    }
}

fn percent(done: usize, total: usize) -> usize {
    if total == 0 { 0 } else { 100 * done / total }
}

/// Spinner that shows the current [`ProgressData`] line.
pub struct ProgressReporter {
    bar: ProgressBar,
    data: ProgressData,
}

impl ProgressReporter {
    pub fn new(name: &str, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.blue} {prefix:.bold} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"),
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        };
        bar.set_prefix(name.to_string());
        Self {
            bar,
            data: ProgressData::default(),
        }
    }

    pub fn transfer(&mut self, stats: &git2::Progress<'_>) {
        self.data.set_transfer(
            stats.received_bytes(),
            stats.received_objects(),
            stats.indexed_objects(),
            stats.total_objects(),
        );
        self.bar.set_message(self.data.render());
    }

    pub fn checkout(&mut self, path: Option<&Path>, completed: usize, total: usize) {
        self.data.set_checkout(path, completed, total);
        self.bar.set_message(self.data.render());
    }

    /// Run `f` with the spinner cleared, for prompts and log lines.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }
}
