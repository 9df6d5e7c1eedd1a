//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements [`ProgressCallback`]
//! to display progress bars on stderr while roots are walked and files are
//! hashed. Phases are named [`PHASE_WALKING`] and [`PHASE_HASHING`].

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Phase name used while directory roots are walked.
pub const PHASE_WALKING: &str = "walking";

/// Phase name used while file contents are hashed.
pub const PHASE_HASHING: &str = "hashing";

/// Progress callback for the scan pipeline.
///
/// Implement this trait to receive progress updates from the finder.
/// Callbacks may be invoked concurrently from worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_WALKING`] or [`PHASE_HASHING`])
    /// * `total` - Total number of items to process, 0 if unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called when work on an item begins.
    ///
    /// # Arguments
    ///
    /// * `current` - Item number, or a count for the walking phase
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been processed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use linkdupe::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let multi = MultiProgress::new();
        if quiet {
            multi.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self {
            multi,
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn set_bar(slot: &Mutex<Option<ProgressBar>>, bar: Option<ProgressBar>) {
        if let Ok(mut guard) = slot.lock() {
            *guard = bar;
        }
    }

    fn with_bar(slot: &Mutex<Option<ProgressBar>>, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = slot.lock() {
            if let Some(ref pb) = *guard {
                f(pb);
            }
        }
    }

    fn take_bar(slot: &Mutex<Option<ProgressBar>>) -> Option<ProgressBar> {
        slot.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALKING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directories");
                pb.enable_steady_tick(Duration::from_millis(100));
                Self::set_bar(&self.walking, Some(pb));
            }
            PHASE_HASHING => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message("Hashing");
                Self::set_bar(&self.hashing, Some(pb));
            }
            other => log::debug!("Unknown progress phase: {}", other),
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        let message = truncate_path(path, 30);
        Self::with_bar(&self.walking, |pb| {
            pb.inc(current as u64);
            pb.set_message(message.clone());
        });
        Self::with_bar(&self.hashing, |pb| pb.set_message(message.clone()));
    }

    fn on_item_completed(&self, _bytes: u64) {
        Self::with_bar(&self.hashing, |pb| pb.inc(1));
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let (slot, done) = match phase {
            PHASE_WALKING => (&self.walking, "Walking complete"),
            PHASE_HASHING => (&self.hashing, "Hashing complete"),
            _ => return,
        };
        if let Some(pb) = Self::take_bar(slot) {
            pb.finish_with_message(done);
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let chars: Vec<char> = file_name.chars().collect();
    if chars.len() + 3 >= max_len {
        let tail: String = chars[chars.len().saturating_sub(max_len - 3)..].iter().collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
