use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::borrow::Cow;
use std::time::Duration;

/// A RAII struct that automatically finishes the spinner when dropped.
pub struct Spinner<'a> {
    /// The global progress bar collection that's integrated with the logger.
    global_progress: &'a MultiProgress,
    /// The progress bar for this spinner.
    spinner: ProgressBar,
}

impl<'a> Spinner<'a> {
    /// Create a new "dots" spinner shown while an upload is in flight. Hooked
    /// into the global progress bar collection, which is integrated with the
    /// logger.
    pub fn new(global_progress: &'a MultiProgress) -> Self {
        let spinner = global_progress.add(ProgressBar::new_spinner());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.blue} {msg} {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&[
                    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓",
                ]),
        );
        Self {
            global_progress,
            spinner,
        }
    }

    pub fn set_message(&self, message: impl Into<Cow<'static, str>>) {
        self.spinner.set_message(message);
    }
}

impl Drop for Spinner<'_> {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
        self.global_progress.remove(&self.spinner);
    }
}
