//! Terminal progress rendering for installs.

use indicatif::{ProgressBar, ProgressStyle};
use provisio_core::{InstallStatus, InstallationProgress, ProgressReporter};

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos:>3}% {msg}";

/// Renders install progress as a single percentage bar.
///
/// With `show_logs`, package-manager output lines are printed above the bar.
pub struct CliProgress {
    bar: ProgressBar,
    show_logs: bool,
}

impl CliProgress {
    pub fn new(show_logs: bool) -> Self {
        Self::with_bar(ProgressBar::new(100), show_logs)
    }

    /// Reporter that draws nothing, for non-interactive use and tests.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden(), false)
    }

    fn with_bar(bar: ProgressBar, show_logs: bool) -> Self {
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        Self { bar, show_logs }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl ProgressReporter for CliProgress {
    fn report(&self, progress: &InstallationProgress) {
        if self.show_logs {
            for line in progress.logs.iter().flatten() {
                self.bar.println(format!("  {line}"));
            }
        }

        // The bar never moves backwards, even if a reporter upstream does.
        let percentage = u64::from(progress.percentage).max(self.bar.position());
        self.bar.set_position(percentage);

        match progress.status {
            InstallStatus::Completed => self.bar.finish_with_message(progress.message.clone()),
            InstallStatus::Failed => self.bar.abandon_with_message(progress.message.clone()),
            _ => self.bar.set_message(progress.message.clone()),
        }
    }
}
