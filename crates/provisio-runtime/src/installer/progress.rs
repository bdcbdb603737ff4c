//! Heuristic install progress from package-manager output.
//!
//! Percentages are UX hints only. The estimator guarantees they never
//! decrease and that the status never moves backwards.

use provisio_core::{InstallStatus, InstallationProgress};

/// Percentage reported when the package manager starts.
const START: u8 = 10;
/// Ceiling while output is still arriving; 100 is reserved for completion.
const CEILING: u8 = 95;

const DOWNLOAD_MARKERS: &[&str] = &[
    "fetch",
    "download",
    "collecting",
    "resolving",
    "updating",
    "cloning",
    "http",
];
const INSTALL_MARKERS: &[&str] = &[
    "extract",
    "installing",
    "compiling",
    "building",
    "reify",
    "linking",
];
const DONE_MARKERS: &[&str] = &[
    "finished",
    "successfully installed",
    "installed package",
    "added ",
    "up to date",
];

#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    status: InstallStatus,
    percentage: u8,
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self {
            status: InstallStatus::Downloading,
            percentage: START,
        }
    }
}

impl ProgressEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event announcing the start of the package manager.
    pub fn started(&self, message: impl Into<String>) -> InstallationProgress {
        InstallationProgress::new(self.status, message, self.percentage)
    }

    /// Fold one output line into the estimate and return the event to report.
    pub fn observe(&mut self, line: &str) -> InstallationProgress {
        let lower = line.to_ascii_lowercase();
        let contains_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

        let (status, target) = if contains_any(DONE_MARKERS) {
            (InstallStatus::Installing, CEILING)
        } else if contains_any(INSTALL_MARKERS) {
            // Long builds print many "Compiling" lines; creep forward on each.
            (InstallStatus::Installing, self.percentage.max(50).saturating_add(1))
        } else if contains_any(DOWNLOAD_MARKERS) {
            (InstallStatus::Downloading, self.percentage.max(20).saturating_add(1).min(45))
        } else {
            (self.status, self.percentage)
        };

        if rank(status) > rank(self.status) {
            self.status = status;
        }
        self.percentage = self.percentage.max(target.min(CEILING));

        InstallationProgress::new(self.status, line.trim(), self.percentage)
            .with_logs(vec![line.to_string()])
    }

    pub const fn percentage(&self) -> u8 {
        self.percentage
    }

    pub const fn status(&self) -> InstallStatus {
        self.status
    }
}

const fn rank(status: InstallStatus) -> u8 {
    match status {
        InstallStatus::CheckingDependencies => 0,
        InstallStatus::Downloading => 1,
        InstallStatus::Installing => 2,
        InstallStatus::Validating => 3,
        InstallStatus::Completed | InstallStatus::Failed => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_over_mixed_output() {
        let output = [
            "npm http fetch GET 200 https://registry.npmjs.org/pkg",
            "Compiling serde v1.0.0",
            "npm http fetch GET 200 https://registry.npmjs.org/late",
            "some unrelated line",
            "Finished release [optimized] target(s)",
            "Downloading something after finishing",
        ];
        let mut est = ProgressEstimator::new();
        let mut last = est.percentage();
        let mut last_rank = rank(est.status());
        for line in output {
            let event = est.observe(line);
            assert!(event.percentage >= last);
            assert!(rank(event.status) >= last_rank);
            assert!(event.percentage < 100);
            last = event.percentage;
            last_rank = rank(event.status);
        }
        assert_eq!(est.status(), InstallStatus::Installing);
    }

    #[test]
    fn test_event_carries_line_as_log() {
        let mut est = ProgressEstimator::new();
        let event = est.observe("Collecting mcp-server-git\n");
        assert_eq!(event.message, "Collecting mcp-server-git");
        assert_eq!(event.logs.as_deref().map(<[String]>::len), Some(1));
    }
}
