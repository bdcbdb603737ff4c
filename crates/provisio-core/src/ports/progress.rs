//! Progress reporting port for installs.

use crate::domain::InstallationProgress;

/// Receives install progress events.
///
/// Events arrive in order. Percentages never decrease within one install,
/// and the last event has a terminal status.
///
/// # Implementations
///
/// - `NoopProgress` - discards everything
/// - Any `Fn(&InstallationProgress)` closure
/// - Adapter-specific renderers (terminal progress bars, event streams)
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: &InstallationProgress);
}

/// A progress reporter that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _progress: &InstallationProgress) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(&InstallationProgress) + Send + Sync,
{
    fn report(&self, progress: &InstallationProgress) {
        self(progress);
    }
}
