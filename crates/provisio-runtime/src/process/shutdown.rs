//! Termination strategy for spawned children: graceful signal, grace window,
//! forced kill, reap.
//!
//! Every component uses the same policy and differs only in the length of
//! the grace window. Children are started in their own process group on Unix
//! so wrappers like `npx` take their grandchildren down with them.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tracing::debug;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Graceful-then-forced termination with a configurable grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationPolicy {
    grace: Duration,
}

impl TerminationPolicy {
    pub const fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// Skip the graceful signal and kill straight away.
    pub const fn immediate() -> Self {
        Self {
            grace: Duration::ZERO,
        }
    }

    pub const fn grace(&self) -> Duration {
        self.grace
    }

    /// Terminate `child` and wait until it has been reaped.
    ///
    /// Safe to call on a child that already exited.
    pub async fn terminate(&self, child: &mut Child) -> io::Result<ExitStatus> {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        #[cfg(unix)]
        {
            self.terminate_unix(child).await
        }

        #[cfg(not(unix))]
        {
            child.kill().await?;
            child.wait().await
        }
    }

    #[cfg(unix)]
    async fn terminate_unix(&self, child: &mut Child) -> io::Result<ExitStatus> {
        let pgid = child_pgid(child);

        if !self.grace.is_zero() && kill_group(pgid, Signal::SIGTERM) {
            if let Ok(result) = tokio::time::timeout(self.grace, child.wait()).await {
                kill_group(pgid, Signal::SIGKILL);
                return result;
            }
            debug!(grace_ms = self.grace.as_millis(), "child ignored SIGTERM, escalating");
        }

        kill_group(pgid, Signal::SIGKILL);
        // start_kill fails only if the child was already reaped.
        let _ = child.start_kill();
        child.wait().await
    }
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(unix)]
fn child_pgid(child: &Child) -> Option<Pid> {
    child
        .id()
        .and_then(|pid| i32::try_from(pid).ok())
        .map(Pid::from_raw)
}

/// Signal the child's process group. Returns whether the signal was delivered.
#[cfg(unix)]
fn kill_group(pgid: Option<Pid>, sig: Signal) -> bool {
    let Some(pgid) = pgid else {
        return false;
    };
    match signal::killpg(pgid, sig) {
        Ok(()) => true,
        Err(nix::errno::Errno::ESRCH) => false,
        Err(e) => {
            debug!(pgid = %pgid, signal = ?sig, error = %e, "killpg failed, signalling leader only");
            signal::kill(pgid, sig).is_ok()
        }
    }
}
