//! Process primitives shared by installers, the validator and the executor.
//!
//! - `launcher` - `ProcessLauncher` trait and the tokio implementation
//! - `shutdown` - `TerminationPolicy` (signal, grace, kill, reap)
//! - `lines` / `stream` - line-buffered output readers and stderr capture
//! - `run` - run to completion under a deadline
//! - `path` - effective `PATH` for children
//! - `pid` - process existence checks

mod launcher;
mod lines;
mod path;
mod pid;
mod run;
mod shutdown;
mod stream;

pub use launcher::{LaunchSpec, ProcessLauncher, TokioLauncher};
pub use lines::LineBuffer;
pub use path::{build_effective_path, effective_path_from};
pub use pid::pid_exists;
pub use run::{CommandOutcome, RunError, run_streaming};
pub use shutdown::TerminationPolicy;
pub use stream::{OutputLine, OutputSource, StderrTail, spawn_line_reader};
