//! System tool probing.

mod probe;

pub use probe::{PathProbe, ProbeError, SystemProbe, install_hint, tool_version};
