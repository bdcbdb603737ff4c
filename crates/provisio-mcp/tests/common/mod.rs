//! Shared fixtures: shell-script MCP providers and a spawn-recording launcher.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use provisio_core::{
    EnvironmentKind, ExecutionConfig, InstallEnvironment, InstallationProgress, ProgressReporter,
    ValidationConfig,
};
use provisio_runtime::{LaunchSpec, ProcessLauncher, TokioLauncher};
use tokio::process::Child;

pub const INIT_OK: &str = r#"{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","capabilities":{"tools":{}},"serverInfo":{"name":"stub"}}}"#;
pub const TOOLS_AB: &str = r#"{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"a","description":"first"},{"name":"b"}]}}"#;
pub const WEATHER_TOOLS: &str = r#"{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"get_weather","description":"Current weather","inputSchema":{"type":"object","properties":{"city":{"type":"string"}},"required":["city"]}}]}}"#;
pub const CALL_OK: &str = r#"{"jsonrpc":"2.0","id":2,"result":{"content":[{"type":"text","text":"sunny, 21C"}]}}"#;

/// Write an executable `#!/bin/sh` script.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A provider that answers each request method with a fixed line.
///
/// Responses are written verbatim, so they may be broken or carry any id.
/// Requests for methods without a response are ignored.
pub fn write_provider(
    dir: &Path,
    name: &str,
    on_initialize: &str,
    on_list: Option<&str>,
    on_call: Option<&str>,
) -> PathBuf {
    let reply = |response: Option<&str>| {
        response.map_or_else(
            || ":".to_string(),
            |r| format!("printf '%s\\n' '{r}'"),
        )
    };
    let body = format!(
        r#"while IFS= read -r line; do
  case "$line" in
    *'"method":"initialize"'*) {init} ;;
    *'"method":"tools/list"'*) {list} ;;
    *'"method":"tools/call"'*) {call} ;;
  esac
done"#,
        init = reply(Some(on_initialize)),
        list = reply(on_list),
        call = reply(on_call),
    );
    write_script(dir, name, &body)
}

/// A well-behaved provider exposing the `get_weather` tool.
pub fn weather_provider(dir: &Path, name: &str) -> PathBuf {
    write_provider(dir, name, INIT_OK, Some(WEATHER_TOOLS), Some(CALL_OK))
}

pub fn environment(executable: &Path) -> InstallEnvironment {
    let root = executable.parent().unwrap();
    InstallEnvironment::new(
        EnvironmentKind::Rust,
        root,
        executable.display().to_string(),
        Vec::new(),
    )
}

pub fn validation_config() -> ValidationConfig {
    ValidationConfig {
        timeout_ms: 5_000,
        settle_delay_ms: 50,
        simple_timeout_ms: 300,
        early_exit_threshold_ms: 1_000,
        kill_grace_ms: 200,
        fallback_enabled: true,
    }
}

pub fn execution_config() -> ExecutionConfig {
    ExecutionConfig {
        timeout_ms: 5_000,
        settle_delay_ms: 50,
        kill_grace_ms: 200,
    }
}

/// Spawns through [`TokioLauncher`] and remembers every child pid.
#[derive(Default)]
pub struct RecordingLauncher {
    pids: Mutex<Vec<u32>>,
    spawns: Mutex<usize>,
}

impl RecordingLauncher {
    pub fn spawn_count(&self) -> usize {
        *self.spawns.lock().unwrap()
    }

    pub fn pids(&self) -> Vec<u32> {
        self.pids.lock().unwrap().clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, spec: &LaunchSpec) -> io::Result<Child> {
        *self.spawns.lock().unwrap() += 1;
        let child = TokioLauncher.launch(spec)?;
        if let Some(pid) = child.id() {
            self.pids.lock().unwrap().push(pid);
        }
        Ok(child)
    }
}

/// Records every progress event.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<InstallationProgress>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<InstallationProgress> {
        self.events.lock().unwrap().clone()
    }

    pub fn assert_monotonic(&self) {
        let percentages: Vec<u8> = self.events().iter().map(|e| e.percentage).collect();
        assert!(!percentages.is_empty());
        assert!(
            percentages.windows(2).all(|w| w[0] <= w[1]),
            "progress went backwards: {percentages:?}"
        );
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, progress: &InstallationProgress) {
        self.events.lock().unwrap().push(progress.clone());
    }
}

/// npm stub: creates `node_modules/.bin` under `--prefix` and prints
/// registry chatter. Sleeps `delay` seconds first.
pub fn stub_npm(dir: &Path, delay: &str) -> PathBuf {
    write_script(
        dir,
        "npm",
        &format!(
            r#"prefix=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--prefix" ]; then prefix="$2"; shift; fi
  shift
done
sleep {delay}
echo "npm http fetch GET 200 https://registry.npmjs.org/weather-mcp 14ms"
mkdir -p "$prefix/node_modules/.bin"
echo "added 1 package in 1s""#
        ),
    )
}

/// Finds only the listed tools, matched by file name.
pub struct StubProbe {
    available: Vec<&'static str>,
}

impl StubProbe {
    pub fn with(available: &[&'static str]) -> Self {
        Self {
            available: available.to_vec(),
        }
    }
}

impl provisio_runtime::SystemProbe for StubProbe {
    fn find(&self, tool: &str) -> Option<PathBuf> {
        let name = Path::new(tool).file_name()?.to_str()?;
        self.available.contains(&name).then(|| PathBuf::from(tool))
    }
}
