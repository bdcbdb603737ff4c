//! Shared fixtures: stub package managers written as shell scripts.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use provisio_core::paths::ProviderPaths;
use provisio_core::{InstallConfig, InstallationProgress, ProgressReporter, ToolchainConfig};
use provisio_runtime::{EnvironmentManager, TokioLauncher};

/// Write an executable `#!/bin/sh` script.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// npm stub: prints registry chatter, creates `node_modules` in the prefix.
pub fn stub_npm(dir: &Path, exit_code: i32) -> PathBuf {
    write_script(
        dir,
        "npm",
        &format!(
            r#"prefix=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--prefix" ]; then prefix="$2"; shift; fi
  shift
done
echo "npm http fetch GET 200 https://registry.npmjs.org/pkg 12ms"
echo "npm http fetch GET 200 https://registry.npmjs.org/dep 8ms"
if [ {exit_code} -ne 0 ]; then echo "npm ERR! code E404" >&2; exit {exit_code}; fi
mkdir -p "$prefix/node_modules/.bin"
echo "added 1 package in 1s"
exit 0"#
        ),
    )
}

/// Python stub that can create a "venv" (a copy of itself) and fake pip.
///
/// Every venv creation appends a line to `<dir>/venv.log`.
pub fn stub_python(dir: &Path) -> PathBuf {
    let log = dir.join("venv.log");
    write_script(
        dir,
        "python3",
        &format!(
            r#"if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  mkdir -p "$3/bin"
  cp "$0" "$3/bin/python"
  chmod 755 "$3/bin/python"
  echo created >> "{log}"
  exit 0
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
  for last; do :; done
  echo "Collecting $last"
  echo "  Downloading $last-1.0-py3-none-any.whl (10 kB)"
  echo "Installing collected packages: $last"
  echo "Successfully installed $last-1.0"
  exit 0
fi
exit 0"#,
            log = log.display()
        ),
    )
}

/// cargo stub: "builds" the last argument into `<root>/bin/<name>`.
pub fn stub_cargo(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "cargo",
        r#"root=""
name=""
while [ $# -gt 0 ]; do
  case "$1" in
    --root) root="$2"; shift ;;
    --git) shift ;;
    install) ;;
    *) name="$1" ;;
  esac
  shift
done
echo "    Updating crates.io index" >&2
echo "   Compiling $name v0.1.0" >&2
echo "    Finished release [optimized] target(s) in 1.00s" >&2
mkdir -p "$root/bin"
printf '#!/bin/sh\nexit 0\n' > "$root/bin/$name"
chmod 755 "$root/bin/$name"
echo "  Installed package \`$name v0.1.0\`" >&2
exit 0"#,
    )
}

pub fn toolchain(bin: &Path) -> ToolchainConfig {
    ToolchainConfig {
        node: bin.join("node").display().to_string(),
        npm: bin.join("npm").display().to_string(),
        npx: bin.join("npx").display().to_string(),
        python: bin.join("python3").display().to_string(),
        cargo: bin.join("cargo").display().to_string(),
        git: bin.join("git").display().to_string(),
    }
}

pub fn manager(root: &Path, bin: &Path, timeout_ms: u64) -> Arc<EnvironmentManager> {
    Arc::new(EnvironmentManager::new(
        ProviderPaths::new(root),
        toolchain(bin),
        InstallConfig {
            timeout_ms,
            kill_grace_ms: 200,
        },
        Arc::new(TokioLauncher),
    ))
}

/// Records every progress event.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<InstallationProgress>>,
}

impl RecordingReporter {
    pub fn percentages(&self) -> Vec<u8> {
        self.events.lock().unwrap().iter().map(|e| e.percentage).collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, progress: &InstallationProgress) {
        self.events.lock().unwrap().push(progress.clone());
    }
}
