//! Installer tests against stub package managers.

#![cfg(unix)]

mod common;

use std::time::{Duration, Instant};

use common::{RecordingReporter, manager, stub_cargo, stub_npm, stub_python, write_script};
use provisio_core::{Ecosystem, EcosystemClassification, EnvironmentKind, LaunchConfig};
use provisio_runtime::{InstallError, InstallRequest, installer_for};
use tempfile::tempdir;
use tokio_test::assert_ok;

fn request(id: &str, ecosystem: Ecosystem, config: &LaunchConfig) -> InstallRequest {
    let classification = provisio_core::classify(config);
    assert_eq!(classification.ecosystem, ecosystem);
    InstallRequest::new(id, &classification, config)
}

fn assert_monotonic(percentages: &[u8]) {
    assert!(!percentages.is_empty());
    assert!(percentages.windows(2).all(|w| w[0] <= w[1]), "{percentages:?}");
}

#[tokio::test]
async fn test_js_install_resolves_npx_launch() {
    let tmp = tempdir().unwrap();
    let bin = tmp.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    stub_npm(&bin, 0);

    let envs = manager(&tmp.path().join("providers"), &bin, 10_000);
    let config = LaunchConfig::new("npx", ["-y", "@scope/server-filesystem", "/srv/data"])
        .with_env("TOKEN", "abc");
    let req = request("fs", Ecosystem::Js, &config);

    let reporter = RecordingReporter::default();
    let installer = installer_for(EnvironmentKind::Js, envs.clone());
    let env = assert_ok!(installer.install(&req, &reporter).await);

    assert_eq!(env.kind, EnvironmentKind::Js);
    assert!(env.executable.ends_with("npx"));
    assert!(env.args.contains(&"@scope/server-filesystem".to_string()));
    assert_eq!(env.args.last().map(String::as_str), Some("/srv/data"));
    assert_eq!(env.env.as_ref().unwrap()["TOKEN"], "abc");
    assert!(env.root_path.join("node_modules").is_dir());
    assert_monotonic(&reporter.percentages());
}

#[tokio::test]
async fn test_nonzero_exit_is_fatal() {
    let tmp = tempdir().unwrap();
    let bin = tmp.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    stub_npm(&bin, 1);

    let envs = manager(&tmp.path().join("providers"), &bin, 10_000);
    let config = LaunchConfig::new("npx", ["-y", "missing-pkg"]);
    let req = request("missing", Ecosystem::Js, &config);

    let err = installer_for(EnvironmentKind::Js, envs)
        .install(&req, &RecordingReporter::default())
        .await
        .unwrap_err();

    match err {
        InstallError::CommandFailed {
            code, output_tail, ..
        } => {
            assert_eq!(code, Some(1));
            assert!(output_tail.contains("E404"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_install_timeout_kills_package_manager() {
    let tmp = tempdir().unwrap();
    let bin = tmp.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    write_script(&bin, "npm", "echo fetching; exec sleep 30");

    let envs = manager(&tmp.path().join("providers"), &bin, 300);
    let config = LaunchConfig::new("npx", ["-y", "slow-pkg"]);
    let req = request("slow", Ecosystem::Js, &config);

    let started = Instant::now();
    let err = installer_for(EnvironmentKind::Js, envs)
        .install(&req, &RecordingReporter::default())
        .await
        .unwrap_err();

    assert!(matches!(err, InstallError::TimedOut { .. }));
    assert!(err.is_retryable());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_python_install_uses_venv_interpreter() {
    let tmp = tempdir().unwrap();
    let bin = tmp.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    stub_python(&bin);

    let envs = manager(&tmp.path().join("providers"), &bin, 10_000);
    let config = LaunchConfig::new("uvx", ["mcp-server-git", "--repository", "/repo"]);
    let req = request("git", Ecosystem::Python, &config);

    let reporter = RecordingReporter::default();
    let env = assert_ok!(
        installer_for(EnvironmentKind::Python, envs)
            .install(&req, &reporter)
            .await
    );

    assert!(env.executable.ends_with("venv/bin/python"));
    assert!(std::path::Path::new(&env.executable).is_file());
    assert_eq!(env.args, vec!["-m", "mcp_server_git", "--repository", "/repo"]);
    assert_monotonic(&reporter.percentages());
}

#[tokio::test]
async fn test_isolated_environment_created_once() {
    let tmp = tempdir().unwrap();
    let bin = tmp.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    stub_python(&bin);

    let envs = manager(&tmp.path().join("providers"), &bin, 10_000);
    let first = envs.create_isolated_environment("git").await.unwrap();
    let second = envs.create_isolated_environment("git").await.unwrap();

    assert_eq!(first, second);
    let log = std::fs::read_to_string(bin.join("venv.log")).unwrap();
    assert_eq!(log.lines().count(), 1);
}

#[tokio::test]
async fn test_failed_venv_leaves_nothing_usable() {
    let tmp = tempdir().unwrap();
    let bin = tmp.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    write_script(&bin, "python3", r#"mkdir -p "$3/bin"; echo "No module named venv" >&2; exit 1"#);

    let envs = manager(&tmp.path().join("providers"), &bin, 10_000);
    let err = envs.create_isolated_environment("git").await.unwrap_err();
    assert!(err.to_string().contains("No module named venv"));

    let provider_dir = tmp.path().join("providers").join("python").join("git");
    assert!(!provider_dir.join("venv").exists());
    let leftovers: Vec<_> = std::fs::read_dir(&provider_dir).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_rust_install_builds_binary() {
    let tmp = tempdir().unwrap();
    let bin = tmp.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    stub_cargo(&bin);

    let envs = manager(&tmp.path().join("providers"), &bin, 10_000);
    let config = LaunchConfig::new("cargo", ["install", "weather-srv"]);
    let req = request("weather", Ecosystem::Rust, &config);

    let reporter = RecordingReporter::default();
    let env = assert_ok!(
        installer_for(EnvironmentKind::Rust, envs.clone())
            .install(&req, &reporter)
            .await
    );

    assert!(env.executable.ends_with("bin/weather-srv"));
    assert_ok!(envs.validate(&env));
    assert_monotonic(&reporter.percentages());
}

#[test]
fn test_required_tools_per_ecosystem() {
    let tmp = tempdir().unwrap();
    let envs = manager(tmp.path(), tmp.path(), 1_000);
    let names = |kind: EnvironmentKind| -> Vec<String> {
        installer_for(kind, envs.clone())
            .required_tools()
            .into_iter()
            .map(|t| t.rsplit('/').next().unwrap().to_string())
            .collect()
    };
    assert_eq!(names(EnvironmentKind::Js), vec!["npm", "npx"]);
    assert_eq!(names(EnvironmentKind::Python), vec!["python3"]);
    assert_eq!(names(EnvironmentKind::Rust), vec!["cargo", "git"]);
}

#[test]
fn test_classification_feeds_request() {
    let classification = EcosystemClassification::new(Ecosystem::Js, "pkg");
    let config = LaunchConfig::new("npx", ["pkg", "--flag"]);
    let req = InstallRequest::new("id", &classification, &config);
    assert_eq!(req.passthrough_args, vec!["--flag"]);
}
