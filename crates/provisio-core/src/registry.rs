//! Registry detection: classify a raw launch command by package ecosystem.
//!
//! Pure and infallible. Heuristics are tried in a fixed order and the first
//! match wins:
//!
//! 1. `npx` / `npm`
//! 2. `node`
//! 3. `python` / `python3` (and versioned interpreters)
//! 4. `uv` / `uvx`
//! 5. `cargo`
//! 6. `docker` / `podman`
//! 7. absolute or relative executable path
//! 8. anything else, classified as [`Ecosystem::Other`] with the raw command

use std::path::Path;

use crate::domain::{Ecosystem, EcosystemClassification, LaunchConfig};

/// npm subcommands that run or install a package named by the next argument.
const NPM_SUBCOMMANDS: &[&str] = &["exec", "x", "install", "i", "add", "run", "start"];

/// Cargo subcommands that never name the binary themselves.
const CARGO_SUBCOMMANDS: &[&str] = &["run", "install", "build", "+stable", "+nightly"];

/// Cargo flags that consume the following argument.
const CARGO_VALUE_FLAGS: &[&str] = &[
    "--git",
    "--branch",
    "--tag",
    "--rev",
    "--path",
    "--root",
    "--bin",
    "--example",
    "-p",
    "--package",
    "--version",
    "--vers",
    "--registry",
    "--index",
    "-F",
    "--features",
    "--target",
    "--target-dir",
    "--profile",
    "-j",
    "--jobs",
    "--manifest-path",
    "--config",
    "-Z",
];

/// Container flags that consume the following argument.
const CONTAINER_VALUE_FLAGS: &[&str] = &[
    "-e",
    "--env",
    "--env-file",
    "-v",
    "--volume",
    "--name",
    "-p",
    "--publish",
    "--network",
    "-w",
    "--workdir",
    "--entrypoint",
    "-u",
    "--user",
    "--mount",
    "--platform",
];

/// Classify a launch config.
pub fn classify(config: &LaunchConfig) -> EcosystemClassification {
    let program = program_name(&config.command);
    let args = config.args.as_slice();

    let classification = match program.as_str() {
        "npx" | "npm" => classify_js_runner(&program, config),
        "node" => EcosystemClassification::new(
            Ecosystem::Js,
            first_positional(args).unwrap_or(&config.command),
        )
        .with_local_entry(),
        p if is_python(p) => classify_python(config),
        "uv" | "uvx" => classify_uv(&program, config),
        "cargo" => classify_cargo(config),
        "docker" | "podman" => classify_container(config),
        _ if looks_like_path(&config.command) => {
            EcosystemClassification::new(Ecosystem::Other, file_name(&config.command))
        }
        _ => EcosystemClassification::new(Ecosystem::Other, config.command.clone()),
    };

    if classification.repository_url.is_some() {
        classification
    } else {
        let url = args.iter().find(|a| is_repository_url(a)).cloned();
        classification.with_repository(url)
    }
}

/// Last path component, splitting on both `/` and `\\` regardless of host.
fn file_name(command: &str) -> &str {
    command
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or(command)
}

/// Lowercased executable name without directory or Windows launcher extension.
fn program_name(command: &str) -> String {
    let name = file_name(command).to_ascii_lowercase();

    for ext in [".exe", ".cmd", ".bat"] {
        if let Some(stripped) = name.strip_suffix(ext) {
            return stripped.to_string();
        }
    }
    name
}

fn is_python(program: &str) -> bool {
    program == "python"
        || program
            .strip_prefix("python")
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit() || c == '.'))
}

fn looks_like_path(command: &str) -> bool {
    command.contains('/') || command.contains('\\') || command.starts_with('.')
}

fn is_repository_url(arg: &str) -> bool {
    arg.starts_with("git+")
        || arg.starts_with("github:")
        || arg.contains("github.com/")
        || arg.contains("gitlab.com/")
        || arg.ends_with(".git")
}

fn first_positional(args: &[String]) -> Option<&str> {
    args.iter().map(String::as_str).find(|a| !a.starts_with('-'))
}

fn classify_js_runner(program: &str, config: &LaunchConfig) -> EcosystemClassification {
    let package = config
        .args
        .iter()
        .map(String::as_str)
        .filter(|a| !(program == "npm" && NPM_SUBCOMMANDS.contains(a)))
        .find(|a| a.starts_with('@') || !a.starts_with('-'))
        .unwrap_or(&config.command);

    EcosystemClassification::new(Ecosystem::Js, package)
}

fn classify_python(config: &LaunchConfig) -> EcosystemClassification {
    let args = config.args.as_slice();
    let module = args
        .iter()
        .position(|a| a == "-m")
        .and_then(|idx| args.get(idx + 1))
        .map(String::as_str);

    let package = module.or_else(|| first_positional(args)).map_or_else(
        || config.command.clone(),
        |p| {
            // A script path names the package by its file stem.
            if p.ends_with(".py") {
                Path::new(p)
                    .file_stem()
                    .map_or_else(|| p.to_string(), |s| s.to_string_lossy().into_owned())
            } else {
                p.to_string()
            }
        },
    );

    EcosystemClassification::new(Ecosystem::Python, package)
}

fn classify_uv(program: &str, config: &LaunchConfig) -> EcosystemClassification {
    let mut args = config.args.iter().map(String::as_str).peekable();

    // `uv tool run <pkg>` / `uv run <pkg>`
    if program == "uv" {
        while let Some(&next) = args.peek() {
            if matches!(next, "tool" | "run") {
                args.next();
            } else {
                break;
            }
        }
    }

    let mut package = None;
    while let Some(arg) = args.next() {
        if arg == "--from" {
            // `uvx --from <pkg> <entrypoint>` installs <pkg>.
            package = args.next();
            break;
        }
        if !arg.starts_with('-') {
            package = Some(arg);
            break;
        }
    }

    EcosystemClassification::new(Ecosystem::Python, package.unwrap_or(&config.command))
}

fn classify_cargo(config: &LaunchConfig) -> EcosystemClassification {
    let args = config.args.as_slice();
    let value_after = |flags: &[&str]| {
        args.iter()
            .position(|a| flags.contains(&a.as_str()))
            .and_then(|idx| args.get(idx + 1))
            .map(String::as_str)
    };

    // Positionals before `--`, without the values of flags like `--git <url>`.
    let mut positionals = Vec::new();
    let mut iter = args.iter().map(String::as_str);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if CARGO_VALUE_FLAGS.contains(&arg) {
            iter.next();
        } else if !arg.starts_with('-') {
            positionals.push(arg);
        }
    }

    let repository_url = value_after(&["--git"]).map(str::to_string);

    let installed_crate = if positionals.first() == Some(&"install") {
        positionals.get(1).copied()
    } else {
        None
    };

    // `cargo` stands for "no crate named", e.g. `cargo install --git <url>`.
    let package = value_after(&["--bin"])
        .or(installed_crate)
        .or_else(|| value_after(&["-p", "--package"]))
        .or_else(|| {
            positionals
                .iter()
                .copied()
                .find(|a| !CARGO_SUBCOMMANDS.contains(a))
        })
        .unwrap_or("cargo");

    EcosystemClassification::new(Ecosystem::Rust, package).with_repository(repository_url)
}

fn classify_container(config: &LaunchConfig) -> EcosystemClassification {
    let mut args = config.args.iter().map(String::as_str);
    let mut image = None;

    // Skip everything up to and including `run`.
    if config.args.iter().any(|a| a == "run") {
        for arg in args.by_ref() {
            if arg == "run" {
                break;
            }
        }
    }

    while let Some(arg) = args.next() {
        if CONTAINER_VALUE_FLAGS.contains(&arg) {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        image = Some(arg);
        break;
    }

    EcosystemClassification::new(Ecosystem::Other, image.unwrap_or(&config.command))
}
