//! Command-line interface for verbcheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::report;
use crate::rule::VerbChoice;
use crate::runner::Runner;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

const DEFAULT_TEMPLATE: &str = include_str!("templates/default.yaml");

/// Directories never scanned: build output and package caches.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", "node_modules", "packages"];

/// Directories holding tests, skipped unless test files are included.
const TEST_DIRS: &[&str] = &["test", "tests", "Test", "Tests"];

/// Flag ASP.NET controller actions that do not declare an HTTP verb.
///
/// A public method on a class whose immediate base ends in "Controller" must
/// carry an attribute deriving from HttpMethodAttribute (ASP.NET Core) or
/// ActionMethodSelectorAttribute (ASP.NET MVC).
#[derive(Parser)]
#[command(name = "verbcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report controller methods without an HTTP verb attribute
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Add a verb attribute to every flagged method
    Fix(FixArgs),
    /// Create a verbcheck config from the template
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Show suppressed diagnostics in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Arguments for the fix command.
#[derive(Parser)]
pub struct FixArgs {
    /// Path to fix (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verb to add: get or post (default: config's default_verb, else get)
    #[arg(long)]
    pub verb: Option<VerbChoice>,

    /// List the fixes without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "verbcheck.yaml")]
    pub output: PathBuf,
}

/// Load the config named on the command line, or one discovered in the
/// current directory or the scanned directory. No config means defaults.
fn load_config(explicit: Option<&Path>, scan_root: &Path) -> anyhow::Result<Config> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config::discover(Path::new(".")).or_else(|| config::discover(scan_root)),
    };

    let config = match path {
        Some(p) => {
            tracing::debug!(config = %p.display(), "loading config");
            Config::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("failed to parse config {}: {}", p.display(), e))?
        }
        None => Config::default(),
    };

    config::validate(&config).map_err(|e| anyhow::anyhow!("invalid config: {}", e))?;
    Ok(config)
}

fn is_test_file(name: &str) -> bool {
    name.ends_with("Tests.cs") || name.ends_with("Test.cs")
}

/// Collect C# files under `root`.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let include_tests = config.should_include_test_files();
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let lossy = e.file_name().to_string_lossy();
            let name: &str = &lossy;
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name) {
                return false;
            }
            include_tests || !TEST_DIRS.contains(&name)
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("cs") {
            continue;
        }

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !include_tests && is_test_file(name) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(relative) {
            tracing::debug!(file = %path.display(), "excluded by config");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Resolve the scan path and collect its files.
fn resolve_targets(path: &Path, config: &Config) -> anyhow::Result<(PathBuf, Vec<PathBuf>)> {
    let abs_path = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("cannot access path {:?}: {}", path, e))?;

    let files = if abs_path.is_dir() {
        collect_files(&abs_path, config)?
    } else {
        vec![abs_path.clone()]
    };
    Ok((abs_path, files))
}

/// Directory a config is discovered in for `path`.
fn scan_root(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" && args.format != "sarif" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let config = load_config(args.config.as_deref(), &scan_root(&args.path))?;
    let (abs_path, files) = resolve_targets(&args.path, &config)?;

    if files.is_empty() {
        tracing::warn!(path = %abs_path.display(), "no C# files to scan");
    }

    let runner = Runner::new(&abs_path).with_config(&config);
    let result = runner.run(&files)?;

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&path_str, &result)?,
        "sarif" => report::write_sarif(&abs_path, &result)?,
        _ => report::write_pretty(&path_str, &result, args.show_suppressed),
    }

    if result.is_clean() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the fix command.
pub fn run_fix(args: &FixArgs) -> anyhow::Result<i32> {
    let config = load_config(args.config.as_deref(), &scan_root(&args.path))?;
    let (abs_path, files) = resolve_targets(&args.path, &config)?;
    let verb = args.verb.unwrap_or_else(|| config.default_verb());

    let runner = Runner::new(&abs_path).with_config(&config);
    let outcome = runner.fix(&files, verb, args.dry_run)?;

    report::write_fix_outcome(&args.path.to_string_lossy(), &outcome);

    if outcome.failed.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("failed to create directory: {}", e))?;
        }
    }

    std::fs::write(&args.output, DEFAULT_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("failed to write config: {}", e))?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: verbcheck check . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
