//! Command-line interface for wpfcheck.

use clap::{Parser, Subcommand};
use globset::GlobSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::analysis;
use crate::config::{self, Config};
use crate::detect::{Rule, Runner, Severity};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Config written by `wpfcheck init`.
const DEFAULT_CONFIG: &str = include_str!("templates/default.yaml");

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", "packages", "node_modules"];

/// Dependency-property convention checker for WPF sources.
///
/// wpfcheck parses C# files, recognizes DependencyProperty registrations,
/// their backing fields and CLR accessors, and reports code that breaks
/// the conventions WPF relies on at runtime.
#[derive(Parser)]
#[command(name = "wpfcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check C# sources for dependency-property violations
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// Write a starter wpfcheck.yaml
    Init(InitArgs),
    /// List the rules wpfcheck knows
    Rules,
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Lowest severity that fails the run: error, warning, or info
    #[arg(long)]
    pub fail_on: Option<Severity>,

    /// Show suppressed findings in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "wpfcheck.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Load the config named on the command line, or discover one.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Config::discover(std::env::current_dir()?),
    };
    let config = match &path {
        Some(p) => Config::parse_file(p)?,
        None => Config::default(),
    };
    config::validate(&config)?;
    Ok((config, path))
}

/// Collect the `.cs` files under `root`, honoring excluded paths.
pub fn collect_files(root: &Path, excluded: &GlobSet) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            // Skip hidden and build output directories
            !name.starts_with('.') && !SKIPPED_DIRS.iter().any(|d| name.eq_ignore_ascii_case(d))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(analysis::get_analyzer)
            .is_some();
        if !supported {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if excluded.is_match(relative) {
            debug!(path = %relative.display(), "excluded by config");
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" && args.format != "sarif" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let (config, config_path) = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let metadata = match std::fs::metadata(&abs_path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Collect files to scan
    let (base_dir, files) = if metadata.is_dir() {
        let excluded = config.excluded_matcher()?;
        (abs_path.clone(), collect_files(&abs_path, &excluded)?)
    } else {
        let base = abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| abs_path.clone());
        (base, vec![abs_path.clone()])
    };

    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let fail_on = args.fail_on.unwrap_or_else(|| config.fail_threshold());

    // Run detection
    let runner = Runner::new(&base_dir).with_config(config);
    let result = runner.run(&files)?;

    // Output results
    let config_path_str = config_path.map(|p| p.to_string_lossy().to_string());
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => {
            report::write_json(&path_str, config_path_str.as_deref(), &result, fail_on)?;
        }
        "sarif" => {
            report::write_sarif(&result)?;
        }
        _ => {
            report::write_pretty(
                &path_str,
                config_path_str.as_deref(),
                &result,
                fail_on,
                args.show_suppressed,
            );
        }
    }

    // Return appropriate exit code
    if report::passed(&result, fail_on) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite it or --output to pick another path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CONFIG) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to enable, disable, or re-rank rules", args.output.display());
    println!("  2. Run: wpfcheck lint . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// Run the rules command.
pub fn run_rules() -> anyhow::Result<i32> {
    println!("Available rules:");
    println!();

    for rule in Rule::ALL {
        println!(
            "  {}  {:<8} {}",
            rule.id(),
            rule.default_severity().to_string(),
            rule.title()
        );
    }

    Ok(EXIT_SUCCESS)
}
