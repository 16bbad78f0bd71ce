//! fileset - Recursive-wildcard file sets from the command line.
//!
//! Usage:
//!   fileset scan [BASE]              List files matching patterns and selectors
//!   fileset match PATTERN PATH       Test a path against a pattern
//!   fileset tokenize LINE            Split a command line into arguments
//!   fileset path normalize PATH      Path arithmetic for a path family
//!   fileset --help                   Show help

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fileset_cmdline::translate_commandline;
use fileset_core::{FamilyKind, PathModel, SelectorConfig, SelectorRecord, match_path, match_pattern_start};
use fileset_scan::{DirectoryScanner, ScanConfig, ScanResult};

#[derive(Parser)]
#[command(
    name = "fileset",
    version,
    about = "Recursive-wildcard file sets",
    long_about = "fileset selects files below a directory with Ant-style include and \
                  exclude patterns (`**` matches any number of directories) and \
                  optional per-file selectors."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and list what the patterns select
    Scan {
        /// Directory to scan (defaults to the config's base dir, then ".")
        path: Option<PathBuf>,

        /// Include pattern (repeatable; default `**`)
        #[arg(short = 'i', long = "include")]
        includes: Vec<String>,

        /// Exclude pattern (repeatable)
        #[arg(short = 'x', long = "exclude")]
        excludes: Vec<String>,

        /// Selector as `type:key=value,...` (repeatable)
        #[arg(short = 's', long = "selector")]
        selectors: Vec<String>,

        /// Match patterns case-insensitively
        #[arg(long)]
        ignore_case: bool,

        /// Return an empty result when the directory does not exist
        #[arg(long)]
        allow_missing: bool,

        /// Follow symbolic links
        #[arg(short = 'L', long)]
        follow_symlinks: bool,

        /// Add the VCS and backup-file excludes
        #[arg(long)]
        default_excludes: bool,

        /// TOML scan configuration; command-line options are added on top
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path family for patterns and output
        #[arg(long)]
        family: Option<FamilyKind>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Test a path against a pattern
    Match {
        /// Pattern, e.g. `src/**/*.rs`
        pattern: String,

        /// Path to test
        path: String,

        /// Compare case-insensitively
        #[arg(long)]
        ignore_case: bool,

        /// Only test whether something below PATH could match
        #[arg(long)]
        start: bool,

        /// Path family
        #[arg(long)]
        family: Option<FamilyKind>,
    },

    /// Split a command line into arguments
    Tokenize {
        /// Command line to split
        line: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Path arithmetic
    Path {
        #[command(subcommand)]
        op: PathOp,

        /// Path family
        #[arg(long, global = true)]
        family: Option<FamilyKind>,
    },
}

#[derive(Subcommand)]
enum PathOp {
    /// Rewrite separators to the family's native one
    Normalize { path: String },
    /// Make a path absolute against the working directory
    Resolve { path: String },
    /// Length of the root prefix
    Prefix { path: String },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Options of `fileset scan` beyond the config file.
struct ScanArgs {
    path: Option<PathBuf>,
    includes: Vec<String>,
    excludes: Vec<String>,
    selectors: Vec<String>,
    ignore_case: bool,
    allow_missing: bool,
    follow_symlinks: bool,
    default_excludes: bool,
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Scan {
            path,
            includes,
            excludes,
            selectors,
            ignore_case,
            allow_missing,
            follow_symlinks,
            default_excludes,
            config,
            family,
            format,
        } => {
            let args = ScanArgs {
                path,
                includes,
                excludes,
                selectors,
                ignore_case,
                allow_missing,
                follow_symlinks,
                default_excludes,
                config,
            };
            run_scan(args, family, format)?;
        }
        Command::Match {
            pattern,
            path,
            ignore_case,
            start,
            family,
        } => {
            run_match(&pattern, &path, !ignore_case, start, family)?;
        }
        Command::Tokenize { line, format } => {
            run_tokenize(&line, format)?;
        }
        Command::Path { op, family } => {
            run_path(op, family)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flags.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn path_model(family: Option<FamilyKind>) -> Result<PathModel> {
    let model = match family {
        None => PathModel::native()?,
        Some(kind) => {
            let cwd = std::env::current_dir().context("Cannot read working directory")?;
            PathModel::new(kind.family(), cwd.to_string_lossy())
        }
    };
    Ok(model)
}

fn load_config(path: &Path) -> Result<ScanConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config {}", path.display()))?;
    let config: ScanConfig =
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

/// Merge the config file (if any) with the command-line options.
fn build_config(args: ScanArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ScanConfig::new("."),
    };

    if let Some(path) = args.path {
        config.base_dir = path;
    }
    if !args.includes.is_empty() {
        config.includes = Some(args.includes);
    }
    config.excludes.extend(args.excludes);
    for spec in &args.selectors {
        let record: SelectorRecord = spec
            .parse()
            .with_context(|| format!("Invalid selector `{spec}`"))?;
        let selector = SelectorConfig::try_from(record)
            .with_context(|| format!("Invalid selector `{spec}`"))?;
        config.selectors.push(selector);
    }
    if args.ignore_case {
        config.case_sensitive = false;
    }
    if args.allow_missing {
        config.error_on_missing_dir = false;
    }
    config.follow_symlinks |= args.follow_symlinks;
    config.default_excludes |= args.default_excludes;

    config.validate().context("Invalid scan configuration")?;
    Ok(config)
}

/// Run a scan and print the selected files.
fn run_scan(args: ScanArgs, family: Option<FamilyKind>, format: OutputFormat) -> Result<()> {
    let config = build_config(args)?;
    debug!(?config, "Scan configuration");

    eprintln!("Scanning {}...", config.base_dir.display());

    let mut scanner = DirectoryScanner::new(path_model(family)?);
    let result = scanner.scan(&config).context("Scan failed")?;

    match format {
        OutputFormat::Text => print_scan(&result),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

fn print_scan(result: &ScanResult) {
    for file in &result.included_files {
        println!("{file}");
    }

    eprintln!();
    eprintln!("{}", "─".repeat(60));
    eprintln!(
        " {} files, {} directories included",
        result.included_files.len(),
        result.included_dirs.len()
    );
    if !result.deselected_files.is_empty() {
        eprintln!(" {} files rejected by selectors", result.deselected_files.len());
    }
    if !result.not_followed_symlinks.is_empty() {
        eprintln!(
            " {} symbolic links not followed",
            result.not_followed_symlinks.len()
        );
    }
    eprintln!(
        " {} files, {} directories examined in {:.2}s",
        result.stats.files_seen,
        result.stats.dirs_seen,
        result.scan_duration.as_secs_f64()
    );
    eprintln!("{}", "─".repeat(60));

    if result.has_warnings() {
        eprintln!();
        eprintln!("{} warning(s) during scan", result.warnings.len());
        for warning in &result.warnings {
            eprintln!("   {}", warning.message);
        }
    }
}

/// Test one path against one pattern.
fn run_match(
    pattern: &str,
    path: &str,
    case_sensitive: bool,
    start: bool,
    family: Option<FamilyKind>,
) -> Result<()> {
    let model = path_model(family)?;
    let family = model.family().as_ref();
    let matched = if start {
        match_pattern_start(family, pattern, path, case_sensitive)
    } else {
        match_path(family, pattern, path, case_sensitive)
    };
    println!("{matched}");
    Ok(())
}

fn run_tokenize(line: &str, format: OutputFormat) -> Result<()> {
    let tokens = translate_commandline(line)?;
    match format {
        OutputFormat::Text => {
            for token in &tokens {
                println!("{token}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tokens)?),
    }
    Ok(())
}

fn run_path(op: PathOp, family: Option<FamilyKind>) -> Result<()> {
    let model = path_model(family)?;
    match op {
        PathOp::Normalize { path } => println!("{}", model.normalize(&path)),
        PathOp::Resolve { path } => println!("{}", model.resolve_file(&path)?),
        PathOp::Prefix { path } => println!("{}", model.prefix_length(&path)),
    }
    Ok(())
}
