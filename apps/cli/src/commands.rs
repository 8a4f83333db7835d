//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use taxonomy_artifacts::DQ_REPORT_MD;
use taxonomy_core::{ImportConfig, ImportResult, ProgressReporter};
use taxonomy_normalize::{TypoMap, split_level4};
use taxonomy_shared::{AppConfig, init_config, load_config, load_config_from};

/// Exit code for a strict run that found data quality issues.
const EXIT_STRICT_VIOLATION: u8 = 1;
/// Exit code for fatal input errors.
const EXIT_FATAL: u8 = 2;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Taxonomy importer: normalize CSV taxonomies into stable artifacts.
#[derive(Parser)]
#[command(
    name = "taxonomy",
    version,
    about = "Import, normalize, and quality-check taxonomy CSV files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.taxonomy/taxonomy.toml.
    #[arg(long, global = true, env = "TAXONOMY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Import every CSV file in a directory and write the artifacts.
    Import {
        /// Input directory containing CSV files (defaults to config).
        #[arg(short = 'i', long = "in")]
        input: Option<PathBuf>,

        /// Output directory for generated files (defaults to config).
        #[arg(short = 'o', long = "out")]
        output: Option<PathBuf>,

        /// Exit with code 1 if any data quality issue is found.
        #[arg(short, long)]
        strict: bool,

        /// Process and report without writing any file.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how a Level-4 value is split and normalized.
    Split {
        /// Compound Level-4 value, e.g. "A; B (x; y); C".
        value: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "taxonomy=info",
        1 => "taxonomy=debug",
        _ => "taxonomy=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Import {
            input,
            output,
            strict,
            dry_run,
        } => Ok(cmd_import(config_path, input, output, strict, dry_run)),
        Command::Split { value } => cmd_split(config_path, &value),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> taxonomy_shared::Result<AppConfig> {
    match path {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

fn cmd_import(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
    dry_run: bool,
) -> ExitCode {
    match import(config_path, input, output, strict, dry_run) {
        Ok(result) if result.strict_violation() => {
            eprintln!();
            eprintln!("  Strict mode: {} issues found", result.stats.issues.len());
            eprintln!("  See {DQ_REPORT_MD} for details.");
            ExitCode::from(EXIT_STRICT_VIOLATION)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "import failed");
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn import(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
    dry_run: bool,
) -> taxonomy_shared::Result<ImportResult> {
    let config = resolve_config(config_path)?;

    let import_config = ImportConfig {
        input_dir: input.unwrap_or_else(|| PathBuf::from(&config.defaults.input_dir)),
        output_dir: output.unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir)),
        strict: strict || config.defaults.strict,
        dry_run,
        typos: TypoMap::from_config(&config.typos),
    };

    info!(
        input = %import_config.input_dir.display(),
        output = %import_config.output_dir.display(),
        strict = import_config.strict,
        "importing taxonomy"
    );

    let reporter = CliProgress::new();
    let result = taxonomy_core::run_import(&import_config, &reporter);
    reporter.clear();
    let result = result?;

    print_summary(&import_config, &result);

    Ok(result)
}

fn print_summary(config: &ImportConfig, result: &ImportResult) {
    if config.dry_run {
        if let Some(report) = result.artifact(DQ_REPORT_MD) {
            println!("{}", report.text());
        }
    }

    println!();
    println!("  Import complete{}", if config.dry_run { " (dry run)" } else { "" });
    println!("  Files:  {}", result.stats.files_processed);
    println!("  Rows:   {}", result.stats.total_rows);
    println!("  Terms:  {}", result.stats.unique_terms);
    println!("  Issues: {}", result.stats.issues.len());
    if !config.dry_run {
        println!("  Output: {}", config.output_dir.display());
    }
    println!("  Time:   {:.1}s", result.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// split
// ---------------------------------------------------------------------------

fn cmd_split(config_path: Option<&Path>, value: &str) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;
    let typos = TypoMap::from_config(&config.typos);

    let terms = split_level4(value);
    if terms.is_empty() {
        println!("(no terms)");
    }
    for term in &terms {
        let norm = typos.normalize_term(term);
        if &norm == term {
            println!("{term}");
        } else {
            println!("{term}\t-> {norm}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<ExitCode> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn rows_read(&self, count: usize) {
        self.spinner.set_message(format!("Reading taxonomy files ({count} rows)"));
    }

    fn artifact_written(&self, filename: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing [{current}/{total}] {filename}"));
    }

    fn done(&self, _result: &ImportResult) {
        self.spinner.finish_and_clear();
    }
}
