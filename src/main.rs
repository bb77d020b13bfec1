use chat_archive::diagnostics::LogDiagnostics;
use chat_archive::export;
use chat_archive::formatter::FormatOptions;
use chat_archive::source::DirectorySource;
use chat_archive::utils::{ExportConfig, default_archive_name, default_workers};
use clap::Parser;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Export AI chat conversations to a zip archive of Markdown files.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory of conversation records (<id>.json, <id>.yaml or <id>.yml).
    #[arg(value_name = "SOURCE_DIR")]
    source_dir: Option<PathBuf>,

    /// Archive to write.
    /// Defaults to ./conversations-<date>.zip if not set in config.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/chat-archive/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Comma-separated conversation ids to export, in order.
    #[arg(long = "id", value_name = "IDS", value_delimiter = ',')]
    ids: Option<Vec<String>>,

    /// Render messages with blank content as a placeholder instead of dropping them.
    #[arg(long)]
    keep_invalid: bool,

    /// Number of worker threads.
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Log every conversation fetched and archived.
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors and skip the summary line.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    source_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    keep_invalid: Option<bool>,
    workers: Option<usize>,
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        dirs::config_dir()
            .map(|d| d.join("chat-archive/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve source_dir (CLI > Config)
    let source_dir = cli.source_dir.or(file_cfg.source_dir).ok_or_else(|| {
        eyre!("No source directory given.\nPass SOURCE_DIR, or set source_dir in config.toml.")
    })?;

    // 3. Resolve output (CLI > Config > Dated default)
    let output = cli
        .output
        .or(file_cfg.output)
        .unwrap_or_else(|| PathBuf::from(default_archive_name(chrono::Local::now().date_naive())));

    // 4. Build the Export Config
    let config = ExportConfig {
        output,
        ids: cli.ids.unwrap_or_default(),
        format: FormatOptions {
            remove_invalid: !(cli.keep_invalid || file_cfg.keep_invalid.unwrap_or(false)),
        },
        workers: cli
            .workers
            .or(file_cfg.workers)
            .filter(|&n| n > 0)
            .unwrap_or_else(default_workers),
    };

    // 5. Run the Business Logic
    let source = DirectorySource::new(&source_dir)?;
    let summary = export::execute(&config, &source, &LogDiagnostics)?;

    if !cli.quiet {
        let mut line = format!(
            "Done. {} conversations exported to {}.",
            summary.exported,
            summary.archive.display()
        );
        if summary.empty > 0 {
            line.push_str(&format!(" {} could not be formatted.", summary.empty));
        }
        eprintln!("{}", line);
    }

    Ok(())
}
