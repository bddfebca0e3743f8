//! CLI binary for docconv-client.
//!
//! A thin shim over the library crate: one subcommand per conversion, each
//! input file driven through its own `FileConverter`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docconv_client::{
    ApiClient, ClientConfig, ConversionKind, ConversionObserver, DocConvError, FileConverter,
    ObserverHandle, SelectedFile, DEFAULT_API_URL,
};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Terminal observer using indicatif ────────────────────────────────────────

/// Renders a progress bar over the input files plus one line per finished
/// file. Files may finish out of order when several run at once.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new(total: usize) -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(total as u64);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ConversionObserver for CliObserver {
    fn on_start(&self, file_name: &str) {
        self.bar.set_message(file_name.to_string());
    }

    fn on_success(&self, file_name: &str, output: &Path, size: u64) {
        self.bar.println(format!(
            "  {} {}  →  {}  {}",
            green("✓"),
            file_name,
            bold(&output.display().to_string()),
            dim(&format!("{:.2} KB", size as f64 / 1024.0)),
        ));
        self.bar.inc(1);
    }

    fn on_error(&self, file_name: Option<&str>, message: &str) {
        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            file_name.unwrap_or("-"),
            red(message),
        ));
        self.bar.inc(1);
    }
}

/// Plain stderr lines, used when the progress bar is disabled.
struct LineObserver;

impl ConversionObserver for LineObserver {
    fn on_success(&self, file_name: &str, output: &Path, _size: u64) {
        eprintln!("{file_name} -> {}", output.display());
    }

    fn on_error(&self, file_name: Option<&str>, message: &str) {
        eprintln!("{}: {message}", file_name.unwrap_or("-"));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract text (writes ./report.txt)
  docconv pdf-to-txt report.pdf

  # Word to PDF into a separate directory
  docconv word-to-pdf -o out/ letter.docx memo.doc

  # Remove a PDF password
  docconv unlock --password hunter2 locked.pdf

  # Talk to a remote service
  docconv --api-url https://convert.example.com pdf-to-word paper.pdf

  # Machine-readable results
  docconv --json pdf-to-txt *.pdf > results.json

ENVIRONMENT VARIABLES:
  DOCCONV_API_URL      Service base URL (default http://localhost:8000)
  DOCCONV_OUTPUT_DIR   Directory downloads are written to
  DOCCONV_PASSWORD     Password for `unlock`
  RUST_LOG             Override the log filter
"#;

/// Convert documents through a docconv conversion service.
#[derive(Parser, Debug)]
#[command(
    name = "docconv",
    version,
    about = "Convert between PDF, Word and text; unlock password-protected PDFs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the conversion service.
    #[arg(long, global = true, env = "DOCCONV_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Directory converted files are written to.
    #[arg(short, long, global = true, env = "DOCCONV_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Number of files converted at once.
    #[arg(short, long, global = true, env = "DOCCONV_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Print results as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "DOCCONV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCCONV_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert PDF documents to Word (.docx) format.
    PdfToWord(FilesArgs),
    /// Convert Word documents (.docx, .doc) to PDF format.
    WordToPdf(FilesArgs),
    /// Extract text content from PDF files.
    PdfToTxt(FilesArgs),
    /// Remove password protection from PDF files.
    Unlock {
        #[command(flatten)]
        files: FilesArgs,

        /// PDF password, if the file needs one to open.
        #[arg(long, env = "DOCCONV_PASSWORD")]
        password: Option<String>,
    },
    /// List the available conversions.
    List,
    /// Check that the service is reachable.
    Ping,
}

#[derive(Args, Debug)]
struct FilesArgs {
    /// Files to convert.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

/// Result for one input file, as printed by `--json`.
#[derive(Debug, Serialize)]
struct FileOutcome {
    input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters; keep INFO logs
    // from tearing through it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = ClientConfig::builder()
        .base_url(&cli.api_url)
        .output_dir(&cli.output_dir)
        .build()
        .context("Invalid configuration")?;

    let (kind, files, password) = match &cli.command {
        Command::List => return print_catalogue(cli.json),
        Command::Ping => return ping(config, cli.json).await,
        Command::PdfToWord(args) => (ConversionKind::PdfToWord, &args.files, None),
        Command::WordToPdf(args) => (ConversionKind::WordToPdf, &args.files, None),
        Command::PdfToTxt(args) => (ConversionKind::PdfToText, &args.files, None),
        Command::Unlock { files, password } => {
            (ConversionKind::PdfUnlock, &files.files, password.as_deref())
        }
    };

    let client = ApiClient::new(config).context("Failed to create HTTP client")?;

    let cli_observer = show_progress.then(|| CliObserver::new(files.len()));
    let observer: Option<ObserverHandle> = match &cli_observer {
        Some(obs) => Some(Arc::clone(obs) as ObserverHandle),
        None if !cli.quiet && !cli.json => Some(Arc::new(LineObserver) as ObserverHandle),
        None => None,
    };

    let outcomes: Vec<FileOutcome> = stream::iter(files.iter().map(|path| {
        convert_file(&client, kind, path, password, observer.clone())
    }))
    .buffer_unordered(cli.concurrency.max(1))
    .collect()
    .await;

    if let Some(obs) = &cli_observer {
        obs.bar.finish_and_clear();
    }

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcomes).context("Failed to serialise results")?
        );
    } else if !cli.quiet {
        let ok = outcomes.len() - failed;
        if failed == 0 {
            eprintln!("{} {} converted", green("✔"), bold(&ok.to_string()));
        } else {
            eprintln!(
                "{} {}/{} converted  ({} failed)",
                red("✘"),
                bold(&ok.to_string()),
                outcomes.len(),
                red(&failed.to_string()),
            );
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} conversions failed", outcomes.len());
    }
    Ok(())
}

/// Run one file through a fresh form.
async fn convert_file(
    client: &ApiClient,
    kind: ConversionKind,
    path: &Path,
    password: Option<&str>,
    observer: Option<ObserverHandle>,
) -> FileOutcome {
    let mut form = FileConverter::for_endpoint(client.endpoint(kind));
    if let Some(ref obs) = observer {
        form = form.with_observer(Arc::clone(obs));
    }
    if let Some(pw) = password {
        form.set_password(pw);
    }

    let display_name = path.display().to_string();

    // Failures before submit never reach the form's observer.
    let selected: Result<(), DocConvError> = async {
        let file = SelectedFile::from_path(path).await?;
        form.select_file(file)
    }
    .await;

    let result = match selected {
        Ok(()) => form.submit().await,
        Err(e) => {
            if let Some(ref obs) = observer {
                obs.on_error(Some(&display_name), &e.user_message());
            }
            Err(e)
        }
    };

    match result {
        Ok(dl) => FileOutcome {
            input: path.to_path_buf(),
            output: Some(dl.path),
            size: Some(dl.size),
            error: None,
        },
        Err(e) => FileOutcome {
            input: path.to_path_buf(),
            output: None,
            size: None,
            error: Some(e.user_message()),
        },
    }
}

#[derive(Serialize)]
struct CatalogueEntry {
    command: &'static str,
    title: &'static str,
    description: &'static str,
    endpoint: &'static str,
    accept: &'static str,
    output_extension: &'static str,
    output_mime_type: &'static str,
    password: bool,
}

fn print_catalogue(json: bool) -> Result<()> {
    let entries: Vec<CatalogueEntry> = ConversionKind::ALL
        .iter()
        .map(|&k| CatalogueEntry {
            command: k.name(),
            title: k.title(),
            description: k.description(),
            endpoint: k.endpoint(),
            accept: k.accept(),
            output_extension: k.output_extension(),
            output_mime_type: k.output_mime_type(),
            password: k.accepts_password(),
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialise catalogue")?
        );
        return Ok(());
    }

    for e in &entries {
        println!("{:<12} {}", bold(e.command), e.title);
        println!("             {}", e.description);
        println!(
            "             {}  accepts {}  →  {} ({}){}",
            dim(e.endpoint),
            e.accept,
            e.output_extension,
            dim(e.output_mime_type),
            if e.password { "  [--password]" } else { "" }
        );
    }
    Ok(())
}

async fn ping(config: ClientConfig, json: bool) -> Result<()> {
    let client = ApiClient::new(config).context("Failed to create HTTP client")?;
    let banner = client
        .ping()
        .await
        .with_context(|| format!("Service at {} is not reachable", client.base_url()))?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "base_url": client.base_url(), "message": banner })
        );
    } else {
        println!("{} {}  {}", green("✔"), client.base_url(), dim(&banner));
    }
    Ok(())
}
