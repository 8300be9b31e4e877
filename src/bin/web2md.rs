//! CLI binary for web2md-client.
//!
//! A thin shim over the library crate: maps flags to `ClientConfig`, submits
//! one job, renders the workflow state as a spinner and prints the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;
use web2md_client::config::{
    DEFAULT_BASE_URL, DEFAULT_MAX_DEPTH, DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_PAGES,
};
use web2md_client::{
    format_content_length, write_markdown, write_markdown_to_dir, ClientConfig, ConversionMode,
    ConversionResult, Converter, CrawlForm, FileUpload, Notification, Notifier, Severity,
    SharedNotifier, TracingNotifier, WorkflowController, TRANSLATION_LANGUAGES,
};

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

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── Notifications as terminal lines ──────────────────────────────────────────

/// Prints notifications to stderr, above the spinner when one is active.
struct CliNotifier {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl Notifier for CliNotifier {
    fn notify(&self, n: Notification) {
        if self.quiet && n.severity == Severity::Info {
            return;
        }
        let line = match n.severity {
            Severity::Info => format!("{} {}  {}", green("✔"), bold(&n.title), n.description),
            Severity::Destructive => {
                format!("{} {}  {}", red("✘"), bold(&n.title), red(&n.description))
            }
        };
        match &self.bar {
            Some(bar) if !bar.is_finished() => bar.println(line),
            _ => eprintln!("{line}"),
        }
    }
}

/// Follow the workflow state and show the in-flight mode's progress copy.
fn spawn_progress(controller: &WorkflowController, bar: ProgressBar) -> tokio::task::JoinHandle<()> {
    let mut updates = controller.updates();
    tokio::spawn(async move {
        while let Some(state) = updates.next().await {
            if let Some(message) = state.progress_message() {
                bar.set_prefix(state.selected_mode.to_string());
                bar.set_message(message);
                bar.enable_steady_tick(Duration::from_millis(80));
            } else if state.last_result.is_some() {
                bar.finish_and_clear();
                break;
            }
        }
    })
}

fn new_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&TICKS),
    );
    bar
}

fn after_help() -> String {
    format!(
        r#"EXAMPLES:
  # Convert one page to stdout
  web2md webpage https://docs.example.com/api

  # Crawl an API documentation site, translate to Korean, save to a file
  web2md crawl https://docs.stripe.com/api --max-pages 30 --translate-to Korean -o stripe.md

  # Convert a Word document, saving under the server's file name
  web2md upload report.docx -o ./out/

  # Structured JSON result
  web2md --json webpage https://example.com > result.json

TRANSLATION LANGUAGES:
  {languages}
  (any other language name is passed to the service as-is)

UPLOADS:
  .pdf .doc .docx .xls .xlsx .ppt .pptx .txt, up to {limit} MB

ENVIRONMENT VARIABLES:
  WEB2MD_API_URL     Base URL of the conversion service (default {base_url})
  WEB2MD_TIMEOUT     Request timeout in seconds (default: wait indefinitely)
  RUST_LOG           Override log filtering (e.g. web2md_client=debug)
"#,
        languages = TRANSLATION_LANGUAGES.join(", "),
        limit = DEFAULT_MAX_FILE_BYTES / (1024 * 1024),
        base_url = DEFAULT_BASE_URL,
    )
}

/// Convert web pages, documentation sites and documents to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "web2md",
    version,
    about = "Convert web pages, documentation sites and office documents to Markdown",
    long_about = "Submit a conversion job to a web-to-Markdown service: a single web page, \
an LLM-guided crawl of a documentation site, or an uploaded PDF/Office/text file.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = after_help()
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the conversion service.
    #[arg(long, global = true, env = "WEB2MD_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Request timeout in seconds. Default: none.
    #[arg(long, global = true, env = "WEB2MD_TIMEOUT")]
    timeout: Option<u64>,

    /// Write Markdown to this file (or into this directory) instead of stdout.
    #[arg(short, long, global = true, env = "WEB2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the structured result as JSON instead of Markdown.
    #[arg(long, global = true, env = "WEB2MD_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "WEB2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "WEB2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "WEB2MD_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a single web page.
    #[command(visible_alias = "page")]
    Webpage {
        /// Full URL of the page.
        url: String,
    },
    /// Crawl a documentation site and combine the pages.
    #[command(visible_alias = "multipage")]
    Crawl {
        /// Entry URL of the site.
        url: String,

        /// Maximum pages to visit (falls back to the default if not a positive integer).
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES.to_string())]
        max_pages: String,

        /// Maximum link depth (falls back to the default if not a positive integer).
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH.to_string())]
        max_depth: String,

        /// Translate the crawled pages into this language.
        #[arg(long, default_value = "", value_parser = translation_language)]
        translate_to: String,
    },
    /// Upload a PDF, Word, Excel, PowerPoint or text file.
    #[command(visible_alias = "upload")]
    File {
        /// Path of the file to upload.
        path: PathBuf,
    },
}

impl Command {
    fn mode(&self) -> ConversionMode {
        match self {
            Command::Webpage { .. } => ConversionMode::Webpage,
            Command::Crawl { .. } => ConversionMode::Multipage,
            Command::File { .. } => ConversionMode::File,
        }
    }
}

/// Normalise the case of a menu language (`korean` → `Korean`); any other
/// tag is passed through unchanged.
fn translation_language(raw: &str) -> Result<String, std::convert::Infallible> {
    let raw = raw.trim();
    Ok(TRANSLATION_LANGUAGES
        .iter()
        .find(|lang| lang.eq_ignore_ascii_case(raw))
        .map_or_else(|| raw.to_string(), |lang| lang.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and notification lines carry the user-facing feedback, so
    // library INFO logs are suppressed while it is active.
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

    // ── Wire the converter ───────────────────────────────────────────────
    let config = build_config(&cli)?;
    let bar = show_progress.then(new_spinner);
    // stdout carries the JSON document, so notifications go to the log.
    let notifier: SharedNotifier = if cli.json {
        Arc::new(TracingNotifier)
    } else {
        Arc::new(CliNotifier {
            bar: bar.clone(),
            quiet: cli.quiet,
        })
    };

    let controller = Arc::new(WorkflowController::new());
    controller.select_mode(cli.command.mode());
    let progress = bar.clone().map(|bar| spawn_progress(&controller, bar));

    let converter = Converter::new(config)
        .context("Failed to create the conversion client")?
        .with_notifier(notifier)
        .with_controller(Arc::clone(&controller));

    // ── Submit ───────────────────────────────────────────────────────────
    let outcome = match &cli.command {
        Command::Webpage { url } => converter.convert_webpage(url).await,
        Command::Crawl {
            url,
            max_pages,
            max_depth,
            translate_to,
        } => {
            let form = CrawlForm::new(url.as_str())
                .max_pages(max_pages)
                .max_depth(max_depth)
                .translate_to(translate_to.as_str());
            converter.crawl(&form).await
        }
        Command::File { path } => {
            let file = FileUpload::from_path(path, converter.config().max_file_bytes).await?;
            converter.convert_file(Some(file)).await
        }
    };

    if let Some(handle) = progress {
        handle.abort();
    }
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let result = outcome.context("Conversion was not submitted")?;
    emit(&cli, &result)
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder().base_url(cli.api_url.as_str());
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    builder.build().context("Invalid configuration")
}

/// Print or save a settled result. Failure results become a non-zero exit.
fn emit(cli: &Cli, result: &ConversionResult) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(result).context("Failed to serialise result")?;
        println!("{json}");
    }

    let Some(markdown) = result.markdown_text() else {
        anyhow::bail!(
            "Conversion failed: {}",
            result.error().unwrap_or("unknown error")
        );
    };

    if let Some(ref output) = cli.output {
        let path = if output.is_dir() {
            write_markdown_to_dir(result, output)?
        } else {
            write_markdown(result, output)?;
            output.clone()
        };
        if !cli.quiet {
            eprintln!(
                "{}  {}  →  {}",
                green("✔"),
                format_content_length(markdown),
                bold(&path.display().to_string())
            );
        }
    } else if !cli.json {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !markdown.ends_with('\n') {
            handle
                .write_all(b"\n")
                .context("Failed to write to stdout")?;
        }
    }

    if !cli.quiet && !cli.json {
        if let Some(pages) = result.pages() {
            for page in pages {
                let mark = if page.success { green("✓") } else { red("✗") };
                eprintln!(
                    "  {} {}  {}",
                    mark,
                    page.url,
                    dim(page.page_type.as_deref().unwrap_or("unknown"))
                );
            }
        }
        if let Some(saved) = result.saved_file_path() {
            eprintln!("   {} {}", dim("saved on server:"), saved);
        }
    }

    Ok(())
}
