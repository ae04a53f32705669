//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use docscout_core::{CrawlObserver, crawl_site};
use docscout_crawler::Walker;
use docscout_shared::{
    AppConfig, CrawlConfig, CrawlReport, PageFailure, VisitedPage, config_file_path, init_config,
    load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docscout: discover the pages of a documentation site.
#[derive(Parser)]
#[command(
    name = "docscout",
    version,
    about = "Discover every page of a documentation site from its index URL.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.docscout/docscout.toml.
    #[arg(long, global = true, env = "DOCSCOUT_CONFIG")]
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
    /// List the in-scope links of a single page without following them.
    Walk {
        /// Page URL to scan.
        url: String,

        #[command(flatten)]
        fetch: FetchArgs,

        /// Print a JSON array instead of one URL per line.
        #[arg(long)]
        json: bool,
    },

    /// Crawl a documentation tree breadth-first from one or more seeds.
    Crawl(CrawlArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `docscout crawl`. Each one overrides the config file.
#[derive(Args, Debug)]
pub(crate) struct CrawlArgs {
    /// Seed URL(s), typically a documentation index page.
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Maximum link distance from a seed.
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Stop after this many pages.
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Pages walked at once.
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,

    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Path glob to keep out of the crawl (repeatable).
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Print the full crawl report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// HTTP flags shared by `walk` and `crawl`.
#[derive(Args, Debug)]
pub(crate) struct FetchArgs {
    /// Retries for transient fetch failures.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl FetchArgs {
    fn apply(&self, config: &mut CrawlConfig) {
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
    }
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

/// Crates whose log output the verbosity flags control.
const LOG_TARGETS: [&str; 4] = [
    "docscout_cli",
    "docscout_core",
    "docscout_crawler",
    "docscout_shared",
];

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
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
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Walk { url, fetch, json } => cmd_walk(config_path, &url, &fetch, json).await,
        Command::Crawl(args) => cmd_crawl(config_path, &args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Load the explicit config file if one was given, else the user config.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Merge `docscout crawl` flags over the loaded config.
fn crawl_config(app: &AppConfig, args: &CrawlArgs) -> CrawlConfig {
    let mut config = CrawlConfig::from(app);
    if let Some(depth) = args.max_depth {
        config.max_depth = Some(depth);
    }
    if let Some(pages) = args.max_pages {
        config.max_pages = Some(pages);
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    args.fetch.apply(&mut config);
    config.exclude_patterns.extend(args.exclude.iter().cloned());
    config
}

async fn cmd_walk(
    config_path: Option<&Path>,
    url: &str,
    fetch: &FetchArgs,
    json: bool,
) -> Result<()> {
    let app = resolve_config(config_path)?;
    let mut config = CrawlConfig::from(&app);
    fetch.apply(&mut config);
    let walker = Walker::new(&config)?;

    info!(url, "walking page");
    let links: Vec<String> = walker
        .walk(url)
        .await
        .wrap_err_with(|| format!("could not walk {url}"))?
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else {
        for link in &links {
            println!("{link}");
        }
    }
    Ok(())
}

async fn cmd_crawl(config_path: Option<&Path>, args: &CrawlArgs) -> Result<()> {
    let app = resolve_config(config_path)?;
    let config = crawl_config(&app, args);

    info!(
        seeds = args.urls.len(),
        concurrency = config.concurrency,
        "crawling documentation"
    );

    let progress = CliProgress::new()?;
    let report = crawl_site(&args.urls, &config, &progress).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for url in report.visited_urls() {
            println!("{url}");
        }
        print_summary(&report);
    }
    Ok(())
}

/// Human-readable crawl summary on stderr, keeping stdout for URLs.
fn print_summary(report: &CrawlReport) {
    eprintln!();
    eprintln!("  Pages:    {}", report.visited.len());
    eprintln!("  Failed:   {}", report.failures.len());
    if report.skipped > 0 {
        eprintln!("  Excluded: {}", report.skipped);
    }
    eprintln!(
        "  Time:     {:.1}s",
        Duration::from_millis(report.duration_ms).as_secs_f64()
    );
    for failure in &report.failures {
        eprintln!("  ! {} ({})", failure.url, failure.error);
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Crawl observer that drives an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
    walked: AtomicUsize,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Ok(Self {
            spinner,
            walked: AtomicUsize::new(0),
        })
    }
}

impl CrawlObserver for CliProgress {
    fn page_visited(&self, page: &VisitedPage) {
        let n = self.walked.fetch_add(1, Ordering::Relaxed) + 1;
        self.spinner
            .set_message(format!("Walked [{n}] {} (+{} links)", page.url, page.discovered));
    }

    fn page_failed(&self, failure: &PageFailure) {
        self.spinner.set_message(format!("Skipped {}", failure.url));
    }

    fn done(&self, _report: &CrawlReport) {
        self.spinner.finish_and_clear();
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };
    let config = resolve_config(config_path)?;
    println!("# {}", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawl_args(argv: &[&str]) -> CrawlArgs {
        let cli = Cli::try_parse_from(argv).expect("parse");
        match cli.command {
            Command::Crawl(args) => args,
            _ => panic!("expected crawl"),
        }
    }

    #[test]
    fn crawl_flags_override_config() {
        let args = crawl_args(&[
            "docscout",
            "crawl",
            "https://example.com/docs/",
            "--max-depth",
            "2",
            "--concurrency",
            "4",
            "--exclude",
            "/docs/api/**",
        ]);

        let mut app = AppConfig::default();
        app.crawl.retries = 3;
        app.crawl.exclude_patterns = vec!["/docs/old/**".into()];

        let config = crawl_config(&app, &args);
        assert_eq!(config.max_depth, Some(2));
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.retries, 3);
        assert_eq!(config.max_pages, None);
        assert_eq!(config.exclude_patterns, vec!["/docs/old/**", "/docs/api/**"]);
    }

    #[test]
    fn crawl_accepts_several_seeds() {
        let args = crawl_args(&[
            "docscout",
            "crawl",
            "https://a.example.com/docs/",
            "https://b.example.com/guide/",
            "--json",
        ]);
        assert_eq!(args.urls.len(), 2);
        assert!(args.json);
    }

    #[test]
    fn crawl_requires_a_seed() {
        assert!(Cli::try_parse_from(["docscout", "crawl"]).is_err());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let parsed = Cli::try_parse_from([
            "docscout",
            "crawl",
            "https://example.com/docs/",
            "--concurrency",
            "0",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn walk_takes_fetch_flags() {
        let cli = Cli::try_parse_from([
            "docscout",
            "walk",
            "https://example.com/docs/",
            "--timeout",
            "3",
            "--retries",
            "2",
        ])
        .expect("parse");
        let Command::Walk { fetch, .. } = cli.command else {
            panic!("expected walk");
        };

        let mut config = CrawlConfig::default();
        fetch.apply(&mut config);
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.retries, 2);
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "docscout",
            "walk",
            "https://example.com/docs/",
            "-vv",
            "--log-format",
            "json",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(matches!(cli.command, Command::Walk { json: false, .. }));
    }
}
