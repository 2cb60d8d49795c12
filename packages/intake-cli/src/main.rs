//! Intake runner: collect raw batches from a source, then normalize them
//! into the canonical output aggregate.
//!
//! The two stages can run separately (`collect`, `transform`) or back to
//! back (`run`). The date window defaults to yesterday by UTC day
//! boundary; `--today` and `--date-range` override it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use harvest::collect::{CollectionController, DateWindow, Session};
use harvest::config::SourceConfig;
use harvest::download::HttpDownloader;
use harvest::store::BatchStore;
use harvest::{PoliteAccessor, StaticAccessor};
use normalize::{OutputAggregate, Transformer};

#[derive(Parser)]
#[command(name = "openbids", version, about = "Procurement opportunity intake pipeline")]
struct Cli {
    /// Use today's UTC day as the window
    #[arg(long, global = true, conflicts_with = "date_range")]
    today: bool,

    /// Explicit window, inclusive: YYYY-MM-DD,YYYY-MM-DD
    #[arg(long, global = true, value_name = "FROM,TO")]
    date_range: Option<String>,

    /// Root directory for sessions and output
    #[arg(long, global = true, default_value = "./data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SourceArgs {
    /// Short source name, scopes ids and session directories
    #[arg(long)]
    source: String,

    /// Listing URL template with a {page} placeholder
    #[arg(long)]
    listing_url: String,

    /// Expected items per listing page
    #[arg(long)]
    page_size: Option<usize>,

    /// The source does not guarantee descending date order
    #[arg(long)]
    unordered: bool,

    /// Download attachments during collection
    #[arg(long)]
    download: bool,

    /// Sustained accessor requests per second
    #[arg(long, default_value_t = 2)]
    requests_per_second: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Collect a source into immutable raw batches
    Collect(SourceArgs),

    /// Normalize a previously collected session
    Transform {
        /// Session directory written by a collect run
        #[arg(long)]
        session_dir: PathBuf,

        /// Source name recorded on the normalized entities
        #[arg(long)]
        source: String,
    },

    /// Collect and normalize in one invocation
    Run(SourceArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let window = resolve_window(&cli)?;

    match cli.command {
        Command::Collect(ref args) => {
            collect(args, window, &cli.data_dir).await?;
        }
        Command::Transform {
            ref session_dir,
            ref source,
        } => {
            transform(session_dir.clone(), source, &cli.data_dir)?;
        }
        Command::Run(ref args) => {
            let session_dir = collect(args, window, &cli.data_dir).await?;
            transform(session_dir, &args.source, &cli.data_dir)?;
        }
    }

    Ok(())
}

/// Window precedence: explicit range, then --today, then yesterday.
fn resolve_window(cli: &Cli) -> Result<DateWindow> {
    if let Some(range) = &cli.date_range {
        return DateWindow::parse_range(range)
            .with_context(|| format!("invalid --date-range {range:?}"));
    }
    if cli.today {
        return Ok(DateWindow::today());
    }
    Ok(DateWindow::yesterday())
}

fn build_config(args: &SourceArgs) -> SourceConfig {
    let mut config = SourceConfig::new(&args.source, &args.listing_url);
    if let Some(page_size) = args.page_size {
        config = config.with_page_size(page_size);
    }
    if args.unordered {
        config = config.without_date_ordering();
    }
    if args.download {
        config = config.with_downloads(3);
    }
    config
}

/// Run the collection stage; returns the session directory.
async fn collect(args: &SourceArgs, window: DateWindow, data_dir: &Path) -> Result<PathBuf> {
    let config = build_config(args);
    let session = Session::new(&args.source, window);
    let store =
        BatchStore::create(data_dir.join("sessions"), &session).context("creating session store")?;
    let session_dir = store.session_dir().to_path_buf();

    let accessor = PoliteAccessor::new(
        StaticAccessor::new().context("building document accessor")?,
        args.requests_per_second,
    );

    let mut controller = CollectionController::new(accessor, config, session, store);
    if args.download {
        controller = controller
            .with_downloader(Box::new(HttpDownloader::new().context("building downloader")?));
    }

    let report = controller.run().await.context("collection run failed")?;
    info!(
        session = %report.session_id,
        admitted = report.items_admitted,
        failed = report.items_failed,
        batches = report.batches_written,
        "collect stage done"
    );
    println!("session: {}", session_dir.display());
    Ok(session_dir)
}

/// Run the normalization stage over one session directory.
fn transform(session_dir: PathBuf, source: &str, data_dir: &Path) -> Result<()> {
    let store = BatchStore::open(&session_dir)
        .with_context(|| format!("opening session {}", session_dir.display()))?;
    let batches = store.read_batches().context("reading batches")?;
    info!(batches = batches.len(), "transform stage starting");

    let output = Transformer::new(source).transform_batches(&batches);
    let aggregate = OutputAggregate::assemble(source, output);

    let path = aggregate
        .write_to(data_dir.join("normalized"))
        .context("writing normalized output")?;
    println!("normalized: {}", path.display());
    Ok(())
}
