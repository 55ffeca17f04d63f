mod render;

use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Context, Result};
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use mev_analysis::{build_report_with_top, ReportOutcome, DEFAULT_TOP_N};
use mev_data::config::{DEFAULT_BASE_URL, DEFAULT_SAMPLE_LIMIT};
use mev_data::{HeightRange, ObservatoryClient, ObservatoryConfig};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Example window shown by default: a handful of dYdX blocks with MEV.
const DEFAULT_INITIAL_HEIGHT: u64 = 20_510_255;
const DEFAULT_FINAL_HEIGHT: u64 = 20_510_258;

#[derive(Debug, Clone)]
struct AppContext {
    api_url: String,
    timeout: Option<Duration>,
    quiet: bool,
}

#[derive(Parser, Debug)]
#[command(name = "mev-report")]
#[command(about = "Block-level MEV report built from an observatory deployment")]
#[command(version)]
struct Cli {
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Observatory base URL.
    #[arg(long, global = true, env = "MEV_OBSERVATORY_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// HTTP timeout per request; the client default applies when unset.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, join and render the report for a block-height window.
    Report(ReportArgs),
    /// Ask for the window interactively, then render the report.
    Prompt(PromptArgs),
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Initial block height (inclusive).
    #[arg(long, default_value_t = DEFAULT_INITIAL_HEIGHT)]
    from_height: u64,

    /// Final block height (inclusive).
    #[arg(long, default_value_t = DEFAULT_FINAL_HEIGHT)]
    to_height: u64,

    #[arg(long, default_value_t = DEFAULT_SAMPLE_LIMIT)]
    limit: u64,

    /// Number of blocks in the top-N chart.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Output format: table (default), json or csv.
    #[arg(long, default_value = "table")]
    output: String,
}

#[derive(Args, Debug)]
struct PromptArgs {
    #[arg(long, default_value_t = DEFAULT_SAMPLE_LIMIT)]
    limit: u64,

    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = color_eyre::eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(eyre!(
                "unknown output format '{}'; use 'table', 'json', or 'csv'",
                s
            )),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    let ctx = AppContext {
        api_url: cli.api_url,
        timeout: cli.timeout_secs.map(Duration::from_secs),
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Report(args) => handle_report(&ctx, args).await,
        Commands::Prompt(args) => handle_prompt(&ctx, args).await,
    }
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .wrap_err("failed to initialize tracing filter")?;

    // stdout carries the report itself
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn handle_report(ctx: &AppContext, args: ReportArgs) -> Result<()> {
    let format = OutputFormat::from_str(&args.output)?;
    let range = HeightRange::new(args.from_height, args.to_height);

    run_report(ctx, range, args.limit, args.top, format).await
}

async fn handle_prompt(ctx: &AppContext, args: PromptArgs) -> Result<()> {
    let from_height: u64 = Input::new()
        .with_prompt("Initial Block Height")
        .default(DEFAULT_INITIAL_HEIGHT)
        .interact_text()
        .wrap_err("failed to read initial block height")?;

    let to_height: u64 = Input::new()
        .with_prompt("Final Block Height")
        .default(DEFAULT_FINAL_HEIGHT)
        .interact_text()
        .wrap_err("failed to read final block height")?;

    let confirmed = Confirm::new()
        .with_prompt("Get data?")
        .default(true)
        .interact()
        .wrap_err("failed to read confirmation")?;

    if !confirmed {
        info!("report cancelled");
        return Ok(());
    }

    let range = HeightRange::new(from_height, to_height);
    run_report(ctx, range, args.limit, args.top, OutputFormat::Table).await
}

async fn run_report(
    ctx: &AppContext,
    range: HeightRange,
    limit: u64,
    top: usize,
    format: OutputFormat,
) -> Result<()> {
    let mut config = ObservatoryConfig::custom(ctx.api_url.clone()).with_limit(limit);
    if let Some(timeout) = ctx.timeout {
        config = config.with_timeout(timeout);
    }
    let client = ObservatoryClient::new(config).wrap_err("failed to build observatory client")?;

    let pb = if format == OutputFormat::Table && !ctx.quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .wrap_err("failed to create progress style")?,
        );
        pb.set_message(format!("querying {} for blocks {range}", client.base_url()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };

    let outcome = build_report_with_top(range, &client, &client, top).await;
    pb.finish_and_clear();
    let outcome = outcome?;

    match format {
        OutputFormat::Table => print!("{}", render::render_outcome(&outcome, top)),
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Csv => print!("{}", render::render_csv_outcome(&outcome)?),
    }

    info!(
        from_height = range.from_height,
        to_height = range.to_height,
        api_url = %ctx.api_url,
        no_data = matches!(outcome, ReportOutcome::NoData { .. }),
        "report command finished"
    );

    Ok(())
}

fn print_json(outcome: &ReportOutcome) -> Result<()> {
    let json_str = serde_json::to_string_pretty(outcome).wrap_err("failed to serialize JSON")?;
    println!("{}", json_str);
    Ok(())
}
