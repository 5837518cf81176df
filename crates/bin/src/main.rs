//! Comps CLI binary.
//!
//! Provides the command-line interface for comparable-company analysis.

mod output;

use clap::{ArgAction, Parser, Subcommand};
use comps::data::{EdgarClient, GeminiClient, MarketDataSource, Ticker, YahooMarketData};
use comps::output::{CompsReport, ExportFormat, Exporter};
use comps::valuation::{StructuredExtractor, available_multiples};
use comps::{
    CompsConfig, CompsPipeline, Industry, PeerGroup, PipelineOptions, default_peers, peer_options,
};
use indicatif::{ProgressBar, ProgressStyle};
use output::OutputFormat;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type LivePipeline = CompsPipeline<EdgarClient, YahooMarketData, GeminiClient>;

#[derive(Parser)]
#[command(name = "comps")]
#[command(about = "Comps: comparable-company analysis from SEC filings", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/comps/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a company against its peers
    Analyze {
        /// Target ticker
        ticker: String,

        /// Comma-separated peers (default: suggested for the target's industry)
        #[arg(long, value_delimiter = ',')]
        peers: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write to a file, or a dated file inside a directory
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Companies valued at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Seconds to pause before each company after the first
        #[arg(long)]
        delay_secs: Option<u64>,

        /// Gemini model
        #[arg(long)]
        model: Option<String>,
    },

    /// Show the industry and suggested peers of a company
    Peers {
        /// Ticker to suggest peers for
        ticker: Option<String>,

        /// List curated industries
        #[arg(long)]
        list_industries: bool,
    },

    /// Search tickers by company name
    Search {
        /// Company name or symbol
        query: String,

        /// Maximum results
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Extract the financial record of one company
    Extract {
        /// Ticker
        ticker: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CompsConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            ticker,
            peers,
            format,
            output,
            concurrency,
            delay_secs,
            model,
        } => {
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            if let Some(delay_secs) = delay_secs {
                config.company_delay_secs = Some(delay_secs);
            }
            if let Some(model) = model {
                config.model = model;
            }
            analyze(&config, &ticker, &peers, format, output, cli.quiet).await?;
        }
        Commands::Peers {
            ticker,
            list_industries,
        } => match ticker {
            Some(ticker) if !list_industries => show_peers(&ticker).await?,
            _ => list_all_industries(),
        },
        Commands::Search { query, limit } => search(&query, limit).await?,
        Commands::Extract { ticker, json } => extract(&config, &ticker, json).await?,
    }

    Ok(())
}

fn build_pipeline(config: &CompsConfig) -> Result<LivePipeline, Box<dyn std::error::Error>> {
    config.validate(true)?;
    let identity = config.require_edgar_identity()?;

    let edgar = EdgarClient::with_rate_limit(identity, config.edgar_interval())?;
    let market = YahooMarketData::new()?;
    let api_key = config.google_api_key.clone().unwrap_or_default();
    let model = GeminiClient::new(api_key, config.model.clone())?;
    let extractor = StructuredExtractor::new(model).with_max_prompt_chars(config.max_prompt_chars);

    Ok(CompsPipeline::new(
        edgar,
        market,
        extractor,
        PipelineOptions::from(config),
    ))
}

async fn resolve_peer_group(
    market: &YahooMarketData,
    target: Ticker,
    peers: &[String],
) -> Result<PeerGroup, Box<dyn std::error::Error>> {
    if !peers.is_empty() {
        let peers = peers
            .iter()
            .map(|p| Ticker::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(PeerGroup::new(target, peers));
    }

    let industry = match market.profile(&target).await {
        Ok(profile) => profile.industry,
        Err(e) => {
            warn!(ticker = %target, error = %e, "profile unavailable, using fallback peers");
            None
        }
    };
    eprintln!("Industry: {}", industry.as_deref().unwrap_or("Unknown"));

    let peers = default_peers(industry.as_deref(), &target);
    Ok(PeerGroup::new(target, peers))
}

async fn analyze(
    config: &CompsConfig,
    ticker: &str,
    peers: &[String],
    format: OutputFormat,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = Ticker::parse(ticker)?;
    let pipeline = build_pipeline(config)?;

    let group = resolve_peer_group(pipeline.market(), target, peers).await?;
    let peer_list: Vec<&str> = group.peers().iter().map(Ticker::as_str).collect();
    eprintln!("Peers: {}", peer_list.join(", "));
    info!(companies = group.len(), "peer group resolved");

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(group.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Valuing {}...", group.target()));

    let result = pipeline
        .run_with(&group, |ticker, outcome| {
            pb.inc(1);
            match outcome {
                Ok(_) => pb.set_message(format!("{ticker} ✓")),
                Err(_) => pb.set_message(format!("{ticker} ✗")),
            }
        })
        .await?;
    pb.finish_with_message(format!(
        "Valued {} of {} companies",
        result.entries.len(),
        group.len()
    ));

    let report = result.into_report();
    if report.entries.is_empty() {
        print_failures(&report);
        return Err("no company could be valued".into());
    }
    if format == OutputFormat::Csv && !report.failures.is_empty() {
        print_failures(&report);
    }

    let rendered = format.render(&report)?;
    match output {
        Some(path) => {
            let today = chrono::Local::now().date_naive();
            let path = format.destination(&path, report.target.as_str(), today);
            std::fs::write(&path, rendered)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn print_failures(report: &CompsReport) {
    for failure in &report.failures {
        eprintln!(
            "  {} not valued ({}): {}",
            failure.ticker, failure.stage, failure.reason
        );
    }
}

async fn show_peers(ticker: &str) -> Result<(), Box<dyn std::error::Error>> {
    let target = Ticker::parse(ticker)?;
    let market = YahooMarketData::new()?;
    let profile = market.profile(&target).await?;
    let industry = profile.industry.as_deref();

    println!("{}", profile.name.as_deref().unwrap_or(target.as_str()));
    println!("  Sector:   {}", profile.sector.as_deref().unwrap_or("Unknown"));
    println!("  Industry: {}", industry.unwrap_or("Unknown"));
    if industry.and_then(Industry::from_name).is_none() {
        println!("  (no curated peer list, showing fallback peers)");
    }

    let defaults = default_peers(industry, &target);
    println!("\nPeer options (* selected by default):");
    for option in peer_options(industry, &target) {
        let marker = if defaults.contains(&option) { "*" } else { " " };
        println!("  {marker} {option}");
    }

    Ok(())
}

fn list_all_industries() {
    println!("Curated Industries:");
    println!("===================\n");

    for industry in Industry::all() {
        println!("{:36} {}", industry.name(), industry.peers().join(", "));
    }

    println!("\nMultiples:");
    for info in available_multiples() {
        println!("  {:12} {}", info.name, info.description);
    }
}

async fn search(query: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let market = YahooMarketData::new()?;
    let hits = market.search(query, limit).await?;
    if hits.is_empty() {
        println!("No matches for \"{query}\"");
        return Ok(());
    }

    for hit in hits {
        println!(
            "{:10} {:40} {}",
            hit.symbol,
            hit.name.as_deref().unwrap_or(""),
            hit.exchange.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn extract(
    config: &CompsConfig,
    ticker: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ticker = Ticker::parse(ticker)?;
    let pipeline = build_pipeline(config)?;
    let record = pipeline.extract_one(&ticker).await?;

    if json {
        println!("{}", record.export_to_string(ExportFormat::PrettyJson)?);
        return Ok(());
    }

    println!("{} fiscal {} ({})", record.ticker, record.fiscal_year, record.source);
    println!("  Revenue:    {:>16.0} {}", record.revenue, record.currency);
    println!("  Net Income: {:>16.0} {}", record.net_income, record.currency);
    println!("  EBITDA:     {:>16.0} {}", record.ebitda, record.currency);
    if let Some(filed) = record.filing_date {
        println!("  Filed:      {filed}");
    }
    Ok(())
}
