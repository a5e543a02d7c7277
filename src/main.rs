use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comp_finder::api::state::AppState;
use comp_finder::calculate::filter::{HeroExclusions, RegionSelection};
use comp_finder::calculate::recommend::{recommend, RecommendOptions};
use comp_finder::calculate::aggregate;
use comp_finder::config::AppConfig;
use comp_finder::fetch::{CompsSource, RestSource};
use comp_finder::models::TeamsBucket;
use comp_finder::parse_duration;

#[derive(Parser)]
#[command(name = "comp-finder")]
#[command(about = "Top-war comp aggregation and recommendation")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Row snapshot cache TTL (e.g., "15m", "900s")
        #[arg(long)]
        cache_ttl: Option<String>,
    },

    /// Fetch and print aggregated comps for a mode
    Comps {
        /// Game mode
        #[arg(long, default_value = "ts-forest")]
        mode: String,

        /// Region preset keys, comma-separated (e.g., "r1-20,r41p")
        #[arg(long)]
        regions: Option<String>,

        /// Comps to print per bucket
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Print a conflict-free comp selection for a bucket
    Recommend {
        /// Game mode
        #[arg(long, default_value = "ts-forest")]
        mode: String,

        /// Teams bucket ("2-3", "4-5", "6-7")
        #[arg(long)]
        bucket: String,

        /// Hero names to exclude, comma-separated
        #[arg(long)]
        exclude: Option<String>,

        /// Region preset keys, comma-separated
        #[arg(long)]
        regions: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting comp-finder v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            cache_ttl,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(ttl) = cache_ttl {
                let ttl = parse_duration(&ttl)
                    .with_context(|| format!("Invalid --cache-ttl: {ttl}"))?;
                config.pipeline.cache_ttl_seconds = ttl.as_secs();
            }

            let source = RestSource::new(config.source_config()?)?;
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = AppState::new(config, Arc::new(source));
            let app = comp_finder::api::build_router(state);

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Comps {
            mode,
            regions,
            limit,
        } => {
            let source = RestSource::new(config.source_config()?)?;
            let fetched = source.fetch_rows(&mode).await?;

            let regions = RegionSelection::from_csv(regions.as_deref().unwrap_or(""));
            let rows = regions.apply(&fetched.rows);
            let aggregation = aggregate(&rows, &config.pipeline.aggregate_options());

            println!(
                "{} rows for mode {} ({}){}",
                rows.len(),
                mode,
                regions.label(),
                if fetched.truncated { ", truncated" } else { "" }
            );
            println!(
                "skipped: {} no-teams, {} bad-winrate, {} too-unknown",
                aggregation.rejects.no_teams,
                aggregation.rejects.bad_winrate,
                aggregation.rejects.too_unknown
            );

            for bucket in TeamsBucket::ALL {
                let comps = aggregation.bucket(bucket);
                println!("\n[{bucket}] {} comps", comps.len());
                for comp in comps.iter().take(limit) {
                    println!(
                        "  {:5.1}%  x{:<3} {:6}  {} | {}",
                        comp.mean_win_rate,
                        comp.sample_count,
                        comp.density.to_string(),
                        comp.display.heroes.join(" - "),
                        comp.display.pet
                    );
                }
            }
        }
        Commands::Recommend {
            mode,
            bucket,
            exclude,
            regions,
        } => {
            let bucket = TeamsBucket::from_label(&bucket)
                .with_context(|| format!("Unknown bucket: {bucket} (expected 2-3, 4-5, 6-7)"))?;

            let source = RestSource::new(config.source_config()?)?;
            let fetched = source.fetch_rows(&mode).await?;

            let regions = RegionSelection::from_csv(regions.as_deref().unwrap_or(""));
            let exclusions = HeroExclusions::from_csv(exclude.as_deref().unwrap_or(""));
            let rows = regions.apply(&fetched.rows);
            let aggregation = aggregate(&rows, &config.pipeline.aggregate_options());

            let opts = RecommendOptions::for_bucket(bucket)
                .with_min_samples(config.pipeline.min_samples);
            let selected = recommend(aggregation.bucket(bucket), &exclusions, &opts);

            println!(
                "[{bucket}] selected {}/{} comps ({})",
                selected.len(),
                opts.target,
                regions.label()
            );
            for comp in &selected {
                println!(
                    "  {:5.1}%  x{:<3} {} | {}",
                    comp.mean_win_rate,
                    comp.sample_count,
                    comp.display.heroes.join(" - "),
                    comp.display.pet
                );
            }
            let total: f64 = selected.iter().map(|c| c.mean_win_rate).sum();
            println!("total win rate: {total:.1}");
        }
    }

    Ok(())
}
