use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use cluster_cache::{
    Cluster,
    actors::sweeper::SweeperHandle,
    config::{Config, read_config_file},
    ingest::ingest_lines,
    util::get_config_file,
};
use tokio::io::BufReader;
use tokio::spawn;
use tracing::{debug, error, info, instrument, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: Option<String>,

    /// Seconds between sweep passes (overrides config and environment)
    #[arg(long)]
    interval: Option<u64>,

    /// Do not read samples from stdin
    #[arg(long)]
    no_stdin: bool,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![("cluster_cache", LevelFilter::TRACE)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config = match args.file.clone().or_else(get_config_file) {
        Some(path) => read_config_file(&path)?,
        None => Config::default(),
    };

    let mut config = config.with_env_overrides();
    if let Some(interval) = args.interval {
        config.sweep.interval = interval;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = load_config(&args)?;
    debug!("using config: {config:?}");

    let cluster = Arc::new(Cluster::new(&config.cluster));
    let sweeper = SweeperHandle::spawn(cluster.clone(), &config.sweep);

    if config.report_interval > 0 {
        spawn(report_cluster(
            cluster.clone(),
            Duration::from_secs(config.report_interval),
        ));
    }

    if !args.no_stdin {
        let cluster = cluster.clone();
        spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            if let Err(e) = ingest_lines(stdin, &cluster).await {
                error!("stdin ingest failed: {e:#}");
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    if let Some(stats) = sweeper.get_stats().await {
        debug!("final sweep stats: {stats:?}");
    }

    sweeper.shutdown().await?;

    Ok(())
}

#[instrument(skip_all)]
async fn report_cluster(cluster: Arc<Cluster>, period: Duration) {
    let mut ticker = tokio::time::interval(period);

    loop {
        ticker.tick().await;

        let snapshot = cluster.snapshot(Utc::now());
        info!(
            "cluster holds {} hosts and {} metrics",
            snapshot.hosts.len(),
            snapshot.metric_count()
        );

        match serde_json::to_string(&snapshot) {
            Ok(document) => trace!("snapshot: {document}"),
            Err(e) => error!("failed to serialize snapshot: {e}"),
        }
    }
}
