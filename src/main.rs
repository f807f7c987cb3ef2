use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iptv_playlists::{
    cache::CacheStore,
    config::{Config, defaults::DEFAULT_CONFIG_FILE},
    models::{Category, label_lookup},
    pipeline::PlaylistPipeline,
};

#[derive(Parser)]
#[command(name = "iptv-playlists")]
#[command(version)]
#[command(about = "Fetch, group and cache iptv-org playlists by category")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Playlist category: genre, language, country or streams
    #[arg(short = 'k', long, default_value = "genre")]
    category: Category,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Print the selected groups as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Group key to include in JSON output (repeatable, default all)
    #[arg(short, long = "group", value_name = "KEY")]
    groups: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("iptv_playlists={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting iptv-playlists v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    let mut cache = CacheStore::from_config(&config.cache).await;
    let mut pipeline = PlaylistPipeline::from_config(&config, cli.category)?;
    let output = pipeline.run(&mut cache).await?;
    cache.close().await?;

    let label = label_lookup(&config.labels);
    if cli.json {
        let groups = if cli.groups.is_empty() {
            output.playlist.presentation_order(label)
        } else {
            output.playlist.materialize(&cli.groups, label)
        };
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        for group in output.summary(label) {
            println!("{:>6}  {} ({})", group.count, group.label, group.key);
        }
        println!(
            "{} channels in {} groups{}",
            output.channel_count,
            output.group_keys.len(),
            if output.from_cache { " (cached)" } else { "" }
        );
    }

    Ok(())
}
