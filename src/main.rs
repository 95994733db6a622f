use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use feedpane::{
    Config, FeedMenu, FeedRenderer, HttpFetcher, LoadCoordinator, LoadStatus, MenuController,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Get the config directory path (~/.config/feedpane/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedpane"))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Html,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "feedpane", about = "Load a feed into the content pane and print it")]
struct Args {
    /// Config file (defaults to ~/.config/feedpane/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the feed menu and exit
    #[arg(long)]
    list: bool,

    /// Toggle the menu this many times and print its state
    #[arg(long, value_name = "N")]
    toggle_menu: Option<u32>,

    /// Output format for the loaded feed
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Feed ids to load back-to-back; only the last one is shown
    #[arg(value_name = "FEED_ID", default_values_t = [0usize])]
    feeds: Vec<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let registry = Arc::new(config.registry().context("Failed to build feed registry")?);

    if args.list {
        let menu = FeedMenu::from_registry(&registry);
        for item in menu.iter() {
            let url = registry.get(item.feed_id).map(|f| f.url.as_str()).unwrap_or("");
            println!("{:>3}  {}  {}", item.feed_id, item.name, url);
        }
        return Ok(());
    }

    if let Some(times) = args.toggle_menu {
        let mut menu = MenuController::new();
        for _ in 0..times {
            menu.toggle();
        }
        println!("menu {}", if menu.is_hidden() { "hidden" } else { "visible" });
        return Ok(());
    }

    let client = HttpFetcher::build_client().context("Failed to build HTTP client")?;
    let fetcher = HttpFetcher::new(client)
        .with_timeout(config.fetch_timeout())
        .with_max_size(config.max_feed_bytes);
    let mut coordinator = LoadCoordinator::new(
        Arc::clone(&registry),
        Arc::new(fetcher),
        FeedRenderer::new(config.snippet_width),
    );

    let mut tickets = Vec::with_capacity(args.feeds.len());
    for &feed_id in &args.feeds {
        tickets.push(coordinator.request(feed_id)?);
    }
    coordinator.settle().await;

    let mut outcome = None;
    for ticket in tickets {
        let seq = ticket.seq();
        match ticket.wait().await {
            LoadStatus::Superseded => tracing::debug!(seq, "Load superseded"),
            status => outcome = Some(status),
        }
    }

    match outcome {
        Some(LoadStatus::Failed(e)) => return Err(e.into()),
        Some(LoadStatus::Committed) => {}
        Some(LoadStatus::Superseded) | None => anyhow::bail!("No feed was loaded"),
    }

    let fragment = coordinator
        .slot()
        .fragment()
        .context("Content area is empty after a successful load")?;
    match args.format {
        Format::Text => print!("{}", fragment.text()),
        Format::Html => print!("{}", fragment.html()),
        Format::Json => println!("{}", serde_json::to_string_pretty(fragment)?),
    }

    Ok(())
}
