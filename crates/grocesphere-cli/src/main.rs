mod directory;
mod nearest;
mod simulate;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use grocesphere_core::OrderMode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "grocesphere")]
#[command(about = "Grocesphere locality and order-lifecycle engine")]
struct Cli {
    /// Store directory YAML; overrides `GROCESPHERE_STORES_PATH`.
    #[arg(long, global = true)]
    stores: Option<PathBuf>,

    /// Add two generated demo stores next to every queried location.
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the stores serving a location, closest first.
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Place an order and run a live session, printing events as JSON lines.
    Simulate(SimulateArgs),
}

#[derive(Debug, clap::Args)]
struct SimulateArgs {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,
    /// Walk toward this latitude during the session.
    #[arg(long, allow_hyphen_values = true, requires = "to_lng")]
    to_lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true, requires = "to_lat")]
    to_lng: Option<f64>,
    /// Number of location samples along the walk.
    #[arg(long, default_value_t = 30)]
    walk_steps: u32,
    /// Seconds between location samples.
    #[arg(long, default_value_t = 2)]
    walk_interval_secs: u64,
    #[arg(long, value_enum, default_value_t = ModeArg::Delivery)]
    mode: ModeArg,
    /// Cart line as `<product-id>[:<quantity>]`; repeatable.
    #[arg(long = "item", value_parser = parse_item)]
    items: Vec<(String, u32)>,
    /// Accept store-switch suggestions instead of declining them.
    #[arg(long)]
    accept_switches: bool,
    /// Leave the order unpaid instead of settling it at checkout.
    #[arg(long)]
    pay_later: bool,
    /// JSON-lines file of backend order rows to push as authoritative updates.
    /// `{order_id}` in a row is replaced with the id of the placed order.
    #[arg(long)]
    feed: Option<PathBuf>,
    /// Seconds between pushed feed rows.
    #[arg(long, default_value_t = 15)]
    feed_interval_secs: u64,
    /// Stop after this many seconds even if orders are still live.
    #[arg(long, default_value_t = 600)]
    max_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Delivery,
    Pickup,
}

impl From<ModeArg> for OrderMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Delivery => OrderMode::Delivery,
            ModeArg::Pickup => OrderMode::Pickup,
        }
    }
}

fn parse_item(raw: &str) -> Result<(String, u32), String> {
    let (id, quantity) = match raw.split_once(':') {
        Some((id, qty)) => {
            let qty: u32 = qty
                .parse()
                .map_err(|_| format!("invalid quantity '{qty}'"))?;
            (id, qty)
        }
        None => (raw, 1),
    };
    if id.trim().is_empty() {
        return Err("product id must be non-empty".to_string());
    }
    if quantity == 0 {
        return Err("quantity must be at least 1".to_string());
    }
    Ok((id.to_string(), quantity))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = grocesphere_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(env = %config.env, "cli: configuration loaded");
    if let Some(path) = cli.stores {
        config.stores_path = path;
    }

    match cli.command {
        Some(Commands::Nearest { lat, lng, json }) => {
            nearest::run_nearest(&config, cli.demo, lat, lng, json)?;
        }
        Some(Commands::Simulate(args)) => {
            simulate::run_simulate(&config, cli.demo, args).await?;
        }
        None => println!("grocesphere: use --help to list commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
