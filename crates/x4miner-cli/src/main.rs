use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use x4miner_cli::commands::distance::{handle_distance, DistanceArgs};
use x4miner_cli::commands::duplicates::handle_duplicates;
use x4miner_cli::commands::factions::handle_factions;
use x4miner_cli::commands::locate::handle_locate;
use x4miner_cli::commands::nearest::{handle_nearest, NearestArgs};
use x4miner_cli::commands::trades::{handle_trades, TradesArgs};
use x4miner_cli::commands::GlobalOptions;
use x4miner_cli::output::OutputFormat;
use x4miner_cli::terminal::ColorPalette;
use x4miner_lib::DEFAULT_RESULT_LIMIT;

#[derive(Parser, Debug)]
#[command(author, version, about = "X4 universe snapshot routing and trade tools")]
struct Cli {
    /// Snapshot document to load (overrides X4MINER_SNAPSHOT).
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Disable ANSI colors in text output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Keep wrecked stations when loading the snapshot.
    #[arg(long, global = true)]
    wrecks: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank the most profitable trades between stations.
    Trades(TradesCommand),
    /// Shortest travel distance between two stations.
    Distance(DistanceCommand),
    /// Closest stations to a station, a component, or the player.
    Nearest(NearestCommand),
    /// World position of a component.
    Locate {
        /// Component id, e.g. `[0x1a2b]`.
        #[arg(long)]
        component: String,
    },
    /// Sectors and stations held by each faction.
    Factions,
    /// Station codes shared by more than one station.
    Duplicates {
        /// Only report this code.
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Args, Debug)]
struct TradesCommand {
    /// Number of deals to show.
    #[arg(short = 'n', long, default_value_t = DEFAULT_RESULT_LIMIT)]
    limit: usize,
    /// Cap on units moved per deal.
    #[arg(long)]
    max_cargo: Option<u64>,
    /// Rank by profit per kilometre instead of total profit.
    #[arg(long)]
    by_distance: bool,
    /// Route around sectors owned by hostile factions.
    #[arg(long)]
    avoid_hostile: bool,
    /// Route contraband around sectors that police it.
    #[arg(long)]
    avoid_illegal: bool,
    /// Start from the player's location, wallet, and hold.
    #[arg(long)]
    from_player: bool,
    /// Override the player's available credits.
    #[arg(long, requires = "from_player")]
    credits: Option<f64>,
    /// Override the player's cargo capacity.
    #[arg(long, requires = "from_player")]
    cargo: Option<u64>,
}

#[derive(Args, Debug)]
struct DistanceCommand {
    /// Origin station code.
    #[arg(long = "from")]
    from: String,
    /// Destination station code.
    #[arg(long = "to")]
    to: String,
    #[arg(long)]
    avoid_hostile: bool,
    #[arg(long)]
    avoid_illegal: bool,
}

#[derive(Args, Debug)]
struct NearestCommand {
    /// Station code to search around.
    #[arg(long, conflicts_with = "component")]
    station: Option<String>,
    /// Component id to search around.
    #[arg(long)]
    component: Option<String>,
    /// Number of stations to report.
    #[arg(short = 'k', long = "count", default_value_t = 1)]
    count: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let options = GlobalOptions {
        snapshot: cli.snapshot.as_deref(),
        format: cli.format,
        palette: ColorPalette::detect(cli.no_color),
        include_wrecks: cli.wrecks,
    };

    match cli.command {
        Command::Trades(cmd) => handle_trades(
            &options,
            &TradesArgs {
                limit: cmd.limit,
                max_cargo: cmd.max_cargo,
                by_distance: cmd.by_distance,
                avoid_hostile: cmd.avoid_hostile,
                avoid_illegal: cmd.avoid_illegal,
                from_player: cmd.from_player,
                credits: cmd.credits,
                cargo: cmd.cargo,
            },
        ),
        Command::Distance(cmd) => handle_distance(
            &options,
            &DistanceArgs {
                from: cmd.from,
                to: cmd.to,
                avoid_hostile: cmd.avoid_hostile,
                avoid_illegal: cmd.avoid_illegal,
            },
        ),
        Command::Nearest(cmd) => handle_nearest(
            &options,
            &NearestArgs {
                station: cmd.station,
                component: cmd.component,
                count: cmd.count,
            },
        ),
        Command::Locate { component } => handle_locate(&options, &component),
        Command::Factions => handle_factions(&options),
        Command::Duplicates { code } => handle_duplicates(&options, code.as_deref()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
