use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clash_scout::api::RiotApiClient;
use clash_scout::config::Config;
use clash_scout::display::output::{display_error, display_info, display_report, display_success};
use clash_scout::scout::{build_report, load_players, load_team, ScoutContext};
use indicatif::ProgressBar;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TEAM_SIZE: u64 = 5;

#[derive(Parser, Debug)]
#[command(name = "clash_scout")]
#[command(
    about = "Scout a clash team: roles, champion pools and ban suggestions",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Platform region, e.g. na1, euw1, kr (default: RIOT_REGION or na1)
    #[arg(short, long, global = true)]
    region: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scout the clash team a player is registered on
    Team {
        /// Any team member, as Name#TAG
        riot_id: String,
    },
    /// Scout a list of players without a registered team
    Players {
        /// One or more players, as Name#TAG
        #[arg(required = true)]
        riot_ids: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clash_scout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(region) = args.region {
        config.region = region;
    }

    let ctx = ScoutContext::new(config.settings.clone());
    info!(region = %config.region, match_limit = config.match_limit, "Starting scout");
    let client = RiotApiClient::new(config);

    let roster = match &args.command {
        Command::Team { riot_id } => {
            display_info(&format!("Looking up the clash team of {}", riot_id));
            let pb = ProgressBar::new(TEAM_SIZE);
            pb.set_message("Loading team members");
            let roster = load_team(&client, &ctx, riot_id, |name| {
                pb.set_message(name.to_string());
                pb.inc(1);
            })
            .with_context(|| format!("Could not load the team of {}", riot_id))?;
            pb.finish_and_clear();
            roster
        }
        Command::Players { riot_ids } => {
            display_info(&format!("Scouting {} players", riot_ids.len()));
            let pb = ProgressBar::new(riot_ids.len() as u64);
            pb.set_message("Loading players");
            let roster = load_players(&client, &ctx, riot_ids, |name| {
                pb.set_message(name.to_string());
                pb.inc(1);
            });
            pb.finish_and_clear();
            roster
        }
    };

    if roster.players.is_empty() {
        anyhow::bail!("None of the requested players could be found");
    }
    display_success(&format!("Loaded {} players", roster.players.len()));

    let report = build_report(roster, &ctx);
    display_report(&report).context("Failed to write the report")?;

    Ok(())
}
