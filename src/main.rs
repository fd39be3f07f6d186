use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scout_intel_lib::config::{ScoutConfig, MATCH_LIMIT_DEFAULT};
use scout_intel_lib::render::{render_comparison, render_report, render_snapshot};
use scout_intel_lib::session::ScoutSession;
use scout_intel_lib::{Game, ScoutService};

#[derive(Parser, Debug)]
#[command(version, about = "Esports scouting reports from GRID data", long_about = None)]
struct Args {
    /// valorant or lol
    #[arg(short, long, default_value = "valorant", global = true)]
    game: Game,

    /// Number of recent matches the analysis covers (3, 5 or 10 in the UI)
    #[arg(short, long, default_value_t = MATCH_LIMIT_DEFAULT, global = true)]
    matches: u32,

    /// Print the structured result as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scout one team or player
    Report {
        term: String,

        /// Also print the aggregated GRID statistics
        #[arg(long)]
        raw: bool,
    },
    /// Head-to-head comparison of two teams
    Compare { team_a: String, team_b: String },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.matches == 0 {
        anyhow::bail!("--matches must be at least 1");
    }

    let mut session = ScoutSession::new();

    // Credentials are checked before any client exists
    let service = match ScoutConfig::from_env().and_then(|c| ScoutService::from_config(&c)) {
        Ok(service) => service,
        Err(e) => {
            session.fail(&e);
            eprintln!("{}", e.diagnostics());
            anyhow::bail!(session.error.unwrap_or_else(|| e.to_string()));
        }
    };

    session.begin();
    match &args.command {
        Command::Report { term, raw } => {
            match service.scout(term, args.game, args.matches).await {
                Ok(outcome) => session.finish_report(outcome),
                Err(e) => session.fail(&e),
            }
            if let (Some(report), Some(snapshot)) = (&session.report, &session.snapshot) {
                if args.json {
                    let value = if *raw {
                        serde_json::json!({ "report": report, "snapshot": snapshot })
                    } else {
                        serde_json::to_value(report)?
                    };
                    println!("{}", serde_json::to_string_pretty(&value)?);
                } else {
                    if *raw {
                        println!("{}", render_snapshot(snapshot));
                    }
                    print!("{}", render_report(report, service.reference()));
                }
            }
        }
        Command::Compare { team_a, team_b } => {
            match service.compare(team_a, team_b, args.game, args.matches).await {
                Ok(comparison) => session.finish_comparison(comparison),
                Err(e) => session.fail(&e),
            }
            if let Some(comparison) = &session.comparison {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(comparison)?);
                } else {
                    print!("{}", render_comparison(comparison));
                }
            }
        }
    }

    if let Some(message) = session.error {
        anyhow::bail!(message);
    }
    Ok(())
}
