//! Console driver exercising the trainer engine: a line-oriented REPL over
//! `Session::step`, backed by a YAML config. Not the intended end-user
//! surface (a real client would drive the same engine over its own
//! transport); this binary exists to demonstrate and manually test it.

mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use log::info;

use engine::{Command, EngineError, GameState, Session, SessionStats};

use crate::config::AppConfig;
use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "bj-trainer", about = "Blackjack card-counting trainer console")]
struct Cli {
    /// Path to a YAML config file; defaults to `~/.config/bj-trainer/config.yaml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli
        .config
        .or_else(AppConfig::default_path)
        .ok_or_else(|| CliError::Input("no config path given and no home directory found".into()))?;

    let config = if config_path.exists() {
        AppConfig::load(&config_path)?
    } else {
        info!("no config found at {config_path:?}, using defaults");
        AppConfig::default()
    };

    let mut session = Session::new(
        config.rules,
        config.counting_system,
        config.seed,
        engine::Cents(config.starting_bankroll_cents),
    )?;
    let mut stats = SessionStats::new();

    println!("bj-trainer ready. Commands: bet <cents>, deal, hit, stand, double, split, surrender,");
    println!("insurance <yes|no>, newround, resetgame, recommend, stats, quit");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| CliError::Input(e.to_string()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        if line == "stats" {
            print_stats(&stats);
            continue;
        }
        if line == "recommend" {
            match session.recommend_action() {
                Ok(action) => println!("recommended: {action:?}"),
                Err(e) => println!("error: {e}"),
            }
            continue;
        }

        match parse_command(line) {
            Ok(command) => match session.step(command) {
                Ok(report) => {
                    stats.apply_events(&report.events);
                    print_report(&report);
                }
                Err(EngineError::Validation(msg)) => println!("invalid: {msg}"),
                Err(e) => println!("error: {e}"),
            },
            Err(msg) => println!("unrecognized command: {msg}"),
        }

        io::stdout().flush().ok();
    }

    Ok(())
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or("");
    match head {
        "bet" => {
            let cents: i64 = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or("usage: bet <cents>")?;
            Ok(Command::PlaceBet(engine::Cents(cents)))
        }
        "deal" => Ok(Command::DealInitial),
        "hit" => Ok(Command::Hit),
        "stand" => Ok(Command::Stand),
        "double" => Ok(Command::Double),
        "split" => Ok(Command::Split),
        "surrender" => Ok(Command::Surrender),
        "insurance" => match parts.next() {
            Some("yes") => Ok(Command::TakeInsurance),
            Some("no") => Ok(Command::DeclineInsurance),
            _ => Err("usage: insurance <yes|no>".into()),
        },
        "playdealer" => Ok(Command::PlayDealer),
        "newround" => Ok(Command::StartNewRound),
        "resetgame" => Ok(Command::ResetGame),
        other => Err(format!("unknown command '{other}'")),
    }
}

fn print_report(report: &engine::StepReport) {
    for event in &report.events {
        println!("  {event:?}");
    }
    if report.state == GameState::DealerTurn {
        println!("(all hands resolved — send `playdealer`)");
    }
    println!("state: {:?}", report.state);
}

fn print_stats(stats: &SessionStats) {
    println!(
        "hands={} wins={} losses={} pushes={} blackjacks={} surrenders={} net={}",
        stats.hands_played,
        stats.wins,
        stats.losses,
        stats.pushes,
        stats.blackjacks,
        stats.surrenders,
        stats.net_result,
    );
}
