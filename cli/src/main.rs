use anyhow::Context;
use clap::Parser;
use sapper_core::{CellCount, Coord, GameEngine, Preset, RandomPlacer};
use std::path::PathBuf;

mod autoplay;
mod settings;

use autoplay::{Autoplayer, Summary};
use settings::{BoardSettings, Settings};

/// Plays headless games with a simple deduction strategy and reports how they went.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// TOML settings file, command line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Board preset: beginner, intermediate or expert
    #[arg(short, long)]
    preset: Option<Preset>,

    #[arg(long)]
    rows: Option<Coord>,

    #[arg(long)]
    cols: Option<Coord>,

    #[arg(long)]
    mines: Option<CellCount>,

    /// Number of games to play
    #[arg(short = 'n', long)]
    games: Option<u32>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

const DEFAULT_GAMES: u32 = 100;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let board = settings.board.merge(BoardSettings {
        preset: args.preset,
        rows: args.rows,
        cols: args.cols,
        mines: args.mines,
    });
    let config = board.resolve().context("Invalid board")?;
    let games = args.games.or(settings.games).unwrap_or(DEFAULT_GAMES);
    let seed = args
        .seed
        .or(settings.seed)
        .unwrap_or_else(|| RandomPlacer::from_entropy().seed());
    log::info!(
        "Playing {} games on {}x{} with {} mines, seed {}",
        games,
        config.rows(),
        config.cols(),
        config.mines,
        seed
    );

    let mut player = Autoplayer::new(seed);
    let mut records = Vec::with_capacity(games as usize);
    for game in 0..games {
        let mut engine = GameEngine::with_seed(config, seed.wrapping_add(u64::from(game)))?;
        let record = player.play(&mut engine)?;
        log::debug!("Game {} ended {:?} after {} moves", game, record.phase, record.moves);
        records.push(record);
    }

    let summary = Summary::from_records(config, &records);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}x{} board, {} mines",
            summary.config.rows(),
            summary.config.cols(),
            summary.config.mines
        );
        println!(
            "games: {}  wins: {}  losses: {}  win rate: {:.1}%",
            summary.games,
            summary.wins,
            summary.losses,
            summary.win_rate * 100.0
        );
        println!(
            "mean moves: {:.1}  mean guesses: {:.2}  mean time: {:.3}ms",
            summary.mean_moves, summary.mean_guesses, summary.mean_elapsed_ms
        );
    }

    Ok(())
}
