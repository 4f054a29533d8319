use rand::prelude::*;
use sapper_core::*;
use serde::Serialize;
use std::time::Duration;

/// How a single game played out.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct GameRecord {
    pub phase: Phase,
    pub moves: u32,
    pub guesses: u32,
    pub revealed: CellCount,
    pub elapsed: Duration,
}

/// Plays using only what a player can see: single-cell deductions first, a random hidden cell when stuck.
pub(crate) struct Autoplayer {
    rng: SmallRng,
}

impl Autoplayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn play<C: Clock>(&mut self, engine: &mut GameEngine<C>) -> Result<GameRecord> {
        let mut moves = 0;
        let mut guesses = 0;

        while !engine.is_finished() {
            let deduced = deduce(engine)?;
            if deduced > 0 {
                moves += deduced;
                continue;
            }

            let Some(target) = self.pick_hidden(engine)? else {
                log::warn!("No hidden cell left to guess on an unfinished board");
                break;
            };
            log::trace!("Guessing {target:?}");
            engine.reveal(target)?;
            moves += 1;
            guesses += 1;
        }

        Ok(GameRecord {
            phase: engine.phase(),
            moves,
            guesses,
            revealed: engine.revealed_count(),
            elapsed: engine.elapsed(),
        })
    }

    fn pick_hidden<C: Clock>(&mut self, engine: &GameEngine<C>) -> Result<Option<Coord2>> {
        let mut hidden = Vec::new();
        for coords in engine.config().iter_coords() {
            if engine.cell_at(coords)? == CellState::Hidden {
                hidden.push(coords);
            }
        }
        Ok(hidden.choose(&mut self.rng).copied())
    }
}

/// One sweep of the two basic rules over every numbered cell, returns how many moves it made.
///
/// - every unrevealed neighbour is a mine when their number equals the count: flag the hidden ones
/// - every hidden neighbour is safe when the flags already match the count: chord
fn deduce<C: Clock>(engine: &mut GameEngine<C>) -> Result<u32> {
    let config = engine.config();
    let mut moves = 0;

    for coords in config.iter_coords() {
        if engine.is_finished() {
            break;
        }
        let CellState::Revealed(count) = engine.cell_at(coords)? else {
            continue;
        };
        if count == 0 {
            continue;
        }

        let mut hidden = Vec::new();
        let mut flagged = 0;
        for pos in config.neighbors(coords)? {
            match engine.cell_at(pos)? {
                CellState::Hidden => hidden.push(pos),
                CellState::Flagged => flagged += 1,
                CellState::Revealed(_) => {}
            }
        }
        if hidden.is_empty() {
            continue;
        }

        if usize::from(count) == hidden.len() + flagged {
            for pos in hidden {
                engine.toggle_flag(pos)?;
                moves += 1;
            }
        } else if usize::from(count) == flagged {
            engine.chord_reveal(coords)?;
            moves += 1;
        }
    }

    Ok(moves)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct Summary {
    pub config: GameConfig,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub mean_moves: f64,
    pub mean_guesses: f64,
    pub mean_elapsed_ms: f64,
}

impl Summary {
    pub fn from_records(config: GameConfig, records: &[GameRecord]) -> Self {
        let games = records.len() as u32;
        let wins = records.iter().filter(|r| r.phase == Phase::Won).count() as u32;
        let losses = records.iter().filter(|r| r.phase == Phase::Lost).count() as u32;
        let mean = |total: f64| if games == 0 { 0.0 } else { total / f64::from(games) };

        Self {
            config,
            games,
            wins,
            losses,
            win_rate: mean(f64::from(wins)),
            mean_moves: mean(records.iter().map(|r| f64::from(r.moves)).sum()),
            mean_guesses: mean(records.iter().map(|r| f64::from(r.guesses)).sum()),
            mean_elapsed_ms: mean(
                records
                    .iter()
                    .map(|r| r.elapsed.as_secs_f64() * 1000.0)
                    .sum(),
            ),
        }
    }
}
