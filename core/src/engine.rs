use core::fmt;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use web_time::{Duration, Instant};

use crate::types::nd_index;
use crate::*;

/// Valid transitions:
/// - AwaitingFirstMove -> Playing
/// - AwaitingFirstMove -> Won (first reveal opens every safe cell)
/// - Playing -> Won
/// - Playing -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No cell opened yet, mines not placed
    #[default]
    AwaitingFirstMove,
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub const fn is_awaiting_first_move(self) -> bool {
        matches!(self, Self::AwaitingFirstMove)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

enum Minefield {
    Pending(Box<dyn MinePlacer>),
    Placed(MineLayout),
}

impl fmt::Debug for Minefield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(_) => f.write_str("Pending"),
            Self::Placed(layout) => f.debug_tuple("Placed").field(layout).finish(),
        }
    }
}

/// State of one game, from the first click to a win or a loss.
///
/// Start a new game by replacing the engine, nothing is carried over.
#[derive(Debug)]
pub struct GameEngine<C: Clock = SystemClock> {
    config: GameConfig,
    minefield: Minefield,
    board: Array2<CellState>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    phase: Phase,
    triggered_mine: Option<Coord2>,
    clock: C,
    started_at: Option<Instant>,
    final_elapsed: Option<Duration>,
}

impl GameEngine<SystemClock> {
    /// Random board of the given size, mines are placed around the first revealed cell.
    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        let config = GameConfig::new((rows, cols), mines)?;
        Self::with_parts(config, RandomPlacer::from_entropy(), SystemClock)
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self::build(preset.config(), Box::new(RandomPlacer::from_entropy()), SystemClock)
    }

    /// Reproducible random board.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_parts(config, RandomPlacer::new(seed), SystemClock)
    }

    /// Board with pre-chosen mines.
    pub fn with_layout(layout: MineLayout) -> Result<Self> {
        let config = layout.game_config();
        Self::with_parts(config, FixedPlacer::new(layout), SystemClock)
    }
}

impl<C: Clock> GameEngine<C> {
    /// Fails when `config` is invalid or `placer` cannot fill it.
    pub fn with_parts(config: GameConfig, placer: impl MinePlacer + 'static, clock: C) -> Result<Self> {
        placer.check(config)?;
        Ok(Self::build(config, Box::new(placer), clock))
    }

    fn build(config: GameConfig, placer: Box<dyn MinePlacer>, clock: C) -> Self {
        log::debug!(
            "New {}x{} game with {} mines",
            config.rows(),
            config.cols(),
            config.mines
        );
        Self {
            config,
            minefield: Minefield::Pending(placer),
            board: Array2::default(nd_index(config.size)),
            revealed_count: 0,
            flagged_count: 0,
            phase: Phase::default(),
            triggered_mine: None,
            clock,
            started_at: None,
            final_elapsed: None,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// How many mines have not been flagged yet, negative when there are more flags than mines
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count as isize)
    }

    /// The mine that ended the game, if it was lost
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<CellState> {
        let coords = self.config.validate_coords(coords)?;
        Ok(self.board[nd_index(coords)])
    }

    /// Every mine on the board, empty until the first reveal has placed them.
    pub fn mine_coordinates(&self) -> BTreeSet<Coord2> {
        match &self.minefield {
            Minefield::Pending(_) => BTreeSet::new(),
            Minefield::Placed(layout) => layout.mine_coordinates(),
        }
    }

    /// Time since the first reveal, frozen once the game has ended and zero before it starts.
    pub fn elapsed(&self) -> Duration {
        match (self.final_elapsed, self.started_at) {
            (Some(final_elapsed), _) => final_elapsed,
            (None, Some(started_at)) => self.clock.now().saturating_duration_since(started_at),
            (None, None) => Duration::ZERO,
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed().as_secs()
    }

    /// Open a hidden cell, flood-filling through cells with no adjacent mines.
    ///
    /// Flagged or already revealed cells and moves after the game ended are ignored.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.config.validate_coords(coords)?;

        if self.phase.is_finished() || self.board[nd_index(coords)] != CellState::Hidden {
            return Ok(RevealResult::unchanged(self.phase));
        }

        Ok(self.reveal_hidden(coords))
    }

    /// Open a hidden cell, or open every hidden neighbour of a revealed cell whose count is matched by flags.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealResult> {
        let coords = self.config.validate_coords(coords)?;

        if self.phase.is_finished() {
            return Ok(RevealResult::unchanged(self.phase));
        }

        let cell = self.board[nd_index(coords)];
        Ok(match cell {
            CellState::Hidden => self.reveal_hidden(coords),
            CellState::Revealed(count) if count == self.count_flagged_neighbors(coords) => {
                let mut result = RevealResult::unchanged(self.phase);
                for pos in NeighborIter::new(coords, self.config.size) {
                    if self.phase.is_finished() {
                        break;
                    }
                    // earlier neighbours may have flood-filled this one already
                    if self.board[nd_index(pos)] == CellState::Hidden {
                        result = result | self.reveal_hidden(pos);
                    }
                }
                result
            }
            CellState::Revealed(_) | CellState::Flagged => RevealResult::unchanged(self.phase),
        })
    }

    /// Toggle the flag on a hidden cell. Flags are not limited to the mine count.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagResult> {
        let coords = self.config.validate_coords(coords)?;
        let cell = &mut self.board[nd_index(coords)];

        if self.phase.is_finished() || cell.is_revealed() {
            return Ok(FlagResult {
                coords,
                flagged: *cell == CellState::Flagged,
                changed: false,
            });
        }

        let flagged = match *cell {
            CellState::Hidden => {
                *cell = CellState::Flagged;
                self.flagged_count += 1;
                true
            }
            _ => {
                *cell = CellState::Hidden;
                self.flagged_count -= 1;
                false
            }
        };
        log::debug!("Flag at {coords:?} set to {flagged}");

        Ok(FlagResult {
            coords,
            flagged,
            changed: true,
        })
    }

    fn reveal_hidden(&mut self, coords: Coord2) -> RevealResult {
        if self.phase.is_awaiting_first_move() {
            self.start(coords);
        }

        let Minefield::Placed(layout) = &self.minefield else {
            log::error!("Reveal at {coords:?} before mines were placed");
            return RevealResult::unchanged(self.phase);
        };

        if layout.contains_mine(coords) {
            log::debug!("Mine hit at {coords:?}");
            self.triggered_mine = Some(coords);
            self.finish(Phase::Lost);
            return RevealResult {
                revealed: Vec::new(),
                detonated: Some(coords),
                phase: self.phase,
            };
        }

        let revealed = flood_fill(layout, &mut self.board, coords);
        self.revealed_count += revealed.len() as CellCount;
        log::debug!(
            "Revealed {} cells from {:?}, {}/{} safe cells open",
            revealed.len(),
            coords,
            self.revealed_count,
            self.config.safe_cell_count()
        );

        if self.revealed_count == self.config.safe_cell_count() {
            self.finish(Phase::Won);
        }

        RevealResult {
            revealed,
            detonated: None,
            phase: self.phase,
        }
    }

    /// Places the mines around `safe` and starts the clock, only ever runs once per game.
    fn start(&mut self, safe: Coord2) {
        if let Minefield::Pending(placer) = &mut self.minefield {
            let layout = placer.place(self.config, safe);
            debug_assert_eq!(layout.game_config(), self.config);
            debug_assert!(!layout.contains_mine(safe));
            self.minefield = Minefield::Placed(layout);
        }
        self.phase = Phase::Playing;
        self.started_at = Some(self.clock.now());
        log::debug!("Game started at {safe:?}");
    }

    fn finish(&mut self, phase: Phase) {
        if self.phase.is_finished() {
            return;
        }
        self.final_elapsed = Some(self.elapsed());
        self.phase = phase;
        log::debug!("Game ended {:?} after {:?}", phase, self.elapsed());
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        NeighborIter::new(coords, self.config.size)
            .filter(|&pos| self.board[nd_index(pos)] == CellState::Flagged)
            .count() as u8
    }
}

/// Opens `start` and spreads through zero-count cells using an explicit stack, so board size never limits depth.
fn flood_fill(layout: &MineLayout, board: &mut Array2<CellState>, start: Coord2) -> Vec<RevealedCell> {
    let mut revealed = Vec::new();
    let mut to_visit = vec![start];

    while let Some(coords) = to_visit.pop() {
        let cell = &mut board[nd_index(coords)];
        // skip flagged, already opened and mined cells
        if *cell != CellState::Hidden || layout.contains_mine(coords) {
            continue;
        }

        let adjacent_mines = layout.adjacent_mine_count(coords);
        *cell = CellState::Revealed(adjacent_mines);
        revealed.push(RevealedCell {
            coords,
            adjacent_mines,
        });
        log::trace!("Opened {coords:?}, adjacent mines: {adjacent_mines}");

        if adjacent_mines == 0 {
            to_visit.extend(
                layout
                    .iter_neighbors(coords)
                    .filter(|&pos| board[nd_index(pos)] == CellState::Hidden),
            );
        }
    }

    revealed
}
