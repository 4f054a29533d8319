use core::fmt;
use core::ops::{BitOr, Index, IndexMut};
use core::str::FromStr;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use types::nd_index;

pub use clock::*;
pub use engine::*;
pub use error::*;
pub use placer::*;
pub use tile::*;
pub use types::*;

mod clock;
mod engine;
mod error;
mod placer;
mod tile;
mod types;

/// The three standard board presets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Beginner, Preset::Intermediate, Preset::Expert];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
        }
    }

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::new_unchecked((9, 9), 10),
            Self::Intermediate => GameConfig::new_unchecked((16, 16), 40),
            Self::Expert => GameConfig::new_unchecked((16, 30), 99),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown preset {s:?}, expected beginner, intermediate or expert"))
    }
}

/// Board dimensions `(rows, cols)` and the number of mines to place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validated constructor, the board must keep at least one safe cell for the first move.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub const fn preset(preset: Preset) -> Self {
        preset.config()
    }

    pub fn validate(&self) -> Result<()> {
        let (rows, cols) = self.size;
        if rows == 0 || cols == 0 || self.mines == 0 || self.mines >= self.total_cells() {
            return Err(GameError::InvalidConfiguration {
                rows,
                cols,
                mines: self.mines,
            });
        }
        Ok(())
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        cell_count(self.size)
    }

    pub const fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        coords.0 < self.size.0 && coords.1 < self.size.1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds {
                row: coords.0,
                col: coords.1,
            })
        }
    }

    /// In-bounds Moore neighbourhood of `coords`: 3 cells in a corner, 8 in the interior.
    pub fn neighbors(&self, coords: Coord2) -> Result<Neighbors> {
        let coords = self.validate_coords(coords)?;
        Ok(NeighborIter::new(coords, self.size).collect())
    }

    /// Every coordinate on the board in row-major order.
    pub fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = self.size;
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }
}

impl From<Preset> for GameConfig {
    fn from(preset: Preset) -> Self {
        preset.config()
    }
}

/// Where the mines are, fixed for the lifetime of one game once placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(nd_index(size));

        for &(row, col) in mine_coords {
            if row >= size.0 || col >= size.1 {
                return Err(GameError::OutOfBounds { row, col });
            }
            mine_mask[nd_index((row, col))] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.mine_mask.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub fn mine_coordinates(&self) -> BTreeSet<Coord2> {
        self.mine_mask
            .indexed_iter()
            .filter(|&(_, &is_mine)| is_mine)
            .map(|((row, col), _)| (row as Coord, col as Coord))
            .collect()
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.mine_mask[(row as usize, col as usize)]
    }
}

impl IndexMut<Coord2> for MineLayout {
    fn index_mut(&mut self, (row, col): Coord2) -> &mut Self::Output {
        &mut self.mine_mask[(row as usize, col as usize)]
    }
}

/// A cell opened by a reveal, with the number of mines around it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedCell {
    pub coords: Coord2,
    pub adjacent_mines: u8,
}

/// Everything a reveal changed, so the caller only has to redraw the delta.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealResult {
    pub revealed: Vec<RevealedCell>,
    pub detonated: Option<Coord2>,
    pub phase: Phase,
}

impl RevealResult {
    pub(crate) fn unchanged(phase: Phase) -> Self {
        Self {
            revealed: Vec::new(),
            detonated: None,
            phase,
        }
    }

    pub fn has_update(&self) -> bool {
        !self.revealed.is_empty() || self.detonated.is_some()
    }
}

/// Used to merge results when several cells are opened by one move.
impl BitOr for RevealResult {
    type Output = RevealResult;

    fn bitor(mut self, rhs: Self) -> Self::Output {
        use Phase::*;

        self.revealed.extend(rhs.revealed);
        self.detonated = self.detonated.or(rhs.detonated);
        self.phase = match (self.phase, rhs.phase) {
            // lost has priority
            (Lost, _) | (_, Lost) => Lost,
            (Won, _) | (_, Won) => Won,
            (Playing, _) | (_, Playing) => Playing,
            (AwaitingFirstMove, AwaitingFirstMove) => AwaitingFirstMove,
        };
        self
    }
}

/// Outcome of toggling a flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagResult {
    pub coords: Coord2,
    /// Flag state of the cell after the call.
    pub flagged: bool,
    pub changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_standard_boards() {
        assert_eq!(GameConfig::preset(Preset::Beginner), GameConfig::new_unchecked((9, 9), 10));
        assert_eq!(
            GameConfig::preset(Preset::Intermediate),
            GameConfig::new_unchecked((16, 16), 40)
        );
        assert_eq!(GameConfig::preset(Preset::Expert), GameConfig::new_unchecked((16, 30), 99));
        for preset in Preset::ALL {
            assert_eq!(preset.config().validate(), Ok(()));
        }
    }

    #[test]
    fn preset_parses_case_insensitively() {
        assert_eq!("Expert".parse::<Preset>(), Ok(Preset::Expert));
        assert_eq!(Preset::Intermediate.to_string(), "intermediate");
        assert!("hard".parse::<Preset>().is_err());
    }

    #[test]
    fn config_rejects_degenerate_boards() {
        let invalid = |size: Coord2, mines| {
            matches!(GameConfig::new(size, mines), Err(GameError::InvalidConfiguration { .. }))
        };

        assert!(invalid((0, 9), 10));
        assert!(invalid((9, 0), 10));
        assert!(invalid((9, 9), 0));
        assert!(invalid((9, 9), 81));
        assert!(invalid((9, 9), 200));
        assert!(GameConfig::new((9, 9), 80).is_ok());
        assert!(GameConfig::new((1, 2), 1).is_ok());
    }

    #[test]
    fn config_neighbors_are_bounds_checked() {
        let config = GameConfig::preset(Preset::Beginner);

        assert_eq!(config.neighbors((0, 0)).unwrap().len(), 3);
        assert_eq!(config.neighbors((4, 4)).unwrap().len(), 8);
        assert_eq!(
            config.neighbors((9, 0)),
            Err(GameError::OutOfBounds { row: 9, col: 0 })
        );
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = GameConfig::preset(Preset::Expert);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<GameConfig>(&json).unwrap(), config);
    }

    #[test]
    fn layout_counts_adjacent_mines() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (0, 1), (2, 2)]).unwrap();

        assert_eq!(layout.mine_count(), 3);
        assert_eq!(layout.safe_cell_count(), 6);
        assert_eq!(layout.adjacent_mine_count((1, 1)), 3);
        assert_eq!(layout.adjacent_mine_count((1, 0)), 2);
        assert_eq!(layout.adjacent_mine_count((2, 0)), 0);
        assert_eq!(
            layout.mine_coordinates(),
            BTreeSet::from([(0, 0), (0, 1), (2, 2)])
        );
    }

    #[test]
    fn layout_rejects_out_of_bounds_mines() {
        assert_eq!(
            MineLayout::from_mine_coords((3, 3), &[(3, 0)]),
            Err(GameError::OutOfBounds { row: 3, col: 0 })
        );
    }

    #[test]
    fn merged_results_keep_loss_priority() {
        let revealed = RevealResult {
            revealed: vec![RevealedCell {
                coords: (0, 0),
                adjacent_mines: 1,
            }],
            detonated: None,
            phase: Phase::Playing,
        };
        let lost = RevealResult {
            revealed: Vec::new(),
            detonated: Some((1, 1)),
            phase: Phase::Lost,
        };

        let merged = revealed | lost;

        assert_eq!(merged.phase, Phase::Lost);
        assert_eq!(merged.detonated, Some((1, 1)));
        assert_eq!(merged.revealed.len(), 1);
    }
}
