use super::*;

/// Uses a layout chosen up front, for replays and deterministic tests.
///
/// If the first move lands on one of the mines, that mine is moved to the first free cell in row-major order so the
/// mine count and the safe-first-move guarantee both hold.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedPlacer {
    layout: MineLayout,
}

impl FixedPlacer {
    pub fn new(layout: MineLayout) -> Self {
        Self { layout }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        MineLayout::from_mine_coords(size, mine_coords).map(Self::new)
    }

    pub fn layout(&self) -> &MineLayout {
        &self.layout
    }
}

impl MinePlacer for FixedPlacer {
    fn check(&self, config: GameConfig) -> Result<()> {
        config.validate()?;
        if self.layout.game_config() != config {
            log::warn!(
                "Fixed layout {:?} does not fit a {}x{} board with {} mines",
                self.layout.game_config(),
                config.rows(),
                config.cols(),
                config.mines
            );
            return Err(GameError::InvalidConfiguration {
                rows: config.rows(),
                cols: config.cols(),
                mines: config.mines,
            });
        }
        Ok(())
    }

    fn place(&mut self, config: GameConfig, safe: Coord2) -> MineLayout {
        debug_assert_eq!(self.layout.game_config(), config);

        let mut layout = self.layout.clone();
        if layout.contains_mine(safe) {
            let free = config
                .iter_coords()
                .find(|&pos| pos != safe && !layout.contains_mine(pos));
            if let Some(free) = free {
                log::warn!("Fixed layout has a mine on first move {safe:?}, moved to {free:?}");
                layout[safe] = false;
                layout[free] = true;
            }
        }
        layout
    }
}
