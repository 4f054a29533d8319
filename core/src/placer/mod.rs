use crate::*;
pub use fixed::*;
pub use random::*;

mod fixed;
mod random;

/// Decides where the mines go once the first cell to be opened is known.
///
/// Implementations must return a layout of `config.size` holding exactly `config.mines` mines, none of them on
/// `safe`.
pub trait MinePlacer {
    /// Rejects a `config` this placer cannot fill, called once when the game is created.
    fn check(&self, config: GameConfig) -> Result<()> {
        config.validate()
    }

    fn place(&mut self, config: GameConfig, safe: Coord2) -> MineLayout;
}
