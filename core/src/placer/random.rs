use super::*;
use crate::types::nd_index;

/// Uniform placement over every cell except the first one opened.
///
/// Seeded, so the same seed and first move always produce the same board.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomPlacer {
    seed: u64,
}

impl RandomPlacer {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Fresh seed from the thread-local generator, for callers that do not care about reproducing a board.
    pub fn from_entropy() -> Self {
        use rand::prelude::*;

        Self::new(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl MinePlacer for RandomPlacer {
    fn place(&mut self, config: GameConfig, safe: Coord2) -> MineLayout {
        use rand::prelude::*;

        let mut candidates: Vec<Coord2> = config.iter_coords().filter(|&pos| pos != safe).collect();
        let mines = usize::from(config.mines).min(candidates.len());
        if mines < usize::from(config.mines) {
            log::warn!(
                "Only {} cells available for {} requested mines, placing {}",
                candidates.len(),
                config.mines,
                mines
            );
        }

        // partial Fisher-Yates, the first `mines` slots end up as a uniform sample
        let mut rng = SmallRng::seed_from_u64(self.seed);
        for i in 0..mines {
            let j = rng.random_range(i..candidates.len());
            candidates.swap(i, j);
        }

        let mut mine_mask: Array2<bool> = Array2::default(nd_index(config.size));
        for &pos in &candidates[..mines] {
            mine_mask[nd_index(pos)] = true;
        }

        log::debug!(
            "Placed {} mines on {}x{} board with seed {}, safe cell {:?}",
            mines,
            config.rows(),
            config.cols(),
            self.seed,
            safe
        );
        MineLayout::from_mine_mask(mine_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_respects_count_and_safe_cell() {
        let config = GameConfig::preset(Preset::Beginner);

        for seed in 0..200 {
            let safe = ((seed % 9) as Coord, (seed / 9 % 9) as Coord);
            let layout = RandomPlacer::new(seed).place(config, safe);

            assert_eq!(layout.mine_count(), config.mines);
            assert_eq!(layout.size(), config.size);
            assert!(!layout.contains_mine(safe));
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let config = GameConfig::preset(Preset::Expert);

        let first = RandomPlacer::new(42).place(config, (3, 7));
        let second = RandomPlacer::new(42).place(config, (3, 7));

        assert_eq!(first, second);
    }

    #[test]
    fn densest_board_leaves_only_the_safe_cell() {
        let config = GameConfig::new((4, 4), 15).unwrap();

        let layout = RandomPlacer::new(7).place(config, (2, 1));

        assert_eq!(layout.mine_count(), 15);
        assert!(!layout.contains_mine((2, 1)));
    }

    #[test]
    fn entropy_seeds_differ() {
        let seeds: std::collections::BTreeSet<u64> = (0..8).map(|_| RandomPlacer::from_entropy().seed()).collect();
        assert!(seeds.len() > 1);
    }
}
