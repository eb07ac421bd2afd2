use alloc::vec::Vec;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

pub trait LayoutGenerator {
    fn generate(self, config: BoardConfig) -> Result<MineLayout>;
}

/// How mines are drawn out of the shuffled index list. Both produce a uniformly random subset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementStrategy {
    /// Shuffle once and split off the tail.
    #[default]
    SingleShuffle,
    /// Reshuffle the remaining indices before popping each mine.
    ShuffleAndPop,
}

/// Disjoint split of every board index into mines and safe cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub mines: Vec<CellIndex>,
    pub safe: Vec<CellIndex>,
}

/// Splits `[0, cell_count)` into `mine_count` mines and the remaining safe cells.
pub fn partition_cells<R: Rng + ?Sized>(
    cell_count: CellCount,
    mine_count: CellCount,
    strategy: PlacementStrategy,
    rng: &mut R,
) -> Result<Partition> {
    if mine_count == 0 || mine_count >= cell_count {
        return Err(GameError::InvalidConfiguration);
    }

    let mut safe: Vec<CellIndex> = (0..cell_count).collect();
    let mines = match strategy {
        PlacementStrategy::SingleShuffle => {
            shuffle(&mut safe, rng);
            safe.split_off(usize::from(cell_count - mine_count))
        }
        PlacementStrategy::ShuffleAndPop => {
            let mut mines = Vec::with_capacity(mine_count.into());
            for _ in 0..mine_count {
                shuffle(&mut safe, rng);
                // non-empty: fewer mines than cells
                if let Some(mine) = safe.pop() {
                    mines.push(mine);
                }
            }
            mines
        }
    };

    Ok(Partition { mines, safe })
}

/// Purely random layouts from a seed, so a game can be replayed.
#[derive(Clone, Debug, PartialEq)]
pub struct ShuffleLayoutGenerator {
    seed: u64,
    strategy: PlacementStrategy,
}

impl ShuffleLayoutGenerator {
    pub fn new(seed: u64, strategy: PlacementStrategy) -> Self {
        Self { seed, strategy }
    }
}

impl LayoutGenerator for ShuffleLayoutGenerator {
    fn generate(self, config: BoardConfig) -> Result<MineLayout> {
        config.validate()?;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let partition =
            partition_cells(config.total_cells(), config.mines, self.strategy, &mut rng)?;
        log::debug!(
            "generated {} mines on {}x{} board (seed {:#x}, {:?})",
            partition.mines.len(),
            config.side,
            config.side,
            self.seed,
            self.strategy
        );

        MineLayout::from_mine_indices(config, &partition.mines)
    }
}
