#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use adjacency::*;
pub use cell::*;
pub use clock::*;
pub use difficulty::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use shuffle::*;
pub use types::*;

mod adjacency;
mod cell;
mod clock;
mod difficulty;
mod engine;
mod error;
mod generator;
mod session;
mod shuffle;
mod types;

/// Side of the only board shape the game offers.
pub const DEFAULT_SIDE: Side = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub side: Side,
    pub mines: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(side: Side, mines: CellCount) -> Self {
        Self { side, mines }
    }

    /// Checks that at least one mine and at least one safe cell fit on the board.
    pub fn new(side: Side, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(side, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let total = self.total_cells();
        if total < 2 || self.mines == 0 || self.mines >= total {
            log::warn!(
                "rejected board config: side {}, {} mines for {} cells",
                self.side,
                self.mines,
                total
            );
            return Err(GameError::InvalidConfiguration);
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        square(self.side)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

/// Fixed placement of mines on a board, immutable for the duration of a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MineLayoutRepr")]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

/// Serialized form of [`MineLayout`], checked before it becomes one.
#[derive(Deserialize)]
struct MineLayoutRepr {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl TryFrom<MineLayoutRepr> for MineLayout {
    type Error = GameError;

    fn try_from(repr: MineLayoutRepr) -> Result<Self> {
        let (rows, cols) = repr.mine_mask.dim();
        let side = match Side::try_from(rows) {
            Ok(side) if rows == cols => side,
            _ => {
                log::warn!("rejected mine mask of {}x{} cells", rows, cols);
                return Err(GameError::InvalidConfiguration);
            }
        };
        BoardConfig::new(side, repr.mine_count)?;

        let marked = repr.mine_mask.iter().filter(|&&is_mine| is_mine).count();
        if marked != usize::from(repr.mine_count) {
            log::warn!("mine mask holds {} mines, expected {}", marked, repr.mine_count);
            return Err(GameError::InvalidConfiguration);
        }

        Ok(Self {
            mine_mask: repr.mine_mask,
            mine_count: repr.mine_count,
        })
    }
}

impl MineLayout {
    /// Builds a layout with mines at exactly `mines`, which must hold `config.mines` distinct in-range indices.
    pub fn from_mine_indices(config: BoardConfig, mines: &[CellIndex]) -> Result<Self> {
        config.validate()?;

        let mut mine_mask: Array2<bool> = Array2::default((config.side, config.side).to_nd_index());
        for &index in mines {
            if index >= config.total_cells() {
                return Err(GameError::OutOfBoundsIndex);
            }
            let cell = &mut mine_mask[row_col(index, config.side).to_nd_index()];
            if *cell {
                log::warn!("duplicate mine index {}", index);
                return Err(GameError::InvalidConfiguration);
            }
            *cell = true;
        }

        if mines.len() != usize::from(config.mines) {
            log::warn!("expected {} mines, got {}", config.mines, mines.len());
            return Err(GameError::InvalidConfiguration);
        }

        Ok(Self {
            mine_mask,
            mine_count: config.mines,
        })
    }

    pub fn config(&self) -> BoardConfig {
        BoardConfig::new_unchecked(self.side(), self.mine_count)
    }

    pub fn side(&self) -> Side {
        // the mask is always built from a `Side`, so this never truncates
        self.mine_mask.dim().0 as Side
    }

    pub fn total_cells(&self) -> CellCount {
        square(self.side())
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn validate_index(&self, index: CellIndex) -> Result<CellIndex> {
        if index < self.total_cells() {
            Ok(index)
        } else {
            Err(GameError::OutOfBoundsIndex)
        }
    }

    pub fn contains_mine(&self, index: CellIndex) -> bool {
        self[index]
    }

    pub fn mine_indices(&self) -> Vec<CellIndex> {
        (0..self.total_cells()).filter(|&index| self[index]).collect()
    }

    pub fn safe_indices(&self) -> Vec<CellIndex> {
        (0..self.total_cells()).filter(|&index| !self[index]).collect()
    }

    pub fn adjacent_mine_count(&self, index: CellIndex) -> u8 {
        // at most 8 neighbors
        neighbors(index, self.side()).filter(|&pos| self[pos]).count() as u8
    }
}

impl Index<CellIndex> for MineLayout {
    type Output = bool;

    fn index(&self, index: CellIndex) -> &Self::Output {
        &self.mine_mask[row_col(index, self.side()).to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed(CellState),
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed(_) => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    /// A safe cell was opened, `opened` counts the clicked cell plus any cascade.
    Revealed {
        opened: CellCount,
    },
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed { .. } => true,
            HitMine => true,
        }
    }
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Revealed { opened: a }, Revealed { opened: b }) => Revealed {
                opened: a.saturating_add(b),
            },
            (Revealed { opened }, _) => Revealed { opened },
            (_, Revealed { opened }) => Revealed { opened },
            (NoChange, NoChange) => NoChange,
        }
    }
}
