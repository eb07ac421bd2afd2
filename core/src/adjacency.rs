use bitflags::bitflags;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

bitflags! {
    /// Board boundaries a cell touches.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Edges: u8 {
        const TOP    = 1;
        const BOTTOM = 1 << 1;
        const LEFT   = 1 << 2;
        const RIGHT  = 1 << 3;
    }
}

impl Edges {
    pub fn of(index: CellIndex, side: Side) -> Self {
        let side = CellIndex::from(side);
        let mut edges = Edges::empty();
        if index < side {
            edges |= Edges::TOP;
        }
        if index >= side * side.saturating_sub(1) {
            edges |= Edges::BOTTOM;
        }
        if index % side == 0 {
            edges |= Edges::LEFT;
        }
        if (index + 1) % side == 0 {
            edges |= Edges::RIGHT;
        }
        edges
    }
}

/// Offsets of the 3x3 neighborhood as `(row delta, col delta)`.
const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub type NeighborOffsets = SmallVec<[isize; 8]>;

/// Flat-index offsets from `index` to each of its neighbors.
///
/// Only boundary membership decides which offsets survive: left and right edges drop the matching column, top and
/// bottom rows drop the matching row, and corners drop both. Every returned offset stays inside the board.
pub fn neighbor_offsets(index: CellIndex, side: Side) -> NeighborOffsets {
    let edges = Edges::of(index, side);
    let width = isize::from(side);

    DISPLACEMENTS
        .iter()
        .filter(|&&(dr, dc)| {
            !(dr < 0 && edges.contains(Edges::TOP)
                || dr > 0 && edges.contains(Edges::BOTTOM)
                || dc < 0 && edges.contains(Edges::LEFT)
                || dc > 0 && edges.contains(Edges::RIGHT))
        })
        .map(|&(dr, dc)| dr * width + dc)
        .collect()
}

/// Iterates the flat indices of the neighbors of `index`.
pub fn neighbors(index: CellIndex, side: Side) -> impl Iterator<Item = CellIndex> + use<> {
    neighbor_offsets(index, side)
        .into_iter()
        .map(move |offset| index.wrapping_add_signed(offset as i16))
}

/// Mine count of every cell's neighborhood, indexed by `(row, col)`. Values on mine cells are 0 and meaningless.
pub fn adjacency_counts(layout: &MineLayout) -> Array2<u8> {
    let side = layout.side();
    let mut counts: Array2<u8> = Array2::default((side, side).to_nd_index());
    for index in layout.safe_indices() {
        counts[row_col(index, side).to_nd_index()] = layout.adjacent_mine_count(index);
    }
    counts
}
