/// Length of one side of the square board.
pub type Side = u8;

/// Flat cell index, `row * side + col`.
pub type CellIndex = u16;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Board coordinates `(row, col)`.
pub type RowCol = (Side, Side);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for RowCol {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn square(side: Side) -> CellCount {
    let side = side as CellCount;
    side.saturating_mul(side)
}

/// Splits a flat index into `(row, col)`. The caller guarantees `index < side²`.
pub const fn row_col(index: CellIndex, side: Side) -> RowCol {
    let side = side as CellIndex;
    ((index / side) as Side, (index % side) as Side)
}

pub const fn flat_index((row, col): RowCol, side: Side) -> CellIndex {
    row as CellIndex * side as CellIndex + col as CellIndex
}
