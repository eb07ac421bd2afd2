use serde::{Deserialize, Serialize};

/// Player-visible state of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Flagged,
    Questioned,
    Revealed,
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

    /// Next state in the right-click cycle. `Revealed` has none.
    pub const fn next_mark(self) -> Option<Self> {
        match self {
            Self::Hidden => Some(Self::Flagged),
            Self::Flagged => Some(Self::Questioned),
            Self::Questioned => Some(Self::Hidden),
            Self::Revealed => None,
        }
    }
}

/// Canonical per-cell record stored by the reveal engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    /// Only meaningful when `is_mine` is false.
    pub adjacent_mines: u8,
    pub state: CellState,
    pub disabled: bool,
}

/// What the presentation layer should draw for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayState {
    Blank,
    Flag,
    Mark,
    Number(u8),
    /// Mine shown after a loss.
    Mine,
    /// Mine shown after a win.
    Heart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_cycle_through_three_states() {
        let mut state = CellState::Hidden;
        let mut seen = [CellState::Hidden; 3];
        for slot in seen.iter_mut() {
            state = state.next_mark().unwrap();
            *slot = state;
        }
        assert_eq!(
            seen,
            [CellState::Flagged, CellState::Questioned, CellState::Hidden]
        );
        assert_eq!(CellState::Revealed.next_mark(), None);
    }
}
