use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// `(level, mines on the default board)`, one row per difficulty in ascending order.
const DIFFICULTY_TABLE: [(Difficulty, u8, CellCount); 4] = [
    (Difficulty::Beginner, 1, 10),
    (Difficulty::Intermediate, 2, 15),
    (Difficulty::Advanced, 3, 20),
    (Difficulty::Expert, 4, 30),
];

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
    ];

    const fn row(self) -> (Difficulty, u8, CellCount) {
        DIFFICULTY_TABLE[self as usize]
    }

    /// Numeric level, also used as the score multiplier.
    pub const fn level(self) -> u8 {
        self.row().1
    }

    pub const fn mine_count(self) -> CellCount {
        self.row().2
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Beginner => "beginner",
            Intermediate => "intermediate",
            Advanced => "advanced",
            Expert => "expert",
        }
    }

    /// Board configuration for this difficulty on a `side`×`side` grid.
    pub fn board_config(self, side: Side) -> Result<BoardConfig> {
        BoardConfig::new(side, self.mine_count())
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = GameError;

    fn try_from(level: u8) -> Result<Self> {
        DIFFICULTY_TABLE
            .iter()
            .find(|&&(_, row_level, _)| row_level == level)
            .map(|&(difficulty, _, _)| difficulty)
            .ok_or(GameError::InvalidConfiguration)
    }
}

/// Accepts either the numeric level (`"3"`) or the name (`"advanced"`).
impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(level) = s.parse::<u8>() {
            return Self::try_from(level);
        }
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s))
            .ok_or(GameError::InvalidConfiguration)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_maps_levels_to_mines() {
        let expected = [(1, 10), (2, 15), (3, 20), (4, 30)];
        for (difficulty, (level, mines)) in Difficulty::ALL.into_iter().zip(expected) {
            assert_eq!(difficulty.level(), level);
            assert_eq!(difficulty.mine_count(), mines);
            assert_eq!(Difficulty::try_from(level), Ok(difficulty));
        }
    }

    #[test]
    fn every_difficulty_fits_the_default_board() {
        for difficulty in Difficulty::ALL {
            let config = difficulty.board_config(DEFAULT_SIDE).unwrap();
            assert_eq!(config.total_cells(), 100);
        }
        assert_eq!(
            Difficulty::Expert.board_config(5),
            Err(GameError::InvalidConfiguration)
        );
    }

    #[test]
    fn unknown_levels_are_rejected() {
        assert_eq!(Difficulty::try_from(0), Err(GameError::InvalidConfiguration));
        assert_eq!(Difficulty::try_from(5), Err(GameError::InvalidConfiguration));
    }

    #[test]
    fn parses_from_select_values() {
        assert_eq!("2".parse(), Ok(Difficulty::Intermediate));
        assert_eq!(" Expert ".parse(), Ok(Difficulty::Expert));
        assert_eq!(
            "nightmare".parse::<Difficulty>(),
            Err(GameError::InvalidConfiguration)
        );
        assert_eq!("9".parse::<Difficulty>(), Err(GameError::InvalidConfiguration));
    }
}
