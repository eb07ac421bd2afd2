use alloc::vec;
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Per-cell state machine plus flood-fill over a fixed mine layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RevealEngineRepr")]
pub struct RevealEngine {
    mine_layout: MineLayout,
    cells: Array2<Cell>,
    remaining_safe: CellCount,
    flag_count: Saturating<CellCount>,
    ended: bool,
    triggered_mine: Option<CellIndex>,
}

#[derive(Deserialize)]
struct RevealEngineRepr {
    mine_layout: MineLayout,
    cells: Array2<Cell>,
    remaining_safe: CellCount,
    flag_count: Saturating<CellCount>,
    ended: bool,
    triggered_mine: Option<CellIndex>,
}

impl TryFrom<RevealEngineRepr> for RevealEngine {
    type Error = GameError;

    fn try_from(repr: RevealEngineRepr) -> Result<Self> {
        let side = usize::from(repr.mine_layout.side());
        if repr.cells.dim() != (side, side) {
            log::warn!("cell grid {:?} does not match a side of {}", repr.cells.dim(), side);
            return Err(GameError::InvalidConfiguration);
        }
        if repr.remaining_safe > repr.mine_layout.safe_cell_count() {
            log::warn!("{} safe cells left on a board with fewer", repr.remaining_safe);
            return Err(GameError::InvalidConfiguration);
        }
        if let Some(index) = repr.triggered_mine {
            repr.mine_layout.validate_index(index)?;
        }

        Ok(Self {
            mine_layout: repr.mine_layout,
            cells: repr.cells,
            remaining_safe: repr.remaining_safe,
            flag_count: repr.flag_count,
            ended: repr.ended,
            triggered_mine: repr.triggered_mine,
        })
    }
}

impl RevealEngine {
    pub fn new(mine_layout: MineLayout) -> Self {
        let counts = adjacency_counts(&mine_layout);
        let side = mine_layout.side();
        let cells = Array2::from_shape_fn((side, side).to_nd_index(), |(row, col)| Cell {
            is_mine: mine_layout[flat_index((row as Side, col as Side), side)],
            adjacent_mines: counts[(row, col)],
            ..Default::default()
        });

        Self {
            remaining_safe: mine_layout.safe_cell_count(),
            mine_layout,
            cells,
            flag_count: Saturating(0),
            ended: false,
            triggered_mine: None,
        }
    }

    pub fn layout(&self) -> &MineLayout {
        &self.mine_layout
    }

    pub fn side(&self) -> Side {
        self.mine_layout.side()
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_layout.total_cells()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_layout.mine_count()
    }

    /// Safe cells not yet revealed.
    pub fn remaining_safe(&self) -> CellCount {
        self.remaining_safe
    }

    pub fn opened_count(&self) -> CellCount {
        self.mine_layout.safe_cell_count() - self.remaining_safe
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count.0
    }

    pub fn all_safe_revealed(&self) -> bool {
        self.remaining_safe == 0
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn triggered_mine(&self) -> Option<CellIndex> {
        self.triggered_mine
    }

    pub fn cell(&self, index: CellIndex) -> Result<Cell> {
        let index = self.mine_layout.validate_index(index)?;
        Ok(self.cells[self.nd_index(index)])
    }

    /// Opens `index`. Zero-count cells cascade into their neighborhood until bordered by numbered cells.
    pub fn reveal(&mut self, index: CellIndex) -> Result<RevealOutcome> {
        let index = self.mine_layout.validate_index(index)?;

        if self.cells[self.nd_index(index)].state.is_revealed() {
            return Ok(RevealOutcome::NoChange);
        }
        self.check_not_ended()?;

        if self.mine_layout[index] {
            let nd_index = self.nd_index(index);
            self.clear_mark(nd_index);
            self.cells[nd_index].state = CellState::Revealed;
            self.triggered_mine = Some(index);
            self.ended = true;
            log::debug!("mine hit at {}", index);
            return Ok(RevealOutcome::HitMine);
        }

        let opened = self.flood_fill(index);
        log::trace!(
            "opened {} cells from {}, {} safe left",
            opened,
            index,
            self.remaining_safe
        );
        Ok(RevealOutcome::Revealed { opened })
    }

    /// Advances the right-click cycle `Hidden -> Flagged -> Questioned -> Hidden`.
    pub fn cycle_mark(&mut self, index: CellIndex) -> Result<MarkOutcome> {
        let index = self.mine_layout.validate_index(index)?;
        self.check_not_ended()?;

        let nd_index = self.nd_index(index);
        let cell = &mut self.cells[nd_index];
        let Some(next) = cell.state.next_mark() else {
            return Ok(MarkOutcome::NoChange);
        };

        match (cell.state, next) {
            (_, CellState::Flagged) => self.flag_count += 1,
            (CellState::Flagged, _) => self.flag_count -= 1,
            _ => {}
        }
        cell.state = next;

        Ok(MarkOutcome::Changed(next))
    }

    /// Ends the game on the board: every cell is shown and locked.
    pub fn reveal_all(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.state = CellState::Revealed;
            cell.disabled = true;
        }
        self.flag_count = Saturating(0);
        self.ended = true;
    }

    fn flood_fill(&mut self, start: CellIndex) -> CellCount {
        let side = self.side();
        let mut opened = 0;
        let mut to_visit = vec![start];

        while let Some(index) = to_visit.pop() {
            let nd_index = self.nd_index(index);
            let cell = self.cells[nd_index];
            if cell.state.is_revealed() || cell.is_mine {
                continue;
            }

            self.clear_mark(nd_index);
            self.cells[nd_index].state = CellState::Revealed;
            self.remaining_safe -= 1;
            opened += 1;

            if cell.adjacent_mines == 0 {
                to_visit.extend(
                    neighbors(index, side)
                        .filter(|&pos| !self.cells[self.nd_index(pos)].state.is_revealed()),
                );
            }
        }

        opened
    }

    fn clear_mark(&mut self, nd_index: [usize; 2]) {
        let cell = &mut self.cells[nd_index];
        if cell.state == CellState::Flagged {
            self.flag_count -= 1;
        }
        cell.state = CellState::Hidden;
    }

    fn check_not_ended(&self) -> Result<()> {
        if self.ended {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    fn nd_index(&self, index: CellIndex) -> [usize; 2] {
        row_col(index, self.side()).to_nd_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn engine(side: Side, mines: &[CellIndex]) -> RevealEngine {
        let config = BoardConfig::new(side, mines.len() as CellCount).unwrap();
        RevealEngine::new(MineLayout::from_mine_indices(config, mines).unwrap())
    }

    fn state_at(engine: &RevealEngine, index: CellIndex) -> CellState {
        engine.cell(index).unwrap().state
    }

    #[test]
    fn engine_state_is_checked_on_load() {
        let mut engine = engine(3, &[0]);
        engine.reveal(8).unwrap();
        let json = serde_json::to_string(&engine).unwrap();
        assert_eq!(serde_json::from_str::<RevealEngine>(&json).unwrap(), engine);

        let remaining = format!(r#""remaining_safe":{}"#, engine.remaining_safe());
        let inflated = json.replace(&remaining, r#""remaining_safe":9"#);
        assert!(serde_json::from_str::<RevealEngine>(&inflated).is_err());
    }

    #[test]
    fn reveal_hits_mine_and_ends() {
        let mut engine = engine(2, &[0]);

        assert_eq!(engine.reveal(0).unwrap(), RevealOutcome::HitMine);
        assert!(engine.is_ended());
        assert_eq!(engine.triggered_mine(), Some(0));
        assert_eq!(engine.reveal(3), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn reveal_numbered_cell_opens_only_itself() {
        let mut engine = engine(3, &[0]);

        assert_eq!(
            engine.reveal(4).unwrap(),
            RevealOutcome::Revealed { opened: 1 }
        );
        assert_eq!(engine.cell(4).unwrap().adjacent_mines, 1);
        assert_eq!(engine.remaining_safe(), 7);
        assert_eq!(state_at(&engine, 8), CellState::Hidden);
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut engine = engine(3, &[8]);

        let outcome = engine.reveal(0).unwrap();

        assert_eq!(outcome, RevealOutcome::Revealed { opened: 8 });
        assert!(engine.all_safe_revealed());
        assert_eq!(engine.cell(4).unwrap().adjacent_mines, 1);
        assert_eq!(state_at(&engine, 8), CellState::Hidden);
    }

    #[test]
    fn reveal_is_idempotent_on_revealed_cells() {
        let mut engine = engine(3, &[0]);
        engine.reveal(4).unwrap();
        let before = engine.clone();

        assert_eq!(engine.reveal(4).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine, before);
    }

    #[test]
    fn cascade_clears_flags_and_marks() {
        let mut engine = engine(4, &[15]);
        engine.cycle_mark(1).unwrap();
        engine.cycle_mark(2).unwrap();
        engine.cycle_mark(2).unwrap();
        assert_eq!(engine.flag_count(), 1);
        assert_eq!(state_at(&engine, 2), CellState::Questioned);

        engine.reveal(0).unwrap();

        assert_eq!(state_at(&engine, 1), CellState::Revealed);
        assert_eq!(state_at(&engine, 2), CellState::Revealed);
        assert_eq!(engine.flag_count(), 0);
    }

    #[test]
    fn right_click_cycles_and_ignores_revealed() {
        let mut engine = engine(3, &[0]);

        assert_eq!(
            engine.cycle_mark(8).unwrap(),
            MarkOutcome::Changed(CellState::Flagged)
        );
        assert_eq!(engine.flag_count(), 1);
        assert_eq!(
            engine.cycle_mark(8).unwrap(),
            MarkOutcome::Changed(CellState::Questioned)
        );
        assert_eq!(engine.flag_count(), 0);
        assert_eq!(
            engine.cycle_mark(8).unwrap(),
            MarkOutcome::Changed(CellState::Hidden)
        );

        engine.reveal(4).unwrap();
        assert_eq!(engine.cycle_mark(4).unwrap(), MarkOutcome::NoChange);
        assert_eq!(state_at(&engine, 4), CellState::Revealed);
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let mut engine = engine(3, &[0]);

        assert_eq!(engine.reveal(9), Err(GameError::OutOfBoundsIndex));
        assert_eq!(engine.cycle_mark(100), Err(GameError::OutOfBoundsIndex));
        assert_eq!(engine.cell(9), Err(GameError::OutOfBoundsIndex));
    }

    #[test]
    fn reveal_all_locks_every_cell() {
        let mut engine = engine(3, &[0, 8]);
        engine.cycle_mark(0).unwrap();

        engine.reveal_all();

        assert!(engine.is_ended());
        assert_eq!(engine.flag_count(), 0);
        for index in 0..9 {
            let cell = engine.cell(index).unwrap();
            assert_eq!(cell.state, CellState::Revealed);
            assert!(cell.disabled);
        }
        assert_eq!(engine.cycle_mark(4), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn flood_fill_opens_each_cell_once_on_random_boards() {
        let config = BoardConfig::new(10, 10).unwrap();
        for seed in 0..200 {
            let layout = ShuffleLayoutGenerator::new(seed, PlacementStrategy::SingleShuffle)
                .generate(config)
                .unwrap();
            let mut engine = RevealEngine::new(layout);

            let mut rng = SmallRng::seed_from_u64(seed);
            let mut safe: Vec<CellIndex> = engine.layout().safe_indices();
            shuffle(&mut safe, &mut rng);

            let mut total_opened = 0;
            for index in safe {
                if let RevealOutcome::Revealed { opened } = engine.reveal(index).unwrap() {
                    total_opened += opened;
                }
            }

            let revealed = (0..100)
                .filter(|&index| state_at(&engine, index).is_revealed())
                .count();
            assert_eq!(usize::from(total_opened), revealed);
            assert_eq!(total_opened, 90);
            assert!(engine.all_safe_revealed());
        }
    }
}
