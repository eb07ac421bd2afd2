use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub side: Side,
    /// Countdown length of each game.
    pub time_budget_secs: u32,
    /// Seeds the session's random source; every new game draws its layout seed from it.
    pub seed: u64,
    pub placement: PlacementStrategy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            side: DEFAULT_SIDE,
            time_budget_secs: 300,
            seed: 0,
            placement: PlacementStrategy::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.time_budget_secs == 0 || self.time_budget_secs > i32::MAX as u32 {
            log::warn!("rejected time budget of {}s", self.time_budget_secs);
            return Err(GameError::InvalidConfiguration);
        }
        for difficulty in Difficulty::ALL {
            difficulty.board_config(self.side)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    #[default]
    InProgress,
    Won,
    Lost(LossCause),
}

impl GameOutcome {
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub const fn is_finished(self) -> bool {
        !self.is_in_progress()
    }
}

/// A player's sitting: the current board, its countdown and score, and the high score across games.
pub struct GameSession<C: Clock, N: Notifier> {
    config: SessionConfig,
    difficulty: Difficulty,
    engine: RevealEngine,
    rng: SmallRng,
    score: u32,
    high_score: u32,
    remaining_time: i32,
    started: bool,
    outcome: GameOutcome,
    timer_token: TimerToken,
    timer: Option<C::Handle>,
    clock: C,
    notifier: N,
}

impl<C: Clock, N: Notifier> GameSession<C, N> {
    /// Creates the session and deals its first game.
    pub fn new(config: SessionConfig, difficulty: Difficulty, clock: C, notifier: N) -> Result<Self> {
        config.validate()?;

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let layout = ShuffleLayoutGenerator::new(rng.next_u64(), config.placement)
            .generate(difficulty.board_config(config.side)?)?;
        log::info!("new session, {} on {}x{}", difficulty, config.side, config.side);

        Ok(Self {
            config,
            difficulty,
            engine: RevealEngine::new(layout),
            rng,
            score: 0,
            high_score: 0,
            remaining_time: config.time_budget_secs as i32,
            started: false,
            outcome: GameOutcome::InProgress,
            timer_token: TimerToken::default(),
            timer: None,
            clock,
            notifier,
        })
    }

    /// Discards the current board and deals a fresh random one. On error the current game is left as it was.
    pub fn new_game(&mut self, difficulty: Difficulty) -> Result<()> {
        let board_config = difficulty.board_config(self.config.side)?;
        let seed = self.rng.next_u64();
        let layout = ShuffleLayoutGenerator::new(seed, self.config.placement).generate(board_config)?;
        self.reset(difficulty, layout);
        Ok(())
    }

    /// Starts a game on a known layout, which must match the board of `difficulty`.
    pub fn new_game_with_layout(&mut self, difficulty: Difficulty, layout: MineLayout) -> Result<()> {
        if layout.config() != difficulty.board_config(self.config.side)? {
            log::warn!(
                "layout {:?} does not fit {} on side {}",
                layout.config(),
                difficulty,
                self.config.side
            );
            return Err(GameError::InvalidConfiguration);
        }
        self.reset(difficulty, layout);
        Ok(())
    }

    fn reset(&mut self, difficulty: Difficulty, layout: MineLayout) {
        self.stop_timer();
        self.difficulty = difficulty;
        self.engine = RevealEngine::new(layout);
        self.score = 0;
        self.remaining_time = self.config.time_budget_secs as i32;
        self.started = false;
        self.outcome = GameOutcome::InProgress;
        log::info!(
            "new game: {} ({} mines), high score {}",
            difficulty,
            difficulty.mine_count(),
            self.high_score
        );
    }

    /// Reveals a cell. Out-of-range indices and clicks after the game ended are ignored.
    pub fn left_click(&mut self, index: CellIndex) -> RevealOutcome {
        if self.outcome.is_finished() {
            return RevealOutcome::NoChange;
        }

        let outcome = match self.engine.reveal(index) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("ignored left click on {}: {}", index, err);
                return RevealOutcome::NoChange;
            }
        };

        match outcome {
            RevealOutcome::NoChange => {}
            RevealOutcome::HitMine => {
                self.started = true;
                self.finish(GameOutcome::Lost(LossCause::Mine));
            }
            RevealOutcome::Revealed { opened } => {
                self.award();
                log::debug!("revealed {} ({} opened), score {}", index, opened, self.score);
                if self.engine.all_safe_revealed() {
                    self.started = true;
                    self.finish(GameOutcome::Won);
                } else {
                    self.start_timer();
                }
            }
        }

        outcome
    }

    /// Cycles the mark on a hidden cell. Revealed cells and invalid indices are ignored.
    pub fn right_click(&mut self, index: CellIndex) -> MarkOutcome {
        if self.outcome.is_finished() {
            return MarkOutcome::NoChange;
        }

        match self.engine.cycle_mark(index) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("ignored right click on {}: {}", index, err);
                MarkOutcome::NoChange
            }
        }
    }

    /// One second of the countdown. Ticks from a timer other than the live one are dropped.
    pub fn tick(&mut self, token: TimerToken) -> bool {
        if token != self.timer_token || self.timer.is_none() || self.outcome.is_finished() {
            log::trace!("stale tick {:?} (live {:?})", token, self.timer_token);
            return false;
        }

        self.remaining_time -= 1;
        if self.remaining_time < 0 {
            log::debug!("time is up");
            self.finish(GameOutcome::Lost(LossCause::Timeout));
        }
        true
    }

    /// Scores a player reveal against the odds left after it, cascade included. The winning reveal leaves no
    /// safe cell, so it earns the base points only.
    fn award(&mut self) {
        let mines = u32::from(self.engine.mine_count());
        let remaining = u32::from(self.engine.remaining_safe());
        let odds_points = if remaining > 0 { 10 * mines / remaining } else { 0 };
        let points = (10 + odds_points) * u32::from(self.difficulty.level());
        self.score = self.score.saturating_add(points);
        self.high_score = self.high_score.max(self.score);
    }

    fn finish(&mut self, outcome: GameOutcome) {
        if outcome.is_in_progress() {
            log::error!("refusing to finish a game with outcome {:?}", outcome);
            return;
        }
        self.stop_timer();

        if outcome == GameOutcome::Won {
            let time_bonus = self.remaining_time_secs() * 2;
            self.score = self
                .score
                .saturating_add(time_bonus)
                .saturating_mul(u32::from(self.difficulty.level()));
            self.high_score = self.high_score.max(self.score);
        }

        self.outcome = outcome;
        self.engine.reveal_all();
        log::info!("game over: {:?}, score {}", outcome, self.score);

        let notice = match outcome {
            GameOutcome::Won => GameNotice::Won {
                score: self.score,
                high_score: self.high_score,
            },
            GameOutcome::Lost(cause) => GameNotice::Lost {
                cause,
                score: self.score,
                high_score: self.high_score,
            },
            GameOutcome::InProgress => return,
        };
        self.notifier.notify(notice);
    }

    fn start_timer(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.stop_timer();
        self.timer_token = self.timer_token.next();
        self.timer = Some(self.clock.start_ticking(self.timer_token));
    }

    fn stop_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.clock.stop_ticking(handle);
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn engine(&self) -> &RevealEngine {
        &self.engine
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_ticking(&self) -> bool {
        self.timer.is_some()
    }

    pub fn timer_token(&self) -> TimerToken {
        self.timer_token
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn remaining_time_secs(&self) -> u32 {
        self.remaining_time.max(0) as u32
    }

    pub fn mine_count(&self) -> CellCount {
        self.engine.mine_count()
    }

    pub fn remaining_safe(&self) -> CellCount {
        self.engine.remaining_safe()
    }

    /// `floor(mines / remaining safe cells * 100)`, `None` once every safe cell is open.
    pub fn odds_percent(&self) -> Option<u32> {
        let remaining = u32::from(self.engine.remaining_safe());
        (remaining > 0).then(|| 100 * u32::from(self.engine.mine_count()) / remaining)
    }

    pub fn display_state(&self, index: CellIndex) -> Option<DisplayState> {
        let cell = self.engine.cell(index).ok()?;
        Some(match cell.state {
            CellState::Hidden => DisplayState::Blank,
            CellState::Flagged => DisplayState::Flag,
            CellState::Questioned => DisplayState::Mark,
            CellState::Revealed if !cell.is_mine => DisplayState::Number(cell.adjacent_mines),
            CellState::Revealed if self.outcome == GameOutcome::Won => DisplayState::Heart,
            CellState::Revealed => DisplayState::Mine,
        })
    }

    pub fn is_disabled(&self, index: CellIndex) -> bool {
        self.engine.cell(index).map_or(true, |cell| cell.disabled)
    }
}
