use serde::{Deserialize, Serialize};

/// Generation number of a countdown timer. Ticks carry the token of the timer that produced them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u32);

impl TimerToken {
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Once-per-second scheduler provided by the presentation layer.
///
/// `start_ticking` must arrange for [`crate::GameSession::tick`] to be called with `token` every second until the returned
/// handle is passed to `stop_ticking`.
pub trait Clock {
    type Handle;

    fn start_ticking(&mut self, token: TimerToken) -> Self::Handle;

    fn stop_ticking(&mut self, handle: Self::Handle);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossCause {
    Mine,
    Timeout,
}

/// End-of-game message payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameNotice {
    Won {
        score: u32,
        high_score: u32,
    },
    Lost {
        cause: LossCause,
        score: u32,
        high_score: u32,
    },
}

/// Sink for end-of-game messages. Only called once the board is fully revealed and locked.
pub trait Notifier {
    fn notify(&mut self, notice: GameNotice);
}

impl<F: FnMut(GameNotice)> Notifier for F {
    fn notify(&mut self, notice: GameNotice) {
        self(notice)
    }
}
