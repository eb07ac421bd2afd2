use crate::utils::*;
use gloo::timers::callback::{Interval, Timeout};
use skullsweep_core as game;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

const TICK_MILLIS: u32 = 1_000;

/// Drives the session countdown with a browser interval.
pub(crate) struct IntervalClock {
    on_tick: Callback<game::TimerToken>,
}

impl game::Clock for IntervalClock {
    type Handle = Interval;

    fn start_ticking(&mut self, token: game::TimerToken) -> Interval {
        log::debug!("timer {:?} started", token);
        let on_tick = self.on_tick.clone();
        Interval::new(TICK_MILLIS, move || on_tick.emit(token))
    }

    fn stop_ticking(&mut self, handle: Interval) {
        // dropping clears the interval
        drop(handle);
    }
}

/// Shows the end-of-game message once the revealed board had a chance to render.
pub(crate) struct AlertNotifier;

impl game::Notifier for AlertNotifier {
    fn notify(&mut self, notice: game::GameNotice) {
        let message = notice_message(notice);
        log::info!("{}", message);
        Timeout::new(0, move || gloo::dialogs::alert(&message)).forget();
    }
}

fn notice_message(notice: game::GameNotice) -> String {
    use game::GameNotice::*;
    use game::LossCause::*;
    match notice {
        Won { score, high_score } => {
            format!("You win! Score: {score}, high score: {high_score}")
        }
        Lost {
            cause: Mine,
            high_score,
            ..
        } => format!("Game over! High score: {high_score}"),
        Lost {
            cause: Timeout,
            high_score,
            ..
        } => format!("Out of time! High score: {high_score}"),
    }
}

fn cell_class(display: game::DisplayState) -> Classes {
    use game::DisplayState::*;
    classes!(
        "cell",
        match display {
            Blank => classes!(),
            Flag => classes!("flag"),
            Mark => classes!("question"),
            Number(count) => classes!("open", format!("num-{}", count)),
            Mine => classes!("open", "mine"),
            Heart => classes!("open", "heart"),
        }
    )
}

fn cell_text(display: game::DisplayState) -> String {
    use game::DisplayState::*;
    match display {
        Blank | Number(0) => String::new(),
        Flag => "\u{1F6A9}".to_string(),
        Mark => "?".to_string(),
        Number(count) => count.to_string(),
        Mine => "\u{2620}".to_string(),
        Heart => "\u{2665}".to_string(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Reveal(game::CellIndex),
    Mark(game::CellIndex),
    Tick(game::TimerToken),
    SelectDifficulty(String),
    NewGame,
}

#[derive(Properties, Clone, Debug, PartialEq)]
pub(crate) struct GameProps {
    pub seed: Option<u64>,
    pub difficulty: game::Difficulty,
    pub time_budget: Option<u32>,
}

type Session = game::GameSession<IntervalClock, AlertNotifier>;

pub(crate) struct GameView {
    session: Option<Session>,
    selected: game::Difficulty,
}

impl GameView {
    fn create_session(ctx: &Context<Self>) -> game::Result<Session> {
        let props = ctx.props();
        let defaults = game::SessionConfig::default();
        let config = game::SessionConfig {
            seed: props.seed.unwrap_or_else(js_random_seed),
            time_budget_secs: props.time_budget.unwrap_or(defaults.time_budget_secs),
            ..defaults
        };
        log::debug!("session config: {:?}", config);

        let clock = IntervalClock {
            on_tick: ctx.link().callback(Msg::Tick),
        };
        game::GameSession::new(config, props.difficulty, clock, AlertNotifier)
    }

    fn view_counters(session: &Session) -> Html {
        let odds = session
            .odds_percent()
            .map_or_else(|| "-".to_string(), |odds| format!("{odds}%"));

        html! {
            <nav>
                <aside title="Score">{format_for_counter(session.score())}</aside>
                <aside title="High score">{format_for_counter(session.high_score())}</aside>
                <aside title="Time left">{format_for_counter(session.remaining_time_secs())}</aside>
                <aside title="Odds">{odds}</aside>
            </nav>
        }
    }

    fn view_board(ctx: &Context<Self>, session: &Session) -> Html {
        let side = session.engine().side();
        html! {
            <table class={session.outcome().is_in_progress().then_some("playable")}>
                {
                    for (0..side).map(|row| html! {
                        <tr>
                            {
                                for (0..side).map(|col| {
                                    let index = game::flat_index((row, col), side);
                                    Self::view_cell(ctx, session, index)
                                })
                            }
                        </tr>
                    })
                }
            </table>
        }
    }

    fn view_cell(ctx: &Context<Self>, session: &Session, index: game::CellIndex) -> Html {
        let display = session
            .display_state(index)
            .unwrap_or(game::DisplayState::Blank);
        let mut class = cell_class(display);
        if session.is_disabled(index) {
            class.push("locked");
        }

        let onclick = ctx.link().callback(move |_: MouseEvent| Msg::Reveal(index));
        let oncontextmenu = ctx.link().callback(move |e: MouseEvent| {
            e.prevent_default();
            Msg::Mark(index)
        });

        html! {
            <td {class} {onclick} {oncontextmenu}>{cell_text(display)}</td>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let session = match Self::create_session(ctx) {
            Ok(session) => Some(session),
            Err(err) => {
                log::error!("could not start a game: {}", err);
                None
            }
        };

        Self {
            session,
            selected: ctx.props().difficulty,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let Some(session) = self.session.as_mut() else {
            return false;
        };

        match msg {
            Reveal(index) => {
                log::debug!("reveal cell: {}", index);
                session.left_click(index).has_update()
            }
            Mark(index) => {
                log::debug!("mark cell: {}", index);
                session.right_click(index).has_update()
            }
            Tick(token) => session.tick(token),
            SelectDifficulty(value) => match value.parse() {
                Ok(difficulty) => {
                    self.selected = difficulty;
                    false
                }
                Err(err) => {
                    log::warn!("unknown difficulty {:?}: {}", value, err);
                    false
                }
            },
            NewGame => match session.new_game(self.selected) {
                Ok(()) => true,
                Err(err) => {
                    log::error!("could not start a new game: {}", err);
                    false
                }
            },
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let Some(session) = self.session.as_ref() else {
            return html! { <div class="skullsweep">{"Could not start a game"}</div> };
        };

        let cb_new_game = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            Msg::NewGame
        });
        let cb_select = ctx.link().callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            Msg::SelectDifficulty(select.value())
        });

        html! {
            <div class="skullsweep" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <header>
                    <select onchange={cb_select}>
                        {
                            for game::Difficulty::ALL.into_iter().map(|difficulty| html! {
                                <option
                                    value={difficulty.level().to_string()}
                                    selected={difficulty == self.selected}
                                >
                                    {difficulty.name()}
                                </option>
                            })
                        }
                    </select>
                    <button onclick={cb_new_game}>{"New game"}</button>
                </header>
                { Self::view_counters(session) }
                { Self::view_board(ctx, session) }
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_messages_name_the_outcome() {
        let won = game::GameNotice::Won {
            score: 1986,
            high_score: 2000,
        };
        let lost = game::GameNotice::Lost {
            cause: game::LossCause::Mine,
            score: 11,
            high_score: 2000,
        };
        let timed_out = game::GameNotice::Lost {
            cause: game::LossCause::Timeout,
            score: 11,
            high_score: 2000,
        };

        assert_eq!(
            notice_message(won),
            "You win! Score: 1986, high score: 2000"
        );
        assert_eq!(notice_message(lost), "Game over! High score: 2000");
        assert_eq!(notice_message(timed_out), "Out of time! High score: 2000");
    }

    #[test]
    fn cells_render_by_display_state() {
        use game::DisplayState::*;

        assert_eq!(cell_text(Blank), "");
        assert_eq!(cell_text(Number(0)), "");
        assert_eq!(cell_text(Number(3)), "3");
        assert_eq!(cell_text(Mine), "\u{2620}");
        assert_eq!(cell_text(Heart), "\u{2665}");

        assert_eq!(cell_class(Number(3)), classes!("cell", "open", "num-3"));
        assert_eq!(cell_class(Mark), classes!("cell", "question"));
    }
}
