use clap::Parser;
use skullsweep_core::Difficulty;
use wasm_bindgen::prelude::*;

mod game;
mod utils;

#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Difficulty of the first game, as a level (1-4) or a name
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Seconds on the countdown of each game
    #[arg(short, long)]
    time_budget: Option<u32>,
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let (args, parse_error) = match Args::try_parse_from(location_hash.split(['#', '&'])) {
        Ok(args) => (args, None),
        Err(err) => (Args::default(), Some(err)),
    };
    let log_level = args.verbose.log_level().unwrap_or(log::Level::Warn);
    if let Err(err) = console_log::init_with_level(log_level) {
        gloo::console::error!(format!("Error initializing logger: {err}"));
    }
    if let Some(err) = parse_error {
        log::warn!("ignoring arguments in location hash: {}", err);
    }
    log::debug!("args: {:?}", args);

    let Some(root) = document().get_element_by_id("game") else {
        log::error!("Could not find id=\"game\" element");
        return;
    };

    let props = game::GameProps {
        seed: args.seed,
        difficulty: args.difficulty.unwrap_or_default(),
        time_budget: args.time_budget,
    };

    log::debug!("App started");
    yew::Renderer::<game::GameView>::with_root_and_props(root, props).render();
}
