//! Ticker Picker entry point
//!
//! The web build is driven from `platform::web`; natively this runs a
//! headless draw in the terminal.
//!
//! Usage: `ticker-picker [WINNERS] [NAME...]` (names are read from stdin when
//! none are given on the command line and stdin is not a terminal).

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::io::{IsTerminal, Read};
    use std::thread;
    use std::time::Duration;

    use ticker_picker::platform::{FrameDriver, SystemClock};
    use ticker_picker::sim::{PickerEvent, PickerState};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (requested, mut names) = parse_args(std::env::args().skip(1));

    if names.is_empty() && !std::io::stdin().is_terminal() {
        let mut text = String::new();
        if let Err(err) = std::io::stdin().read_to_string(&mut text) {
            log::warn!("Could not read names from stdin: {err}");
        }
        names = text.lines().map(str::to_string).collect();
    }
    if names.is_empty() {
        names = ["Tacos", "Pizza", "Sushi"].map(String::from).to_vec();
    }

    let mut state = PickerState::from_entropy();
    state.add_many(&names.join("\n"));
    state.set_winner_count(requested);
    log::info!(
        "{}: {} entries, {}",
        state.settings.title,
        state.pool().len(),
        state.spin_button_label()
    );

    let mut driver = FrameDriver::new(state, SystemClock::new());
    if !driver.spin() {
        log::error!("Need at least 2 entries to pick a winner");
        std::process::exit(1);
    }

    let frame_time = Duration::from_millis(16);
    let mut last_label = String::new();
    while driver.frame() {
        let label = &driver.state().display().label;
        if *label != last_label {
            log::debug!("{label}");
            last_label.clone_from(label);
        }
        thread::sleep(frame_time);
    }

    for event in driver.drain_events() {
        if let PickerEvent::SpinComplete { batch_id, winners } = event {
            println!("{} ({batch_id})", driver.state().display().label);
            for (rank, winner) in winners.iter().enumerate() {
                println!("{:>3}. {}", rank + 1, winner.label);
            }
        }
    }
}

/// Split `[WINNERS] [NAME...]`: the first argument is the winner count only
/// when it parses as a number, otherwise it is the first name.
fn parse_args(args: impl Iterator<Item = String>) -> (i64, Vec<String>) {
    let mut args = args.peekable();
    let requested = args
        .next_if(|arg| arg.trim().parse::<i64>().is_ok())
        .and_then(|arg| arg.trim().parse::<i64>().ok())
        .unwrap_or(1);
    (requested, args.collect())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
