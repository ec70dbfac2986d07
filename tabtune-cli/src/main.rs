//! # Tabtune
//!
//! Command-line front end for the side-panel player: manage the queue,
//! favorites and playlists, query the catalog, and run playback sessions.

use log::error;

mod cli;
mod controls;
mod error;
mod logging;
mod runner;
mod simulate;
mod ui;

fn main() {
    dotenv::dotenv().ok();
    let log_buffer = logging::init();
    let args = cli::args::build_cli().get_matches();

    let code = match runner::run(&args, log_buffer) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err.to_string().to_lowercase());
            -1
        }
    };

    std::process::exit(code)
}
