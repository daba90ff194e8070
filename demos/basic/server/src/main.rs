use std::{path::PathBuf, process::ExitCode, thread, time::Duration};

use clap::Parser;
use log::error;

mod app;

use app::App;

/// Headless render server for the basic demo cluster
#[derive(Parser, Debug)]
#[command(name = "cavesync-basic-server", version)]
struct Args {
    /// Cluster description (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Milliseconds between two server ticks
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Stop after this many ticks (runs forever when omitted)
    #[arg(long)]
    ticks: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut app = match App::new(&args.config) {
        Ok(app) => app,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut tick = 0;
    while args.ticks.map_or(true, |ticks| tick < ticks) {
        app.update(tick);
        thread::sleep(Duration::from_millis(args.tick_ms));
        tick += 1;
    }

    ExitCode::SUCCESS
}
