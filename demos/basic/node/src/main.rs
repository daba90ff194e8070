use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use log::error;

mod app;

use app::App;

/// Headless render node for the basic demo cluster
#[derive(Parser, Debug)]
#[command(name = "cavesync-basic-node", version)]
struct Args {
    /// Cluster description (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Id of this node in the cluster description
    #[arg(value_name = "NODE_ID")]
    node_id: u16,

    /// Stop after this many frames (runs forever when omitted)
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut app = match App::new(&args.config, args.node_id) {
        Ok(app) => app,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut frame = 0;
    while args.frames.map_or(true, |frames| frame < frames) {
        // a desynchronized wall is worse than a dark one
        if let Err(err) = app.draw() {
            error!("Could not sync frame: {}", err);
            return ExitCode::FAILURE;
        }
        frame += 1;
    }

    ExitCode::SUCCESS
}
