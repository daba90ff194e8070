use std::{path::Path, time::Instant};

use log::info;
use thiserror::Error;

use cavesync_basic_demo_shared::{Keys, CLOCK_ID, KEYS_ID};
use cavesync_server::{
    shared::{ChannelParams, ClusterConfig, ConfigError, Mat4, Role, SyncObject, Vec3},
    RenderServer, RenderServerError,
};

// scripted key presses standing in for a keyboard: (tick, key, pressed)
const SCRIPT: [(u64, char, bool); 8] = [
    (60, 'w', true),
    (180, 'w', false),
    (240, 'a', true),
    (300, 'a', false),
    (360, 's', true),
    (480, 's', false),
    (540, 'd', true),
    (600, 'd', false),
];
const SCRIPT_PERIOD: u64 = 660;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("render server: {0}")]
    Server(#[from] RenderServerError),
}

pub struct App {
    server: RenderServer,
    clock: SyncObject<i64>,
    keys: SyncObject<[bool; 4]>,
    held: Keys,
    started: Instant,
}

impl App {
    pub fn new(config_path: &Path) -> Result<Self, AppError> {
        info!("Basic Cavesync Server Demo started");

        let config = ClusterConfig::load(config_path)?;
        let mut server = RenderServer::new(config)?;

        let clock = SyncObject::new(CLOCK_ID, 0i64);
        let keys = SyncObject::new(KEYS_ID, [false; 4]);
        server.add_sync_object(&clock, Role::Sender, ChannelParams::new(0))?;
        server.add_sync_object(&keys, Role::Sender, ChannelParams::new(0))?;
        server.init()?;
        server.start_synching()?;

        Ok(Self {
            server,
            clock,
            keys,
            held: Keys::default(),
            started: Instant::now(),
        })
    }

    pub fn update(&mut self, tick: u64) {
        let elapsed_ms = self.started.elapsed().as_millis() as i64;
        self.clock.set_data(elapsed_ms);
        self.clock.send();

        for (at, key, pressed) in SCRIPT {
            if tick % SCRIPT_PERIOD == at {
                info!("key {} {}", key, if pressed { "pressed" } else { "released" });
                self.held.set(key, pressed);
                self.keys.set_data(self.held.into());
                self.keys.send();
            }
        }

        // a slowly swaying head stands in for the tracker
        let sway = (elapsed_ms as f32 / 2000.0).sin() * 0.1;
        self.server
            .set_head_pose(Mat4::from_translation(Vec3::new(sway, 0.0, 0.0)));
        self.server.update_views();
    }
}
