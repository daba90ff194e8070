use std::{path::Path, thread, time::Duration};

use log::{debug, info};
use thiserror::Error;

use cavesync_basic_demo_shared::{camera_step, pulse, Keys, CLOCK_ID, KEYS_ID};
use cavesync_node::{
    shared::{ChannelParams, ClusterConfig, ConfigError, Mat4, Role, SyncObject, Vec3},
    BarrierError, RenderNode, RenderNodeError,
};

// stand-in for the GPU work of one stereo frame
const RENDER_COST: Duration = Duration::from_millis(8);

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("render node: {0}")]
    Node(#[from] RenderNodeError),
}

pub struct App {
    node: RenderNode,
    clock: SyncObject<i64>,
    keys: SyncObject<[bool; 4]>,
    held: Keys,
    camera: Vec3,
    last_time: i64,
}

impl App {
    pub fn new(config_path: &Path, node_id: u16) -> Result<Self, AppError> {
        info!("Basic Cavesync Node Demo started as node {}", node_id);

        let config = ClusterConfig::load(config_path)?;
        let mut node = RenderNode::new(config, node_id)?;

        let clock = SyncObject::new(CLOCK_ID, 0i64);
        let keys = SyncObject::new(KEYS_ID, [false; 4]);
        node.add_sync_object(&clock, Role::Receiver, ChannelParams::new(0))?;
        node.add_sync_object(&keys, Role::Receiver, ChannelParams::new(0))?;
        node.init()?;
        node.start_synching()?;

        Ok(Self {
            node,
            clock,
            keys,
            held: Keys::default(),
            camera: Vec3::new(0.0, 0.0, 15.0),
            last_time: 0,
        })
    }

    /// Renders one frame and waits for the rest of the cluster before
    /// "presenting" it
    pub fn draw(&mut self) -> Result<(), BarrierError> {
        if self.keys.has_changed() {
            self.held = Keys::from(self.keys.get_data());
            debug!("keys now {:?}", self.held);
        }
        self.camera = self.camera + camera_step(&self.held);

        let (left, right) = self.node.projection_matrices();
        let view = self.node.scene_transform() * Mat4::from_translation(-self.camera);

        let time = self.clock.get_data();
        let delta = time - self.last_time;
        self.last_time = time;

        self.render(&(left * view), &(right * view), pulse(time), delta);

        let frame = self.node.synch_frame()?;
        if frame % 600 == 0 {
            info!(
                "frame {} presented, camera at {:?}, clock {} ms",
                frame, self.camera, time
            );
        }
        Ok(())
    }

    fn render(&self, left: &Mat4, right: &Mat4, red: f32, delta: i64) {
        debug!(
            "drawing eyes finite: {}/{}, sphere red {:.2}, {} ms since last frame",
            left.is_finite(),
            right.is_finite(),
            red,
            delta
        );
        thread::sleep(RENDER_COST);
    }
}
