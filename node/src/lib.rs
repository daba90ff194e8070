//! # Cavesync Node
//! A render node of a CAVE cluster. Receives the shared clock, input state
//! and its own view calibration from the render server, and blocks in
//! `synch_frame` until every node is ready to present the same frame.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use cavesync_shared::{
        BarrierConfig, ChannelParams, ClusterConfig, ConfigError, Mat4, NodeId, Role, Serde,
        SerdeErr, SyncConfig, SyncObject, Vec3, ViewCalibration,
    };
}

mod barrier;
mod error;
mod render_node;

pub use barrier::{error::BarrierError, frame_barrier::FrameBarrier};
pub use error::RenderNodeError;
pub use render_node::RenderNode;
