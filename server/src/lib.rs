//! # Cavesync Server
//! The coordinator of a CAVE cluster. Owns the authoritative clock and input
//! state, pushes them to every render node through sync objects, releases
//! the frame barrier once every node is ready and sends each node the
//! projection matrices computed for its own screen.

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
mod render_server;
mod views;

pub use error::RenderServerError;
pub use render_server::RenderServer;
