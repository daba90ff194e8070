//! # Cavesync Shared
//! Common functionality shared between cavesync-server & cavesync-node:
//! sync objects and their UDP value channels, the sync registry lifecycle,
//! frame barrier messages, cluster configuration and view calibration.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use cavesync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

mod barrier;
mod calibration;
mod config;
mod constants;
mod math;
mod sync;
mod types;
mod wire;
mod wrapping_number;

pub use barrier::barrier_round::{BarrierRound, ReadyOutcome};
pub use calibration::{
    screen::{ScreenBasis, ScreenGeometry},
    view_calibration::{off_axis_projection, ViewCalibration},
};
pub use config::{
    cluster_config::{
        BarrierConfig, ClusterConfig, NodeEntry, ServerEndpoint, SyncConfig, ViewConfig,
        MAX_NODE_ID,
    },
    error::ConfigError,
};
pub use constants::{
    calibration_object_id, CALIBRATION_CHANNEL, MAX_PAYLOAD_BYTES, RESERVED_OBJECT_ID_START,
};
pub use math::{mat4::Mat4, vec3::Vec3};
pub use sync::{
    channel::{Delivery, ValueSender},
    channel_params::{ChannelParams, Destinations},
    error::{RegistryError, RegistryState, SyncObjectError},
    registry::{RegistryEndpoints, SyncRegistry},
    sync_object::{SyncObject, SyncPayload},
    sync_value::SyncValue,
    value_cell::ValueCell,
};
pub use types::{FrameIndex, HostType, NodeId, ObjectId, Role, SequenceNumber};
pub use wire::{barrier_message::BarrierMessage, error::PacketError, sync_packet::SyncPacket};
pub use wrapping_number::{sequence_greater_than, sequence_less_than};
