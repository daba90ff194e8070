use crate::{NodeId, ObjectId};

/// Largest payload a single sync datagram may carry. Keeps every datagram
/// under a typical Ethernet MTU so the OS never fragments it.
pub const MAX_PAYLOAD_BYTES: usize = 1200;

/// Object ids from here upward are reserved for per-node view calibration.
pub const RESERVED_OBJECT_ID_START: ObjectId = 0xF000;

/// Object id carrying the view calibration for the given node.
pub fn calibration_object_id(node_id: NodeId) -> ObjectId {
    RESERVED_OBJECT_ID_START | (node_id & 0x0FFF)
}

/// Channel the calibration objects travel on.
pub const CALIBRATION_CHANNEL: u16 = 0;
