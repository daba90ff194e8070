/// Identifies one sync object within a registry; unique per process.
pub type ObjectId = u16;
/// Monotonic (wrapping) version of a sync object's value.
pub type SequenceNumber = u32;
/// Monotonic (wrapping) per-node frame counter used by the barrier.
pub type FrameIndex = u32;
/// Identity of a render node in the cluster configuration.
pub type NodeId = u16;

/// Which side of a sync value channel an object sits on. Fixed when the
/// object is registered and never switched afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Sender,
    Receiver,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Sender => write!(f, "SENDER"),
            Role::Receiver => write!(f, "RECEIVER"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Server,
    Node(NodeId),
}

impl std::fmt::Display for HostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostType::Server => write!(f, "server"),
            HostType::Node(id) => write!(f, "node {}", id),
        }
    }
}
