use std::net::SocketAddr;

use thiserror::Error;

use crate::{ObjectId, Role};

/// Lifecycle state of a sync registry. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegistryState {
    Uninitialized,
    Running,
    Stopped,
}

impl std::fmt::Display for RegistryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryState::Uninitialized => write!(f, "UNINITIALIZED"),
            RegistryState::Running => write!(f, "RUNNING"),
            RegistryState::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Misuse of a sync object. These indicate wiring mistakes; the panicking
/// accessors report them immediately, the `try_*` accessors return them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncObjectError {
    /// The object was never added to a registry
    #[error("Sync object {id} is not registered with any registry")]
    NotRegistered { id: ObjectId },

    /// The operation is only legal for the other role
    #[error("Operation `{operation}` is not allowed on {role} sync object {id}")]
    WrongRole {
        id: ObjectId,
        role: Role,
        operation: &'static str,
    },

    /// The owning registry has not started synching yet
    #[error("Sync object {id} is used before its registry started synching")]
    NotStarted { id: ObjectId },

    /// The owning registry has already stopped synching
    #[error("Sync object {id} is used after its registry stopped synching")]
    Stopped { id: ObjectId },
}

/// Errors raised while configuring or starting a sync registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The operation is not legal in the registry's current state
    #[error("Cannot {operation} while registry is {state}")]
    InvalidState {
        operation: &'static str,
        state: RegistryState,
    },

    /// `init` was already called; the object set is frozen
    #[error("Registry is already initialized; no more sync objects can be added")]
    AlreadyInitialized,

    /// `start_synching` was called before a successful `init`
    #[error("Registry must be initialized before it can start synching")]
    NotInitialized,

    /// The object is already bound to a role (in this or another registry)
    #[error("Sync object {id} is already registered")]
    AlreadyRegistered { id: ObjectId },

    /// Two objects in the registry share an id
    #[error("Sync object id {id} is registered more than once")]
    DuplicateObjectId { id: ObjectId },

    /// Application objects may not use the reserved id range
    #[error("Sync object id {id} lies in the reserved range starting at {reserved_start:#06x}")]
    ReservedObjectId { id: ObjectId, reserved_start: ObjectId },

    /// The object's value cannot fit in one datagram
    #[error("Sync object {id} encodes to {length} bytes, more than the {max} bytes a datagram can carry")]
    PayloadTooLarge { id: ObjectId, length: usize, max: usize },

    /// A SENDER object has nobody to send to
    #[error("Sender sync object {id} has no destination")]
    MissingEndpoint { id: ObjectId },

    /// The channel offset pushes a port out of range
    #[error("Sync object {id} on channel {channel} maps to an invalid port")]
    InvalidEndpoint { id: ObjectId, channel: u16 },

    /// A socket could not be bound
    #[error("Failed to bind UDP socket on {address}: {message}")]
    Bind { address: SocketAddr, message: String },

    /// A background thread could not be spawned
    #[error("Failed to spawn {thread} thread: {message}")]
    Spawn { thread: String, message: String },
}
