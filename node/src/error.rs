use std::net::SocketAddr;

use thiserror::Error;

use cavesync_shared::{ConfigError, RegistryError};

/// Errors surfaced by a render node while it is being set up
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderNodeError {
    /// The cluster description is unusable, or does not name this node
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The sync registry refused a registration or could not start
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The barrier socket could not be set up
    #[error("Failed to open frame barrier socket on {address}: {message}")]
    Barrier { address: SocketAddr, message: String },
}
