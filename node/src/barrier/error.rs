use thiserror::Error;

use cavesync_shared::FrameIndex;

/// A failed frame barrier. Every variant is terminal: the node must stop
/// presenting rather than show a frame out of step with the other walls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarrierError {
    /// The cluster did not become ready for `frame` in time
    #[error("Frame barrier timed out after {waited_ms} ms waiting for frame {frame}")]
    Timeout { frame: FrameIndex, waited_ms: u128 },

    /// An earlier barrier round failed; this node no longer takes part
    #[error("Frame barrier is desynchronized since frame {frame}")]
    Desynchronized { frame: FrameIndex },

    /// The barrier socket failed
    #[error("Frame barrier socket error: {message}")]
    Io { message: String },
}
