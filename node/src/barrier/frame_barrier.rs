use std::{
    io::{self, ErrorKind},
    net::{SocketAddr, UdpSocket},
    time::{Duration, Instant},
};

use log::{debug, info, trace, warn};

use cavesync_shared::{BarrierConfig, BarrierMessage, FrameIndex, NodeId};

use crate::BarrierError;

// set_read_timeout rejects a zero duration
const MIN_WAIT: Duration = Duration::from_millis(1);

/// Node side of the frame barrier.
///
/// Each call to `wait` reports readiness for the current frame and blocks
/// until the aggregator releases that frame or the round times out.
/// Readiness is repeated while waiting, so a lost datagram only costs one
/// resend interval.
pub struct FrameBarrier {
    node_id: NodeId,
    socket: UdpSocket,
    aggregator: SocketAddr,
    config: BarrierConfig,
    frame: FrameIndex,
    first_round: bool,
    failed_at: Option<FrameIndex>,
}

impl FrameBarrier {
    /// Binds the node's barrier socket. Releases arrive on `local`,
    /// readiness goes to `aggregator`.
    pub fn bind(
        node_id: NodeId,
        local: SocketAddr,
        aggregator: SocketAddr,
        config: BarrierConfig,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(local)?;
        Ok(Self {
            node_id,
            socket,
            aggregator,
            config,
            frame: 0,
            first_round: true,
            failed_at: None,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Frame the next `wait` will synchronize
    pub fn frame_index(&self) -> FrameIndex {
        self.frame
    }

    pub fn is_desynchronized(&self) -> bool {
        self.failed_at.is_some()
    }

    /// Blocks until every node is ready for the current frame, then
    /// advances to the next one. Returns the frame that was released.
    pub fn wait(&mut self) -> Result<FrameIndex, BarrierError> {
        if let Some(frame) = self.failed_at {
            return Err(BarrierError::Desynchronized { frame });
        }

        let frame = self.frame;
        let timeout = if self.first_round {
            self.config.first_frame_timeout
        } else {
            self.config.timeout
        };

        match self.round(frame, timeout) {
            Ok(()) => {
                self.frame = frame.wrapping_add(1);
                if self.first_round {
                    info!("node {}: cluster in step at frame {}", self.node_id, frame);
                    self.first_round = false;
                }
                Ok(frame)
            }
            Err(err) => {
                warn!("node {}: {}", self.node_id, err);
                self.failed_at = Some(frame);
                Err(err)
            }
        }
    }

    fn round(&self, frame: FrameIndex, timeout: Duration) -> Result<(), BarrierError> {
        let started = Instant::now();
        let deadline = started + timeout;
        let ready = BarrierMessage::Ready {
            node_id: self.node_id,
            frame,
        }
        .to_bytes();

        let mut next_ready = started;
        let mut buffer = [0u8; 16];

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(BarrierError::Timeout {
                    frame,
                    waited_ms: now.duration_since(started).as_millis(),
                });
            }

            if now >= next_ready {
                if let Err(err) = self.socket.send_to(&ready, self.aggregator) {
                    debug!("readiness for frame {} not sent: {}", frame, err);
                }
                next_ready = now + self.config.ready_resend_interval;
            }

            let wait = next_ready.min(deadline).saturating_duration_since(now);
            self.socket
                .set_read_timeout(Some(wait.max(MIN_WAIT)))
                .map_err(io_error)?;

            match self.socket.recv_from(&mut buffer) {
                Ok((length, from)) => match BarrierMessage::from_bytes(&buffer[..length]) {
                    Ok(BarrierMessage::Release { frame: released }) if released == frame => {
                        return Ok(());
                    }
                    Ok(message) => trace!("ignoring {:?} while waiting for frame {}", message, frame),
                    Err(err) => debug!("discarding malformed barrier datagram from {}: {}", from, err),
                },
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                // the aggregator is not up yet
                Err(err)
                    if matches!(
                        err.kind(),
                        ErrorKind::ConnectionReset | ErrorKind::ConnectionRefused
                    ) => {}
                Err(err) => return Err(io_error(err)),
            }
        }
    }
}

fn io_error(err: io::Error) -> BarrierError {
    BarrierError::Io {
        message: err.to_string(),
    }
}
