use std::{
    collections::HashMap,
    io::{self, ErrorKind},
    net::{SocketAddr, UdpSocket},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{debug, info, trace, warn};

use cavesync_shared::{BarrierMessage, BarrierRound, ClusterConfig, NodeId, ReadyOutcome};

/// Collects readiness from every render node and releases each frame once
/// the whole cluster is ready. Never gates on rendering itself.
pub(crate) struct BarrierAggregator {
    socket: UdpSocket,
    round: BarrierRound,
    release_addresses: HashMap<NodeId, SocketAddr>,
    running: Arc<AtomicBool>,
}

impl BarrierAggregator {
    /// Binds the aggregator socket on the server's barrier address
    pub(crate) fn bind(config: &ClusterConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind(config.server.barrier_address())?;
        socket.set_read_timeout(Some(config.sync.listen_poll_interval))?;

        let release_addresses = config
            .nodes
            .iter()
            .map(|node| (node.id, node.barrier_address()))
            .collect();

        Ok(Self {
            socket,
            round: BarrierRound::new(config.node_ids()),
            release_addresses,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub(crate) fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub(crate) fn spawn(self) -> io::Result<AggregatorHandle> {
        let running = Arc::clone(&self.running);
        let handle = thread::Builder::new()
            .name("cavesync-barrier".to_string())
            .spawn(move || self.run())?;
        Ok(AggregatorHandle { running, handle })
    }

    fn run(mut self) {
        let mut buffer = [0u8; 16];
        info!(
            "frame barrier aggregating {} node(s) on {:?}",
            self.release_addresses.len(),
            self.socket.local_addr().ok()
        );

        while self.running.load(Ordering::Acquire) {
            match self.socket.recv_from(&mut buffer) {
                Ok((length, from)) => self.receive(&buffer[..length], from),
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(err) => debug!("frame barrier socket: {}", err),
            }
        }

        debug!(
            "frame barrier aggregator exiting at frame {}",
            self.round.current_frame()
        );
    }

    fn receive(&mut self, datagram: &[u8], from: SocketAddr) {
        let (node_id, frame) = match BarrierMessage::from_bytes(datagram) {
            Ok(BarrierMessage::Ready { node_id, frame }) => (node_id, frame),
            Ok(message) => {
                debug!("unexpected {:?} from {}", message, from);
                return;
            }
            Err(err) => {
                debug!("discarding malformed barrier datagram from {}: {}", from, err);
                return;
            }
        };

        match self.round.on_ready(node_id, frame) {
            ReadyOutcome::Released { frame } => {
                trace!("frame {} released", frame);
                let release = BarrierMessage::Release { frame }.to_bytes();
                for address in self.release_addresses.values() {
                    self.send(&release, *address);
                }
            }
            ReadyOutcome::RepeatRelease { frame } => {
                if let Some(address) = self.release_addresses.get(&node_id) {
                    self.send(&BarrierMessage::Release { frame }.to_bytes(), *address);
                }
            }
            ReadyOutcome::Pending { .. } | ReadyOutcome::Buffered { .. } => {}
            ReadyOutcome::Stale { frame } => {
                debug!("node {} is ready for finished frame {}", node_id, frame);
            }
            ReadyOutcome::TooFarAhead { frame } => {
                warn!(
                    "node {} is ready for frame {} while the barrier is at {}",
                    node_id,
                    frame,
                    self.round.current_frame()
                );
            }
            ReadyOutcome::UnknownNode { node_id } => {
                warn!("readiness from unconfigured node {} at {}", node_id, from);
            }
        }
    }

    fn send(&self, datagram: &[u8], address: SocketAddr) {
        if let Err(err) = self.socket.send_to(datagram, address) {
            warn!("frame release to {} dropped: {}", address, err);
        }
    }
}

pub(crate) struct AggregatorHandle {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl AggregatorHandle {
    /// Stops the aggregator thread and waits for it to release its socket
    pub(crate) fn stop(self) {
        self.running.store(false, Ordering::Release);
        if self.handle.join().is_err() {
            warn!("frame barrier thread panicked");
        }
    }
}
