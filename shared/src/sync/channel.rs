use std::{
    collections::HashMap,
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::{debug, trace, warn};

use crate::{sync::sync_object::RegisteredObject, ObjectId, SyncPacket};

/// Outbound half of a sync value channel: fire-and-forget datagrams to a
/// fixed list of destinations over a shared socket.
pub struct ValueSender {
    socket: Arc<UdpSocket>,
    destinations: Vec<SocketAddr>,
}

impl ValueSender {
    pub fn new(socket: Arc<UdpSocket>, destinations: Vec<SocketAddr>) -> Self {
        Self {
            socket,
            destinations,
        }
    }

    pub fn destinations(&self) -> &[SocketAddr] {
        &self.destinations
    }

    /// Sends one datagram to every destination. Failures are logged and
    /// dropped; the next update or retransmission supersedes this one.
    pub fn transmit(&self, datagram: &[u8]) {
        for address in &self.destinations {
            if let Err(err) = self.socket.send_to(datagram, address) {
                warn!("sync datagram to {} dropped: {}", address, err);
            }
        }
    }
}

/// What happened to one inbound datagram
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Accepted(ObjectId),
    Stale(ObjectId),
    UnknownObject(ObjectId),
    Malformed,
}

/// Inbound half of a sync value channel: one socket, demultiplexed by
/// object id onto every RECEIVER object sharing the port.
pub(crate) struct ValueListener {
    socket: UdpSocket,
    objects: HashMap<ObjectId, Arc<dyn RegisteredObject>>,
    running: Arc<AtomicBool>,
}

impl ValueListener {
    pub(crate) fn new(
        socket: UdpSocket,
        objects: HashMap<ObjectId, Arc<dyn RegisteredObject>>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            socket,
            objects,
            running,
        }
    }

    /// Receives until the registry clears `running`. The socket must have a
    /// read timeout so the flag is polled regularly.
    pub(crate) fn run(self) {
        let local = self.socket.local_addr().ok();
        let mut buffer = [0u8; SyncPacket::MAX_DATAGRAM_BYTES];

        while self.running.load(Ordering::Acquire) {
            match self.socket.recv_from(&mut buffer) {
                Ok((length, from)) => {
                    let delivery = deliver(&self.objects, &buffer[..length]);
                    trace!("datagram from {}: {:?}", from, delivery);
                }
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(err) => {
                    // e.g. ICMP port unreachable surfacing on some platforms
                    debug!("sync listener on {:?}: {}", local, err);
                }
            }
        }

        debug!("sync listener on {:?} exiting", local);
    }
}

/// Decodes one datagram and hands it to the addressed object
pub(crate) fn deliver(
    objects: &HashMap<ObjectId, Arc<dyn RegisteredObject>>,
    datagram: &[u8],
) -> Delivery {
    let packet = match SyncPacket::read(datagram) {
        Ok(packet) => packet,
        Err(err) => {
            debug!("discarding malformed sync datagram: {}", err);
            return Delivery::Malformed;
        }
    };

    let Some(object) = objects.get(&packet.object_id) else {
        return Delivery::UnknownObject(packet.object_id);
    };

    match object.deliver(packet.sequence, packet.payload) {
        Ok(true) => Delivery::Accepted(packet.object_id),
        Ok(false) => Delivery::Stale(packet.object_id),
        Err(err) => {
            debug!(
                "discarding undecodable payload for sync object {}: {}",
                packet.object_id, err
            );
            Delivery::Malformed
        }
    }
}
