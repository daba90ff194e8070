use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use cavesync_shared::{ByteWriter, ObjectId, Serde, SequenceNumber, SyncPacket};

/// Sends hand-built sync datagrams straight to a receiving port, so tests
/// control sequence numbers and ordering exactly.
pub struct DatagramInjector {
    socket: UdpSocket,
    target: SocketAddr,
}

impl DatagramInjector {
    pub fn new(target: SocketAddr) -> Self {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("localhost bind");
        Self { socket, target }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn send_value<T: Serde>(&self, id: ObjectId, sequence: SequenceNumber, value: &T) {
        let mut writer = ByteWriter::new();
        value.ser(&mut writer);
        let datagram = SyncPacket::write(id, sequence, writer.as_slice()).expect("small payload");
        self.send_raw(&datagram);
    }

    pub fn send_raw(&self, datagram: &[u8]) {
        self.socket
            .send_to(datagram, self.target)
            .expect("loopback send");
    }
}
