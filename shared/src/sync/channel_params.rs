use std::net::SocketAddr;

/// Where a sync object travels. `channel` is added to the base port of the
/// receiving side, so objects on the same channel share one socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelParams {
    pub channel: u16,
    pub destinations: Destinations,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destinations {
    /// Every peer the registry knows about (all nodes, or the server)
    AllPeers,
    /// Only these base addresses (point-to-point delivery)
    Only(Vec<SocketAddr>),
}

impl ChannelParams {
    pub fn new(channel: u16) -> Self {
        Self {
            channel,
            destinations: Destinations::AllPeers,
        }
    }

    pub fn to_only(mut self, base_addresses: Vec<SocketAddr>) -> Self {
        self.destinations = Destinations::Only(base_addresses);
        self
    }

    /// Resolves the channel port on top of a base address
    pub fn channel_address(&self, base: SocketAddr) -> Option<SocketAddr> {
        let port = base.port().checked_add(self.channel)?;
        Some(SocketAddr::new(base.ip(), port))
    }
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self::new(0)
    }
}
