use std::{
    collections::HashSet,
    fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{calibration::screen::ScreenGeometry, ConfigError, NodeId};

/// Largest node id that still fits the reserved calibration object range.
pub const MAX_NODE_ID: NodeId = 0x0FFF;

/// Static topology of a cluster: one coordinator and a fixed set of render
/// nodes. Loaded once at process start and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Where the coordinator receives node traffic
    pub server: ServerEndpoint,
    /// Every render node taking part in the frame barrier
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
    /// Value channel timing
    #[serde(default)]
    pub sync: SyncConfig,
    /// Frame barrier timing
    #[serde(default)]
    pub barrier: BarrierConfig,
    /// Stereo projection parameters
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    pub host: IpAddr,
    /// Base port; channel `c` is received on `sync_port + c`
    pub sync_port: u16,
    /// Port the barrier aggregator listens on
    pub barrier_port: u16,
}

impl ServerEndpoint {
    pub fn sync_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.sync_port)
    }

    pub fn barrier_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.barrier_port)
    }
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            sync_port: 7400,
            barrier_port: 7500,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    pub host: IpAddr,
    /// Base port; channel `c` is received on `sync_port + c`
    pub sync_port: u16,
    /// Port the node receives barrier releases on
    pub barrier_port: u16,
    /// Physical placement of the wall this node projects onto
    pub screen: ScreenGeometry,
}

impl NodeEntry {
    pub fn sync_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.sync_port)
    }

    pub fn barrier_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.barrier_port)
    }
}

/// Contains Config properties which will be used by every sync registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How often every SENDER object's current value is retransmitted
    #[serde(with = "super::millis")]
    pub resend_interval: Duration,
    /// How long a listener blocks on its socket before checking for shutdown
    #[serde(with = "super::millis")]
    pub listen_poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            resend_interval: Duration::from_millis(100),
            listen_poll_interval: Duration::from_millis(10),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierConfig {
    /// How long `synch_frame` waits for the rest of the cluster
    #[serde(with = "super::millis")]
    pub timeout: Duration,
    /// Timeout for the very first round, while the cluster is still starting
    #[serde(with = "super::millis")]
    pub first_frame_timeout: Duration,
    /// How often a waiting node repeats its readiness
    #[serde(with = "super::millis")]
    pub ready_resend_interval: Duration,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1000),
            first_frame_timeout: Duration::from_secs(10),
            ready_resend_interval: Duration::from_millis(5),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Interpupillary distance, in the same unit as the screen corners
    pub eye_separation: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            eye_separation: 0.064,
            near: 0.05,
            far: 1000.0,
        }
    }
}

impl ClusterConfig {
    /// Parses and validates a cluster description
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a cluster description file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&input)
    }

    pub fn node(&self, id: NodeId) -> Result<&NodeEntry, ConfigError> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .ok_or(ConfigError::UnknownNode { id })
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|node| node.id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_port("server sync_port", self.server.sync_port)?;
        check_port("server barrier_port", self.server.barrier_port)?;

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.id > MAX_NODE_ID {
                return Err(ConfigError::NodeIdOutOfRange {
                    id: node.id,
                    max: MAX_NODE_ID,
                });
            }
            if !seen.insert(node.id) {
                return Err(ConfigError::DuplicateNode { id: node.id });
            }
            check_port(&format!("node {} sync_port", node.id), node.sync_port)?;
            check_port(&format!("node {} barrier_port", node.id), node.barrier_port)?;
            node.screen
                .validate()
                .map_err(|reason| ConfigError::InvalidScreen {
                    id: node.id,
                    reason,
                })?;
        }

        check_timing("sync.resend_interval", self.sync.resend_interval)?;
        check_timing("sync.listen_poll_interval", self.sync.listen_poll_interval)?;
        check_timing("barrier.timeout", self.barrier.timeout)?;
        check_timing("barrier.first_frame_timeout", self.barrier.first_frame_timeout)?;
        check_timing("barrier.ready_resend_interval", self.barrier.ready_resend_interval)?;

        if !(self.view.near > 0.0) {
            return Err(ConfigError::InvalidView {
                reason: "near must be greater than zero",
            });
        }
        if !(self.view.far > self.view.near) {
            return Err(ConfigError::InvalidView {
                reason: "far must be greater than near",
            });
        }
        if !(self.view.eye_separation >= 0.0) {
            return Err(ConfigError::InvalidView {
                reason: "eye_separation must not be negative",
            });
        }

        Ok(())
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            server: ServerEndpoint::default(),
            nodes: Vec::new(),
            sync: SyncConfig::default(),
            barrier: BarrierConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

fn check_port(endpoint: &str, port: u16) -> Result<(), ConfigError> {
    if port == 0 {
        return Err(ConfigError::InvalidPort {
            endpoint: endpoint.to_string(),
        });
    }
    Ok(())
}

fn check_timing(field: &'static str, duration: Duration) -> Result<(), ConfigError> {
    if duration.is_zero() {
        return Err(ConfigError::InvalidTiming { field });
    }
    Ok(())
}
