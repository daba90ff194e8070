use log::{info, warn};

use cavesync_shared::{
    ChannelParams, ClusterConfig, HostType, Mat4, NodeId, RegistryEndpoints, RegistryError,
    RegistryState, Role, SyncObject, SyncPayload, SyncRegistry, ViewCalibration,
};

use crate::{
    barrier::{AggregatorHandle, BarrierAggregator},
    views::NodeViews,
    RenderServerError,
};

/// The coordinator process of a cluster.
///
/// Application SENDER objects (clock, input) are broadcast to every render
/// node; RECEIVER objects listen on the server's `sync_port`. Starting the
/// server also starts the frame barrier aggregator.
pub struct RenderServer {
    config: ClusterConfig,
    registry: SyncRegistry,
    views: NodeViews,
    aggregator: Option<AggregatorHandle>,
}

impl RenderServer {
    /// Validates `config` and prepares one calibration object per node
    pub fn new(config: ClusterConfig) -> Result<Self, RenderServerError> {
        config.validate()?;

        let endpoints = RegistryEndpoints {
            listen: config.server.sync_address(),
            peers: config.nodes.iter().map(|node| node.sync_address()).collect(),
        };
        let mut registry = SyncRegistry::new(HostType::Server, endpoints, config.sync.clone());

        let views = NodeViews::new(&config);
        views.register(&config, &mut registry)?;

        Ok(Self {
            config,
            registry,
            views,
            aggregator: None,
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn state(&self) -> RegistryState {
        self.registry.state()
    }

    pub fn registry(&self) -> &SyncRegistry {
        &self.registry
    }

    // Registration

    /// Adds an application object. Only legal before `init`.
    pub fn add_sync_object<T: SyncPayload>(
        &mut self,
        object: &SyncObject<T>,
        role: Role,
        params: ChannelParams,
    ) -> Result<(), RenderServerError> {
        self.registry.add_sync_object(object, role, params)?;
        Ok(())
    }

    pub fn init(&mut self) -> Result<(), RenderServerError> {
        self.registry.init()?;
        Ok(())
    }

    // Lifecycle

    /// Starts the value channels and the frame barrier aggregator
    pub fn start_synching(&mut self) -> Result<(), RenderServerError> {
        let address = self.config.server.barrier_address();
        let barrier_error = |err: std::io::Error| RenderServerError::Barrier {
            address,
            message: err.to_string(),
        };

        let state = self.registry.state();
        if state != RegistryState::Uninitialized {
            return Err(RegistryError::InvalidState {
                operation: "start synching",
                state,
            }
            .into());
        }
        if !self.registry.is_initialized() {
            return Err(RegistryError::NotInitialized.into());
        }

        // bound before the registry starts so a busy port leaves the
        // server startable
        let aggregator = BarrierAggregator::bind(&self.config).map_err(barrier_error)?;
        self.registry.start_synching()?;

        match aggregator.spawn() {
            Ok(handle) => self.aggregator = Some(handle),
            Err(err) => {
                self.registry.stop_synching();
                return Err(barrier_error(err));
            }
        }

        self.views.publish();
        info!(
            "render server synching with {} node(s)",
            self.config.nodes.len()
        );
        Ok(())
    }

    /// Stops every background thread. Safe to call at any time.
    pub fn stop_synching(&mut self) {
        if let Some(aggregator) = self.aggregator.take() {
            aggregator.stop();
        }
        self.registry.stop_synching();
    }

    // View calibration

    pub fn head_pose(&self) -> &Mat4 {
        self.views.head_pose()
    }

    /// Tracked head pose in the shared tracking space
    pub fn set_head_pose(&mut self, pose: Mat4) {
        self.views.set_head_pose(pose);
    }

    pub fn scene_transform(&self) -> &Mat4 {
        self.views.scene_transform()
    }

    /// Shared navigation transform applied to the scene on every node
    pub fn set_scene_transform(&mut self, scene: Mat4) {
        self.views.set_scene_transform(scene);
    }

    /// Recomputes every node's projection matrices and, once running, sends
    /// each node its own. Returns the number of nodes updated.
    pub fn update_views(&mut self) -> usize {
        let updated = self.views.recompute();
        if updated < self.config.nodes.len() {
            warn!(
                "{} of {} node view(s) kept their previous calibration",
                self.config.nodes.len() - updated,
                self.config.nodes.len()
            );
        }
        if self.registry.state() == RegistryState::Running {
            self.views.publish();
        }
        updated
    }

    /// Calibration last computed for `node_id`
    pub fn calibration(&self, node_id: NodeId) -> Option<ViewCalibration> {
        self.views.calibration(node_id)
    }
}

impl Drop for RenderServer {
    fn drop(&mut self) {
        self.stop_synching();
    }
}
