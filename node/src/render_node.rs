use log::info;

use cavesync_shared::{
    calibration_object_id, ChannelParams, ClusterConfig, FrameIndex, HostType, Mat4, NodeEntry,
    NodeId, RegistryEndpoints, RegistryError, RegistryState, Role, SyncObject, SyncPayload,
    SyncRegistry, ViewCalibration, CALIBRATION_CHANNEL,
};

use crate::{BarrierError, FrameBarrier, RenderNodeError};

/// One render process of the cluster.
///
/// Application RECEIVER objects listen on the node's `sync_port` (plus
/// their channel); SENDER objects go to the render server. The node's view
/// calibration arrives on a reserved object registered automatically.
pub struct RenderNode {
    node_id: NodeId,
    config: ClusterConfig,
    registry: SyncRegistry,
    calibration: SyncObject<ViewCalibration>,
    barrier: Option<FrameBarrier>,
}

impl RenderNode {
    /// Prepares the node `node_id` of `config`
    pub fn new(config: ClusterConfig, node_id: NodeId) -> Result<Self, RenderNodeError> {
        config.validate()?;
        let entry = config.node(node_id)?;

        let endpoints = RegistryEndpoints {
            listen: entry.sync_address(),
            peers: vec![config.server.sync_address()],
        };
        let mut registry =
            SyncRegistry::new(HostType::Node(node_id), endpoints, config.sync.clone());

        let calibration = SyncObject::new(
            calibration_object_id(node_id),
            ViewCalibration::default(),
        );
        registry.add_reserved_sync_object(
            &calibration,
            Role::Receiver,
            ChannelParams::new(CALIBRATION_CHANNEL),
        )?;

        Ok(Self {
            node_id,
            config,
            registry,
            calibration,
            barrier: None,
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// This node's entry in the cluster configuration
    pub fn entry(&self) -> &NodeEntry {
        match self.config.node(self.node_id) {
            Ok(entry) => entry,
            Err(_) => unreachable!("node entry checked on construction"),
        }
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
    ) -> Result<(), RenderNodeError> {
        self.registry.add_sync_object(object, role, params)?;
        Ok(())
    }

    pub fn init(&mut self) -> Result<(), RenderNodeError> {
        self.registry.init()?;
        Ok(())
    }

    // Lifecycle

    /// Opens the barrier socket and starts the value channels
    pub fn start_synching(&mut self) -> Result<(), RenderNodeError> {
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

        let entry = self.entry();
        let address = entry.barrier_address();
        let barrier = FrameBarrier::bind(
            self.node_id,
            address,
            self.config.server.barrier_address(),
            self.config.barrier.clone(),
        )
        .map_err(|err| RenderNodeError::Barrier {
            address,
            message: err.to_string(),
        })?;

        self.registry.start_synching()?;
        self.barrier = Some(barrier);
        info!("node {}: synching", self.node_id);
        Ok(())
    }

    /// Stops every background thread and closes the barrier socket. Safe to
    /// call at any time.
    pub fn stop_synching(&mut self) {
        self.registry.stop_synching();
        self.barrier = None;
    }

    // Frame barrier

    /// Call once per frame after all GPU work has been submitted and before
    /// presenting. Blocks until every node is ready for the same frame.
    /// Any error is terminal: the caller should stop rendering.
    ///
    /// # Panics
    /// Panics if the node is not synching.
    pub fn synch_frame(&mut self) -> Result<FrameIndex, BarrierError> {
        let node_id = self.node_id;
        match self.barrier.as_mut() {
            Some(barrier) => barrier.wait(),
            None => panic!("node {}: synch_frame called while not synching", node_id),
        }
    }

    /// Frame the next `synch_frame` will synchronize
    pub fn frame_index(&self) -> FrameIndex {
        self.barrier
            .as_ref()
            .map(FrameBarrier::frame_index)
            .unwrap_or_default()
    }

    // View calibration

    /// Latest calibration received from the render server.
    ///
    /// # Panics
    /// Panics if the node never started synching.
    pub fn calibration(&self) -> ViewCalibration {
        self.calibration.get_data()
    }

    /// Left and right eye projections for this node's screen
    pub fn projection_matrices(&self) -> (Mat4, Mat4) {
        let calibration = self.calibration();
        (calibration.left, calibration.right)
    }

    /// Shared view transform applied to the scene
    pub fn scene_transform(&self) -> Mat4 {
        self.calibration().scene
    }

    /// True once per newly received calibration
    pub fn calibration_changed(&self) -> bool {
        self.calibration.has_changed()
    }
}

impl Drop for RenderNode {
    fn drop(&mut self) {
        self.stop_synching();
    }
}
