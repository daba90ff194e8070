use log::{trace, warn};

use cavesync_shared::{
    calibration_object_id, ChannelParams, ClusterConfig, Mat4, NodeId, RegistryError, Role,
    ScreenGeometry, SyncObject, SyncRegistry, ViewCalibration, ViewConfig, CALIBRATION_CHANNEL,
};

struct NodeView {
    node_id: NodeId,
    screen: ScreenGeometry,
    object: SyncObject<ViewCalibration>,
    current: ViewCalibration,
}

/// Server-side view calibration: one point-to-point SENDER object per
/// render node, recomputed from the node's screen and the shared poses.
pub(crate) struct NodeViews {
    view: ViewConfig,
    head_pose: Mat4,
    scene: Mat4,
    nodes: Vec<NodeView>,
}

impl NodeViews {
    pub(crate) fn new(config: &ClusterConfig) -> Self {
        let nodes = config
            .nodes
            .iter()
            .map(|node| NodeView {
                node_id: node.id,
                screen: node.screen,
                object: SyncObject::new(calibration_object_id(node.id), ViewCalibration::default()),
                current: ViewCalibration::default(),
            })
            .collect();

        let mut views = Self {
            view: config.view.clone(),
            head_pose: Mat4::IDENTITY,
            scene: Mat4::IDENTITY,
            nodes,
        };
        views.recompute();
        views
    }

    /// Adds every node's calibration object to the server registry, each
    /// addressed to its own node only
    pub(crate) fn register(
        &self,
        config: &ClusterConfig,
        registry: &mut SyncRegistry,
    ) -> Result<(), RegistryError> {
        for (view, node) in self.nodes.iter().zip(&config.nodes) {
            let params = ChannelParams::new(CALIBRATION_CHANNEL).to_only(vec![node.sync_address()]);
            registry.add_reserved_sync_object(&view.object, Role::Sender, params)?;
            view.object.set_data(view.current);
        }
        Ok(())
    }

    pub(crate) fn head_pose(&self) -> &Mat4 {
        &self.head_pose
    }

    pub(crate) fn set_head_pose(&mut self, pose: Mat4) {
        self.head_pose = pose;
    }

    pub(crate) fn scene_transform(&self) -> &Mat4 {
        &self.scene
    }

    pub(crate) fn set_scene_transform(&mut self, scene: Mat4) {
        self.scene = scene;
    }

    pub(crate) fn calibration(&self, node_id: NodeId) -> Option<ViewCalibration> {
        self.nodes
            .iter()
            .find(|view| view.node_id == node_id)
            .map(|view| view.current)
    }

    /// Recomputes every node's calibration from the current poses. A node
    /// whose eyes are not in front of its screen keeps its previous
    /// matrices. Returns the number of nodes updated.
    pub(crate) fn recompute(&mut self) -> usize {
        let mut updated = 0;
        for view in &mut self.nodes {
            let Some(calibration) =
                ViewCalibration::compute(&view.screen, &self.view, &self.head_pose, &self.scene)
            else {
                warn!(
                    "no valid projection for node {}: eye outside its screen frustum",
                    view.node_id
                );
                continue;
            };
            view.current = calibration;
            // not registered yet while constructing; `register` stages it
            if view.object.role().is_some() {
                view.object.set_data(calibration);
            }
            updated += 1;
        }
        updated
    }

    /// Pushes the current calibrations right away
    pub(crate) fn publish(&self) {
        for view in &self.nodes {
            if let Err(err) = view.object.try_send() {
                trace!("calibration for node {} not sent: {}", view.node_id, err);
            }
        }
    }
}
