/// Per-node view calibration: computed on the server, delivered point to
/// point, identical for identical inputs and distinct per wall

use cavesync_shared::{ByteWriter, Mat4, Serde, Vec3, ViewCalibration};
use cavesync_test::{assert_eventually, TestCluster};

fn encoded(calibration: &ViewCalibration) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    calibration.ser(&mut writer);
    writer.to_bytes()
}

#[test]
fn each_node_receives_its_own_matrices() {
    let _ = env_logger::builder().is_test(true).try_init();
    let cluster = TestCluster::new(2);
    let mut server = cluster.server();
    let mut front = cluster.node(0);
    let mut left = cluster.node(1);
    for node in [&mut front, &mut left] {
        node.init().unwrap();
        node.start_synching().unwrap();
    }
    server.init().unwrap();
    server.start_synching().unwrap();

    server.set_head_pose(Mat4::from_translation(Vec3::new(0.2, 0.1, 0.3)));
    server.set_scene_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));
    assert_eq!(server.update_views(), 2);

    let expected_front = server.calibration(0).unwrap();
    let expected_left = server.calibration(1).unwrap();
    assert_ne!(encoded(&expected_front), encoded(&expected_left));

    assert_eventually!(front.calibration() == expected_front);
    assert_eventually!(left.calibration() == expected_left);
    assert!(front.calibration_changed());

    let (left_eye, right_eye) = front.projection_matrices();
    assert_eq!(left_eye, expected_front.left);
    assert_eq!(right_eye, expected_front.right);
    assert_ne!(left_eye, right_eye);
    assert_eq!(left.scene_transform(), *server.scene_transform());
}

#[test]
fn same_inputs_give_byte_identical_matrices() {
    let cluster = TestCluster::new(3);
    let head = Mat4::from_translation(Vec3::new(-0.4, 0.25, 0.1));
    let scene = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));

    let run = || {
        let mut server = cluster.server();
        server.set_head_pose(head);
        server.set_scene_transform(scene);
        server.update_views();
        (0..3)
            .map(|id| encoded(&server.calibration(id).unwrap()))
            .collect::<Vec<_>>()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);

    // and they match a direct computation from the node's geometry
    for (id, bytes) in first.iter().enumerate() {
        let direct = ViewCalibration::compute(
            &cluster.config.nodes[id].screen,
            &cluster.config.view,
            &head,
            &scene,
        )
        .unwrap();
        assert_eq!(bytes, &encoded(&direct));
    }
}

#[test]
fn late_node_catches_up_through_retransmission() {
    let cluster = TestCluster::new(1);
    let mut server = cluster.server();
    server.init().unwrap();
    server.start_synching().unwrap();
    server.set_head_pose(Mat4::from_translation(Vec3::new(0.0, 0.3, 0.0)));
    server.update_views();

    // the node starts after the server sent everything once
    let mut node = cluster.node(0);
    node.init().unwrap();
    node.start_synching().unwrap();

    let expected = server.calibration(0).unwrap();
    assert_eventually!(node.calibration() == expected);
}
