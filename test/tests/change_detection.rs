/// Edge-triggered change detection and transport-loss tolerance on a
/// render node's RECEIVER objects

use std::time::Duration;

use cavesync_shared::{calibration_object_id, ChannelParams, Role, SyncObject};
use cavesync_test::{assert_eventually, DatagramInjector, TestCluster};

const CLOCK_ID: u16 = 1;

fn started_node(cluster: &TestCluster) -> (cavesync_node::RenderNode, SyncObject<i64>) {
    let mut node = cluster.node(0);
    let clock = SyncObject::new(CLOCK_ID, 0i64);
    node.add_sync_object(&clock, Role::Receiver, ChannelParams::new(0))
        .unwrap();
    node.init().unwrap();
    node.start_synching().unwrap();
    (node, clock)
}

#[test]
fn has_changed_fires_once_per_accepted_value() {
    let _ = env_logger::builder().is_test(true).try_init();
    let cluster = TestCluster::new(1);
    let (_node, clock) = started_node(&cluster);
    let injector = DatagramInjector::new(cluster.config.nodes[0].sync_address());

    assert!(!clock.has_changed());

    injector.send_value(CLOCK_ID, 1, &16i64);
    assert_eventually!(clock.snapshot().sequence == 1);
    assert!(clock.has_changed());
    for _ in 0..10 {
        assert!(!clock.has_changed());
    }
    assert_eq!(clock.get_data(), 16);

    // a retransmission of the same update is not a new value
    injector.send_value(CLOCK_ID, 1, &16i64);
    injector.send_value(CLOCK_ID, 2, &32i64);
    assert_eventually!(clock.snapshot().sequence == 2);
    assert!(clock.has_changed());
    assert!(!clock.has_changed());
    assert_eq!(clock.get_data(), 32);
}

#[test]
fn garbage_and_strangers_are_absorbed() {
    let cluster = TestCluster::new(1);
    let (_node, clock) = started_node(&cluster);
    let injector = DatagramInjector::new(cluster.config.nodes[0].sync_address());

    injector.send_value(CLOCK_ID, 5, &50i64);
    assert_eventually!(clock.get_data() == 50);
    assert!(clock.has_changed());

    injector.send_raw(&[]);
    injector.send_raw(&[0xde, 0xad, 0xbe, 0xef]);
    // right id, payload of the wrong width
    injector.send_value(CLOCK_ID, 6, &7u8);
    // unknown id
    injector.send_value(77, 7, &70i64);
    // stale
    injector.send_value(CLOCK_ID, 4, &40i64);
    // and a valid one to know the rest were processed
    injector.send_value(CLOCK_ID, 8, &80i64);

    assert_eventually!(clock.get_data() == 80);
    assert_eq!(clock.snapshot().sequence, 8);
    assert!(clock.has_changed());
    assert!(!clock.has_changed());
}

#[test]
fn calibration_from_a_stranger_id_is_ignored() {
    let cluster = TestCluster::new(2);
    let (node, clock) = started_node(&cluster);
    let injector = DatagramInjector::new(cluster.config.nodes[0].sync_address());
    let before = node.calibration();

    // node 1's calibration sent to node 0 by mistake
    let mut foreign = before;
    foreign.scene.cols[3][0] = 9.0;
    injector.send_value(calibration_object_id(1), 100, &foreign);
    injector.send_value(CLOCK_ID, 1, &1i64);

    assert_eventually!(clock.get_data() == 1);
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(node.calibration(), before);
}
