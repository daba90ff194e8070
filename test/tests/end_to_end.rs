/// A small cluster the way an application drives it: the server publishes
/// a millisecond clock and a W/A/S/D key vector, nodes read them, report a
/// status back and cross the frame barrier every frame

use std::{thread, time::Duration};

use cavesync_shared::{ChannelParams, Role, SyncObject};
use cavesync_test::{assert_eventually, TestCluster};

const CLOCK: u16 = 1;
const KEYS: u16 = 2;
const STATUS_BASE: u16 = 10;

#[test]
fn clock_and_keys_reach_every_node() {
    let _ = env_logger::builder().is_test(true).try_init();
    let cluster = TestCluster::new(2);

    let mut server = cluster.server();
    let clock = SyncObject::new(CLOCK, 0i64);
    let keys = SyncObject::new(KEYS, [false; 4]);
    server
        .add_sync_object(&clock, Role::Sender, ChannelParams::new(0))
        .unwrap();
    server
        .add_sync_object(&keys, Role::Sender, ChannelParams::new(1))
        .unwrap();
    server.init().unwrap();

    let mut nodes = Vec::new();
    let mut node_clocks = Vec::new();
    let mut node_keys = Vec::new();
    for id in 0..2 {
        let mut node = cluster.node(id);
        let clock = SyncObject::new(CLOCK, 0i64);
        let keys = SyncObject::new(KEYS, [false; 4]);
        node.add_sync_object(&clock, Role::Receiver, ChannelParams::new(0))
            .unwrap();
        node.add_sync_object(&keys, Role::Receiver, ChannelParams::new(1))
            .unwrap();
        node.init().unwrap();
        node.start_synching().unwrap();
        nodes.push(node);
        node_clocks.push(clock);
        node_keys.push(keys);
    }
    server.start_synching().unwrap();

    for tick in 1..=5i64 {
        clock.set_data(tick * 16);
        clock.send();
        for node_clock in &node_clocks {
            assert_eventually!(node_clock.get_data() == tick * 16);
        }
    }

    // W pressed and sent
    keys.set_data([true, false, false, false]);
    keys.send();
    for node_keys in &node_keys {
        assert_eventually!(node_keys.get_data() == [true, false, false, false]);
        assert!(node_keys.has_changed());
    }

    // released but never explicitly sent: the periodic resend delivers it
    keys.set_data([false; 4]);
    for node_keys in &node_keys {
        assert_eventually!(node_keys.get_data() == [false; 4]);
    }
}

#[test]
fn nodes_report_back_and_stay_in_step() {
    let cluster = TestCluster::new(2);

    let mut server = cluster.server();
    let clock = SyncObject::new(CLOCK, 0i64);
    server
        .add_sync_object(&clock, Role::Sender, ChannelParams::new(0))
        .unwrap();
    let statuses: Vec<SyncObject<u32>> = (0..2)
        .map(|id| SyncObject::new(STATUS_BASE + id, 0u32))
        .collect();
    for status in &statuses {
        server
            .add_sync_object(status, Role::Receiver, ChannelParams::new(1))
            .unwrap();
    }
    server.init().unwrap();
    server.start_synching().unwrap();

    let handles: Vec<_> = (0..2u16)
        .map(|id| {
            let mut node = cluster.node(id);
            let clock = SyncObject::new(CLOCK, 0i64);
            let status = SyncObject::new(STATUS_BASE + id, 0u32);
            node.add_sync_object(&clock, Role::Receiver, ChannelParams::new(0))
                .unwrap();
            node.add_sync_object(&status, Role::Sender, ChannelParams::new(1))
                .unwrap();
            node.init().unwrap();
            node.start_synching().unwrap();

            thread::spawn(move || {
                for _ in 0..10 {
                    // render with whatever clock value is current
                    let _now = clock.get_data();
                    let (_left, _right) = node.projection_matrices();
                    let frame = node.synch_frame().unwrap();
                    status.set_data(frame);
                    status.send();
                }
                node
            })
        })
        .collect();

    for tick in 0..10i64 {
        clock.set_data(tick);
        clock.send();
        thread::sleep(Duration::from_millis(2));
    }

    let nodes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    for node in &nodes {
        assert_eq!(node.frame_index(), 10);
    }
    for status in &statuses {
        assert_eventually!(status.get_data() == 9);
    }
}
