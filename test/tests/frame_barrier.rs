/// Frame barrier behaviour across a localhost cluster: alignment of the
/// release, slow nodes inside the timeout and terminal timeouts

use std::{
    sync::{Arc, Barrier},
    thread,
    time::{Duration, Instant},
};

use cavesync_node::{BarrierError, RenderNode};
use cavesync_test::TestCluster;

// generous bound for "released together" on a loaded CI machine
const SKEW: Duration = Duration::from_millis(60);

fn started_nodes(cluster: &TestCluster, count: u16) -> Vec<RenderNode> {
    (0..count)
        .map(|id| {
            let mut node = cluster.node(id);
            node.init().unwrap();
            node.start_synching().unwrap();
            node
        })
        .collect()
}

fn spread(instants: &[Instant]) -> Duration {
    let earliest = instants.iter().min().unwrap();
    let latest = instants.iter().max().unwrap();
    latest.duration_since(*earliest)
}

#[test]
fn nodes_are_released_together_every_frame() {
    let _ = env_logger::builder().is_test(true).try_init();
    const FRAMES: u32 = 20;

    let cluster = TestCluster::new(3);
    let mut server = cluster.server();
    server.init().unwrap();
    server.start_synching().unwrap();

    let handles: Vec<_> = started_nodes(&cluster, 3)
        .into_iter()
        .map(|mut node| {
            thread::spawn(move || {
                let id = u32::from(node.node_id());
                let mut released = Vec::new();
                for frame in 0..FRAMES {
                    // uneven render cost per node and frame
                    thread::sleep(Duration::from_millis(u64::from((id * 3 + frame) % 5)));
                    assert_eq!(node.synch_frame(), Ok(frame));
                    released.push(Instant::now());
                }
                assert_eq!(node.frame_index(), FRAMES);
                released
            })
        })
        .collect();

    let per_node: Vec<Vec<Instant>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    for frame in 0..FRAMES as usize {
        let instants: Vec<Instant> = per_node.iter().map(|times| times[frame]).collect();
        assert!(
            spread(&instants) < SKEW,
            "frame {} released {:?} apart",
            frame,
            spread(&instants)
        );
    }
}

#[test]
fn slow_node_holds_everyone_back_within_the_timeout() {
    let cluster = TestCluster::new(3);
    let mut server = cluster.server();
    server.init().unwrap();
    server.start_synching().unwrap();

    let start = Arc::new(Barrier::new(3));
    let handles: Vec<_> = started_nodes(&cluster, 3)
        .into_iter()
        .map(|mut node| {
            let start = Arc::clone(&start);
            thread::spawn(move || {
                assert_eq!(node.synch_frame(), Ok(0));
                start.wait();

                let called = Instant::now();
                if node.node_id() == 2 {
                    thread::sleep(Duration::from_millis(150));
                }
                assert_eq!(node.synch_frame(), Ok(1));
                (called, Instant::now())
            })
        })
        .collect();

    let results: Vec<(Instant, Instant)> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    // the threads leave the start line a few scheduler ticks apart
    for (called, released) in &results {
        assert!(released.duration_since(*called) >= Duration::from_millis(140));
    }
    let releases: Vec<Instant> = results.iter().map(|(_, released)| *released).collect();
    assert!(spread(&releases) < SKEW);
}

#[test]
fn missing_node_times_out_everyone_else() {
    let timeout = Duration::from_millis(300);
    let cluster = TestCluster::new(3).with_barrier_timeout(timeout);
    let mut server = cluster.server();
    server.init().unwrap();
    server.start_synching().unwrap();

    let mut nodes = started_nodes(&cluster, 3);
    // node 2 takes part in frame 0, then never reports again
    let silent = nodes.pop().unwrap();
    let silent_handle = thread::spawn(move || {
        let mut silent = silent;
        assert_eq!(silent.synch_frame(), Ok(0));
        silent
    });

    let handles: Vec<_> = nodes
        .into_iter()
        .map(|mut node| {
            thread::spawn(move || {
                assert_eq!(node.synch_frame(), Ok(0));
                let called = Instant::now();
                let result = node.synch_frame();
                let returned = Instant::now();
                // once failed, the barrier never touches the network again
                assert_eq!(
                    node.synch_frame(),
                    Err(BarrierError::Desynchronized { frame: 1 })
                );
                (result, called, returned)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    let _silent = silent_handle.join().unwrap();

    for (result, called, returned) in &results {
        assert!(matches!(result, Err(BarrierError::Timeout { frame: 1, .. })));
        let waited = returned.duration_since(*called);
        assert!(waited >= timeout, "returned early after {:?}", waited);
        assert!(waited < timeout + Duration::from_millis(250), "returned late after {:?}", waited);
    }
    let returns: Vec<Instant> = results.iter().map(|(_, _, returned)| *returned).collect();
    assert!(spread(&returns) < SKEW);
}
