/// Start/stop behaviour of whole servers and nodes

use cavesync_node::RenderNodeError;
use cavesync_server::RenderServerError;
use cavesync_shared::{RegistryError, RegistryState};
use cavesync_test::TestCluster;

#[test]
fn stop_without_start_is_a_no_op() {
    let cluster = TestCluster::new(2);
    let mut server = cluster.server();
    let mut node = cluster.node(1);

    server.stop_synching();
    server.stop_synching();
    node.stop_synching();
    node.stop_synching();

    assert_eq!(server.state(), RegistryState::Uninitialized);
    assert_eq!(node.state(), RegistryState::Uninitialized);

    // still usable afterwards
    server.init().unwrap();
    server.start_synching().unwrap();
    assert_eq!(server.state(), RegistryState::Running);
}

#[test]
fn second_stop_has_no_further_effect() {
    let cluster = TestCluster::new(1);
    let mut node = cluster.node(0);
    node.init().unwrap();
    node.start_synching().unwrap();

    node.stop_synching();
    assert_eq!(node.state(), RegistryState::Stopped);
    node.stop_synching();
    assert_eq!(node.state(), RegistryState::Stopped);

    assert_eq!(
        node.start_synching(),
        Err(RenderNodeError::Registry(RegistryError::InvalidState {
            operation: "start synching",
            state: RegistryState::Stopped
        }))
    );
}

#[test]
fn ports_are_released_on_stop_and_on_drop() {
    let cluster = TestCluster::new(2);

    for _ in 0..3 {
        let mut server = cluster.server();
        let mut node = cluster.node(0);
        server.init().unwrap();
        node.init().unwrap();
        server.start_synching().unwrap();
        node.start_synching().unwrap();
        server.stop_synching();
        node.stop_synching();
    }

    for _ in 0..3 {
        let mut server = cluster.server();
        let mut node = cluster.node(1);
        server.init().unwrap();
        node.init().unwrap();
        server.start_synching().unwrap();
        node.start_synching().unwrap();
        // dropped while running
    }
}

#[test]
fn running_server_cannot_be_started_twice() {
    let cluster = TestCluster::new(1);
    let mut server = cluster.server();
    server.init().unwrap();
    server.start_synching().unwrap();

    assert_eq!(
        server.start_synching(),
        Err(RenderServerError::Registry(RegistryError::InvalidState {
            operation: "start synching",
            state: RegistryState::Running
        }))
    );
    assert_eq!(server.state(), RegistryState::Running);
}
