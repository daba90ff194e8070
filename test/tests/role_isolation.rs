/// The send path of a RECEIVER object is rejected every time, on both the
/// server and the node side

use std::panic::{self, AssertUnwindSafe};

use cavesync_shared::{ChannelParams, Role, SyncObject, SyncObjectError};
use cavesync_test::TestCluster;

#[test]
fn node_receivers_reject_the_send_path() {
    let cluster = TestCluster::new(1);
    let mut node = cluster.node(0);
    let keys = SyncObject::new(2, [false; 4]);
    node.add_sync_object(&keys, Role::Receiver, ChannelParams::new(0))
        .unwrap();
    node.init().unwrap();
    node.start_synching().unwrap();

    for _ in 0..100 {
        assert_eq!(
            keys.try_set_data([true; 4]),
            Err(SyncObjectError::WrongRole {
                id: 2,
                role: Role::Receiver,
                operation: "set_data"
            })
        );
        assert_eq!(
            keys.try_send(),
            Err(SyncObjectError::WrongRole {
                id: 2,
                role: Role::Receiver,
                operation: "send"
            })
        );
    }
    assert_eq!(keys.get_data(), [false; 4]);
}

#[test]
fn server_receivers_reject_the_send_path() {
    let cluster = TestCluster::new(1);
    let mut server = cluster.server();
    let status = SyncObject::new(9, 0u32);
    server
        .add_sync_object(&status, Role::Receiver, ChannelParams::new(1))
        .unwrap();
    server.init().unwrap();
    server.start_synching().unwrap();

    let rejected = panic::catch_unwind(AssertUnwindSafe(|| status.send()));
    assert!(rejected.is_err());
    assert!(status.try_set_data(1).is_err());
}

#[test]
#[should_panic(expected = "not allowed on RECEIVER sync object 2")]
fn writing_a_receiver_fails_fast() {
    let cluster = TestCluster::new(1);
    let mut node = cluster.node(0);
    let keys = SyncObject::new(2, [false; 4]);
    node.add_sync_object(&keys, Role::Receiver, ChannelParams::new(0))
        .unwrap();

    keys.set_data([true; 4]);
}
