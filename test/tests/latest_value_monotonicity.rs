/// PROPERTY-BASED TESTS: latest-value semantics
///
/// Whatever order updates arrive in, a receiver ends on the newest one and
/// never goes back to an older sequence number once a newer one was taken.

use std::{net::SocketAddr, time::Duration};

use proptest::prelude::*;

use cavesync_shared::{
    sequence_greater_than, ChannelParams, HostType, RegistryEndpoints, Role, SyncConfig,
    SyncObject, SyncRegistry, ValueCell,
};
use cavesync_test::{reserve_ports, wait_until, DatagramInjector};

const VALUE_ID: u16 = 1;
const PROBE_ID: u16 = 2;

// distinct sequence numbers, possibly straddling the u32 wrap point
fn sequences() -> impl Strategy<Value = Vec<u32>> {
    (any::<u32>(), 2usize..12).prop_flat_map(|(start, len)| {
        let ordered: Vec<u32> = (0..len as u32).map(|step| start.wrapping_add(step)).collect();
        Just(ordered).prop_shuffle()
    })
}

fn newest(sequences: &[u32]) -> u32 {
    sequences
        .iter()
        .copied()
        .fold(sequences[0], |newest, sequence| {
            if sequence_greater_than(sequence, newest) {
                sequence
            } else {
                newest
            }
        })
}

proptest! {
    #[test]
    fn prop_cell_never_regresses(order in sequences()) {
        let cell = ValueCell::new(VALUE_ID, u32::MAX);
        let mut seen: Option<u32> = None;

        for sequence in &order {
            let accepted = cell.accept_remote(*sequence, *sequence);
            let expected = match seen {
                None => true,
                Some(current) => sequence_greater_than(*sequence, current),
            };
            prop_assert_eq!(accepted, expected);
            if accepted {
                seen = Some(*sequence);
            }
            // value and sequence always travel together
            let snapshot = cell.snapshot();
            prop_assert_eq!(snapshot.payload, snapshot.sequence);
            prop_assert_eq!(Some(snapshot.sequence), seen);
        }

        prop_assert_eq!(cell.snapshot().payload, newest(&order));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_receiver_ends_on_newest_over_udp(order in sequences()) {
        let port = reserve_ports(1)[0];
        let listen: SocketAddr = SocketAddr::from(([127, 0, 0, 1], port));
        let mut registry = SyncRegistry::new(
            HostType::Node(0),
            RegistryEndpoints { listen, peers: Vec::new() },
            SyncConfig::default(),
        );
        let value = SyncObject::new(VALUE_ID, 0u32);
        let probe = SyncObject::new(PROBE_ID, false);
        registry.add_sync_object(&value, Role::Receiver, ChannelParams::new(0)).unwrap();
        registry.add_sync_object(&probe, Role::Receiver, ChannelParams::new(0)).unwrap();
        registry.init().unwrap();
        registry.start_synching().unwrap();

        let injector = DatagramInjector::new(listen);
        for sequence in &order {
            injector.send_value(VALUE_ID, *sequence, sequence);
        }
        // one socket, one listener: once the probe is in, so is everything before it
        injector.send_value(PROBE_ID, 1, &true);
        prop_assert!(wait_until(Duration::from_secs(2), || probe.get_data()));

        let snapshot = value.snapshot();
        prop_assert_eq!(snapshot.sequence, newest(&order));
        prop_assert_eq!(snapshot.payload, newest(&order));

        registry.stop_synching();
    }
}
