pub mod assertions;
pub mod datagram_injector;
pub mod ports;

pub use assertions::wait_until;
pub use datagram_injector::DatagramInjector;
pub use ports::{reserve_port_blocks, reserve_ports};
pub use test_cluster::{cube_wall, TestCluster, TEST_CHANNELS};
