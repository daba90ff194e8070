pub mod barrier_message;
pub mod error;
pub mod sync_packet;
