pub mod channel;
pub mod channel_params;
pub mod error;
pub mod registry;
pub mod sync_object;
pub mod sync_value;
pub mod value_cell;
