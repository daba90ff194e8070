mod aggregator;

pub(crate) use aggregator::{AggregatorHandle, BarrierAggregator};
