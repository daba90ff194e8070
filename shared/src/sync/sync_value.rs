use std::time::Instant;

use crate::{ObjectId, SequenceNumber};

/// One immutable version of a sync object's value. Replaced as a whole,
/// never mutated in place, so a reader holding it can never see a torn value.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncValue<T> {
    pub id: ObjectId,
    pub payload: T,
    pub sequence: SequenceNumber,
    pub last_update: Instant,
}

impl<T> SyncValue<T> {
    pub fn new(id: ObjectId, payload: T, sequence: SequenceNumber) -> Self {
        Self {
            id,
            payload,
            sequence,
            last_update: Instant::now(),
        }
    }
}
