use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, PoisonError, RwLock,
};

use crate::{sequence_greater_than, sync::sync_value::SyncValue, ObjectId, SequenceNumber};

struct Slot<T> {
    current: Arc<SyncValue<T>>,
    // false until the first inbound value is accepted; any sequence wins then
    primed: bool,
}

/// Holds the latest accepted value. Writers swap in a whole new `Arc`;
/// readers clone the `Arc` out and never hold the lock while using it.
///
/// The read lock is held only for the `Arc` clone and the write lock only
/// for the pointer swap, so a render thread reading a snapshot waits at most
/// for one swap and never for payload decoding or I/O.
pub struct ValueCell<T> {
    slot: RwLock<Slot<T>>,
    changed: AtomicBool,
}

impl<T> ValueCell<T> {
    pub fn new(id: ObjectId, initial: T) -> Self {
        Self {
            slot: RwLock::new(Slot {
                current: Arc::new(SyncValue::new(id, initial, 0)),
                primed: false,
            }),
            changed: AtomicBool::new(false),
        }
    }

    /// Latest value. Takes the read lock for one `Arc` clone.
    pub fn snapshot(&self) -> Arc<SyncValue<T>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slot.current)
    }

    /// Stores a locally produced value under the next sequence number
    pub fn replace_local(&self, payload: T) -> Arc<SyncValue<T>> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let id = slot.current.id;
        let sequence = slot.current.sequence.wrapping_add(1);
        let next = Arc::new(SyncValue::new(id, payload, sequence));
        slot.current = Arc::clone(&next);
        slot.primed = true;
        next
    }

    /// Stores an inbound value if it is newer than the current one.
    /// Returns whether it was accepted.
    pub fn accept_remote(&self, sequence: SequenceNumber, payload: T) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.primed && !sequence_greater_than(sequence, slot.current.sequence) {
            return false;
        }
        let id = slot.current.id;
        slot.current = Arc::new(SyncValue::new(id, payload, sequence));
        slot.primed = true;
        self.changed.store(true, Ordering::Release);
        true
    }

    /// Current sequence number, or `None` if no value was stored yet
    pub fn sequence(&self) -> Option<SequenceNumber> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.primed.then_some(slot.current.sequence)
    }

    /// Edge-triggered: true once per accepted inbound value
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }
}
