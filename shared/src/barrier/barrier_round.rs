use std::collections::{BTreeSet, HashSet};

use crate::{sequence_less_than, FrameIndex, NodeId};

/// What the aggregator has to do after a readiness report
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// Every participant is ready; release `frame` to all of them
    Released { frame: FrameIndex },
    /// Still waiting on `missing` participants
    Pending { frame: FrameIndex, missing: usize },
    /// The node missed the release of the round just completed
    RepeatRelease { frame: FrameIndex },
    /// Readiness for the next round, kept until the current one completes
    Buffered { frame: FrameIndex },
    /// Readiness for a round that is already over
    Stale { frame: FrameIndex },
    /// More than one round ahead of the barrier
    TooFarAhead { frame: FrameIndex },
    /// The sender is not a configured participant
    UnknownNode { node_id: NodeId },
}

/// Readiness bookkeeping for the frame barrier: a fixed set of
/// participants, one round per frame index, one round of slack.
pub struct BarrierRound {
    participants: BTreeSet<NodeId>,
    current: FrameIndex,
    ready: HashSet<NodeId>,
    next_ready: HashSet<NodeId>,
    last_released: Option<FrameIndex>,
}

impl BarrierRound {
    pub fn new<I: IntoIterator<Item = NodeId>>(participants: I) -> Self {
        Self::starting_at(participants, 0)
    }

    pub fn starting_at<I: IntoIterator<Item = NodeId>>(
        participants: I,
        first_frame: FrameIndex,
    ) -> Self {
        Self {
            participants: participants.into_iter().collect(),
            current: first_frame,
            ready: HashSet::new(),
            next_ready: HashSet::new(),
            last_released: None,
        }
    }

    /// Frame index of the round being collected
    pub fn current_frame(&self) -> FrameIndex {
        self.current
    }

    pub fn last_released(&self) -> Option<FrameIndex> {
        self.last_released
    }

    pub fn participants(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.participants.iter().copied()
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    pub fn on_ready(&mut self, node_id: NodeId, frame: FrameIndex) -> ReadyOutcome {
        if !self.participants.contains(&node_id) {
            return ReadyOutcome::UnknownNode { node_id };
        }

        if frame == self.current {
            self.ready.insert(node_id);
            if self.ready.len() < self.participants.len() {
                return ReadyOutcome::Pending {
                    frame,
                    missing: self.participants.len() - self.ready.len(),
                };
            }
            self.last_released = Some(frame);
            self.current = frame.wrapping_add(1);
            self.ready = std::mem::take(&mut self.next_ready);
            return ReadyOutcome::Released { frame };
        }

        if frame == self.current.wrapping_add(1) {
            self.next_ready.insert(node_id);
            return ReadyOutcome::Buffered { frame };
        }

        if self.last_released == Some(frame) {
            return ReadyOutcome::RepeatRelease { frame };
        }

        if sequence_less_than(frame, self.current) {
            ReadyOutcome::Stale { frame }
        } else {
            ReadyOutcome::TooFarAhead { frame }
        }
    }
}
