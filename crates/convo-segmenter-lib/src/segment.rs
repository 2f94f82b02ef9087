//! Split a time-ordered message stream into user -> assistant exchanges.
//!
//! A group opens on a user message and grows until either a user message
//! follows an assistant reply (a new exchange begins) or the gap to the
//! previous message exceeds the threshold. Groups that reached an assistant
//! reply are kept when they close; a group that times out before any reply
//! is dropped. The group still open at the end of the stream is always
//! kept, reply or not.

use chrono::Duration;
use tracing::trace;

use crate::model::group::Group;
use crate::model::message::{Message, Role};

/// Counters describing one segmentation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SegmentCounts {
    /// Messages that ended up in no group.
    pub discarded: usize,
    /// Unanswered groups dropped on a time-gap break.
    pub unanswered_dropped: usize,
}

/// Partition `messages` (already sorted ascending by timestamp) into groups.
pub fn segment(messages: Vec<Message>, threshold: Duration) -> Vec<Group> {
    segment_counted(messages, threshold).0
}

/// Same as [`segment`] but also reports what was thrown away.
pub fn segment_counted(
    messages: Vec<Message>,
    threshold: Duration,
) -> (Vec<Group>, SegmentCounts) {
    let mut groups: Vec<Group> = Vec::new();
    let mut counts = SegmentCounts::default();
    let mut open: Option<Group> = None;

    for msg in messages {
        let Some(current) = open.as_mut() else {
            if msg.role == Role::User {
                open = Some(Group::start(msg));
            } else {
                counts.discarded += 1;
            }
            continue;
        };

        let last = current.last();
        let role_reversal = msg.role == Role::User && last.role == Role::Assistant;
        let gap_exceeded = msg.timestamp - last.timestamp > threshold;

        if !(role_reversal || gap_exceeded) {
            current.push(msg);
            continue;
        }

        if let Some(closed) = open.take() {
            if closed.has_reply() {
                trace!(messages = closed.len(), "closing answered group");
                groups.push(closed);
            } else {
                trace!(messages = closed.len(), "dropping unanswered group after gap");
                counts.unanswered_dropped += 1;
                counts.discarded += closed.len();
            }
        }

        if msg.role == Role::User {
            open = Some(Group::start(msg));
        } else {
            counts.discarded += 1;
        }
    }

    if let Some(trailing) = open {
        groups.push(trailing);
    }

    (groups, counts)
}
