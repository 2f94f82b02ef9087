//! Sort -> segment -> merge, as one call per message log.

use serde::Serialize;
use tracing::debug;

use crate::config::SegmenterConfig;
use crate::merge::merge_group;
use crate::model::message::Message;
use crate::model::transcript::Transcript;
use crate::segment::segment_counted;

/// Summary of one processed log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentStats {
    pub messages_in: usize,
    pub messages_discarded: usize,
    pub unanswered_dropped: usize,
    pub transcripts: usize,
    pub turns: usize,
}

/// Turns one decoded message log into training transcripts.
///
/// Holds only configuration; every call works on its own local state, so a
/// single segmenter can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ConversationSegmenter {
    config: SegmenterConfig,
}

impl ConversationSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        ConversationSegmenter { config }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    pub fn process(&self, messages: Vec<Message>) -> Vec<Transcript> {
        self.process_with_stats(messages).0
    }

    pub fn process_with_stats(
        &self,
        mut messages: Vec<Message>,
    ) -> (Vec<Transcript>, SegmentStats) {
        let messages_in = messages.len();

        // Stable: equal timestamps keep their input order.
        messages.sort_by_key(|m| m.timestamp);

        let (groups, counts) = segment_counted(messages, self.config.threshold());
        let transcripts: Vec<Transcript> = groups
            .iter()
            .map(|g| merge_group(g, &self.config.separator))
            .collect();

        let stats = SegmentStats {
            messages_in,
            messages_discarded: counts.discarded,
            unanswered_dropped: counts.unanswered_dropped,
            transcripts: transcripts.len(),
            turns: transcripts.iter().map(Transcript::len).sum(),
        };
        debug!(
            messages = stats.messages_in,
            discarded = stats.messages_discarded,
            transcripts = stats.transcripts,
            turns = stats.turns,
            "segmented message log"
        );
        (transcripts, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::message::Role;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn sorts_before_segmenting() {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        // Reply listed before the question it answers.
        let msgs = vec![
            Message::new(Role::Assistant, "answer", base + Duration::minutes(1)),
            Message::new(Role::User, "question", base),
        ];
        let out = ConversationSegmenter::default().process(msgs);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].messages[0].content, "question");
        assert_eq!(out[0].messages[1].content, "answer");
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let msgs = vec![
            Message::new(Role::User, "first", base),
            Message::new(Role::User, "second", base),
            Message::new(Role::Assistant, "reply", base),
        ];
        let out = ConversationSegmenter::default().process(msgs);
        assert_eq!(out[0].messages[0].content, "first. second");
    }

    #[test]
    fn stats_account_for_every_message() {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let msgs = vec![
            Message::new(Role::Assistant, "orphan", base),
            Message::new(Role::User, "q", base + Duration::minutes(1)),
            Message::new(Role::User, "q2", base + Duration::minutes(2)),
            Message::new(Role::Assistant, "a", base + Duration::minutes(3)),
        ];
        let (out, stats) = ConversationSegmenter::default().process_with_stats(msgs);
        assert_eq!(out.len(), 1);
        assert_eq!(stats.messages_in, 4);
        assert_eq!(stats.messages_discarded, 1);
        assert_eq!(stats.transcripts, 1);
        assert_eq!(stats.turns, 2);
    }

    #[test]
    fn threshold_comes_from_config() {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let msgs = vec![
            Message::new(Role::User, "q", base),
            Message::new(Role::Assistant, "a", base + Duration::minutes(30)),
        ];
        let tight = ConversationSegmenter::new(SegmenterConfig {
            threshold_seconds: 600,
            ..SegmenterConfig::default()
        });
        assert!(tight.process(msgs.clone()).is_empty());
        assert_eq!(ConversationSegmenter::default().process(msgs).len(), 1);
    }
}
