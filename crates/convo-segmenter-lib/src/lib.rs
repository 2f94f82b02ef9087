//! Library entry point for the conversation segmenter.
//!
//! Turns exported chat logs (role-tagged, timestamped messages) into
//! training transcripts: messages are sorted by time, split into
//! user -> assistant exchanges, and consecutive same-role messages inside an
//! exchange are merged into single turns.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use convo_segmenter::{ConversationSegmenter, Message, Role};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//! let log = vec![
//!     Message::new(Role::User, "hi", t0),
//!     Message::new(Role::User, "you there?", t0 + Duration::minutes(1)),
//!     Message::new(Role::Assistant, "yes", t0 + Duration::minutes(2)),
//! ];
//! let out = ConversationSegmenter::default().process(log);
//! assert_eq!(out.len(), 1);
//! assert_eq!(out[0].messages[0].content, "hi. you there?");
//! ```
//
// Public modules
pub mod batch;
pub mod codec;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod segment;
pub mod utils;

// Re-export primary types for ergonomic use.
pub use codec::{decode_messages, load_messages_json, write_transcripts_jsonl};
pub use config::{load_config, BatchConfig, SegmenterConfig};
pub use error::SegmentError;
pub use model::{
    group::Group,
    message::{Message, Role},
    transcript::{Transcript, Turn},
};
pub use pipeline::{ConversationSegmenter, SegmentStats};
