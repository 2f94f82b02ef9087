use crate::model::group::Group;
use crate::model::message::Message;
use crate::model::transcript::{Transcript, Turn};

/// Collapse runs of same-role messages into single turns.
///
/// Contents within a run are joined with `separator` in their original
/// order. The result alternates roles and is never empty for a non-empty
/// input.
pub fn merge_messages(messages: &[Message], separator: &str) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();
    let mut iter = messages.iter();
    let Some(first) = iter.next() else {
        return turns;
    };

    let mut acc = Turn {
        role: first.role,
        content: first.content.clone(),
    };
    for msg in iter {
        if msg.role == acc.role {
            acc.content.push_str(separator);
            acc.content.push_str(&msg.content);
        } else {
            let next = Turn {
                role: msg.role,
                content: msg.content.clone(),
            };
            turns.push(std::mem::replace(&mut acc, next));
        }
    }
    turns.push(acc);
    turns
}

/// Merge one group into the transcript emitted for it.
pub fn merge_group(group: &Group, separator: &str) -> Transcript {
    Transcript {
        messages: merge_messages(group.messages(), separator),
    }
}
