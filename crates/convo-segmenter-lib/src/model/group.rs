use super::message::{Message, Role};

/// Messages belonging to one user-initiated exchange, in timestamp order.
///
/// Groups are only built by the segmenter, which guarantees they are
/// non-empty and start with a user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    messages: Vec<Message>,
}

impl Group {
    /// Open a new group seeded with its first message.
    pub(crate) fn start(first: Message) -> Self {
        Group {
            messages: vec![first],
        }
    }

    pub(crate) fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    pub fn last(&self) -> &Message {
        // Non-empty by construction.
        &self.messages[self.messages.len() - 1]
    }

    pub fn last_role(&self) -> Role {
        self.last().role
    }

    /// True once the exchange has received at least one assistant reply.
    pub fn has_reply(&self) -> bool {
        self.last_role() == Role::Assistant
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }
}
