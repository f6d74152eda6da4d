use crate::queue::MessageId;
use std::collections::VecDeque;

/// Pending ids plus the one currently selected.
#[derive(Debug, Default)]
pub struct Session {
    pending: VecDeque<MessageId>,
    current: Option<MessageId>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces everything still pending. The current id is left alone.
    pub fn replace_pending(&mut self, ids: impl IntoIterator<Item = MessageId>) {
        self.pending = ids.into_iter().collect();
    }

    /// Moves the head of the queue into the current slot.
    pub fn advance(&mut self) -> Option<&MessageId> {
        let next = self.pending.pop_front()?;
        self.current = Some(next);
        self.current.as_ref()
    }

    #[must_use]
    pub fn current(&self) -> Option<&MessageId> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn pending(&self) -> impl ExactSizeIterator<Item = &MessageId> {
        self.pending.iter()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}
