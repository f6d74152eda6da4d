use crate::agent::{AgentResult, MailAgent};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static MESSAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9]{6}-[A-Za-z0-9]{6}-[A-Za-z0-9]{2})")
        .expect("message id pattern compiles")
});

/// A queued message identifier, kept as an opaque token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token follows exim's `xxxxxx-xxxxxx-xx` shape.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        MESSAGE_ID
            .find(&self.0)
            .is_some_and(|m| m.start() == 0 && m.end() == self.0.len())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Pulls the first message id out of every line that has one.
#[must_use]
pub fn extract_ids(listing: &str) -> Vec<MessageId> {
    listing
        .lines()
        .filter_map(|line| MESSAGE_ID.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| MessageId::new(m.as_str()))
        .collect()
}

/// Splits operator input on whitespace, taking every token verbatim.
#[must_use]
pub fn parse_entered_ids(input: &str) -> Vec<MessageId> {
    input.split_whitespace().map(MessageId::from).collect()
}

/// Asks the agent for its queue and returns the ids in listing order.
pub fn list_pending_ids(agent: &impl MailAgent) -> AgentResult<Vec<MessageId>> {
    let listing = agent.queue_listing()?;
    let ids = extract_ids(&listing);
    tracing::info!("queue listing yielded {} message ids", ids.len());
    Ok(ids)
}
