//! Cross-poll message deduplication.
//!
//! Each check returns the full message list of the mailbox, so repeated polls
//! keep seeing messages that were already delivered. [`SessionState`] tracks
//! the natural keys observed during one watch session and filters each poll
//! down to the genuinely new messages.

use crate::credentials::MailboxIdentity;
use crate::message::{Message, MessageKey};
use std::collections::HashSet;

/// State of one watch session: the mailbox identity plus every message key
/// seen so far.
///
/// Owned exclusively by the session that created it; the key set grows
/// monotonically and is discarded with the session. Never persisted.
#[derive(Debug)]
pub struct SessionState {
    identity: MailboxIdentity,
    seen: HashSet<MessageKey>,
}

impl SessionState {
    /// Creates a fresh session for the given mailbox, with no messages seen.
    #[must_use]
    pub fn new(identity: MailboxIdentity) -> Self {
        Self {
            identity,
            seen: HashSet::new(),
        }
    }

    /// Returns the identity of the mailbox this session polls.
    #[must_use]
    pub fn identity(&self) -> &MailboxIdentity {
        &self.identity
    }

    /// Filters a poll result down to the messages not seen before, marking
    /// them as seen. Input order is preserved in the returned sequence.
    ///
    /// This is the one place in the crate that mutates session state. Calling
    /// it twice with the same poll yields the full set the first time and
    /// nothing the second time.
    pub fn filter_new(&mut self, poll: Vec<Message>) -> Vec<Message> {
        let mut new_messages = poll;
        new_messages.retain(|message| self.seen.insert(message.natural_key()));
        new_messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn state() -> SessionState {
        let identity = MailboxIdentity::new("abcde", "0123456789", "9876543210").unwrap();
        SessionState::new(identity)
    }

    fn message(subject: &str) -> Message {
        Message {
            sender: "alice@example.com".into(),
            subject: subject.into(),
            received_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            body_is_html: false,
            body: subject.into(),
        }
    }

    #[test]
    fn test_idempotence() {
        let mut state = state();
        let poll = vec![message("a"), message("b")];

        let first = state.filter_new(poll.clone());
        assert_eq!(first, poll);

        let second = state.filter_new(poll);
        assert!(second.is_empty());
    }

    #[test]
    fn test_preserves_input_order() {
        let mut state = state();
        let poll = vec![message("c"), message("a"), message("b")];

        let new = state.filter_new(poll);
        let subjects: Vec<_> = new.iter().map(|m| m.subject.as_str()).collect();
        assert_eq!(subjects, ["c", "a", "b"]);
    }

    #[test]
    fn test_cumulative_across_polls() {
        let mut state = state();

        let first = state.filter_new(vec![message("a")]);
        assert_eq!(first.len(), 1);

        // Later poll returns the full list again plus one new message
        let second = state.filter_new(vec![message("a"), message("b")]);
        let subjects: Vec<_> = second.iter().map(|m| m.subject.as_str()).collect();
        assert_eq!(subjects, ["b"]);
    }

    #[test]
    fn test_duplicate_within_one_poll() {
        let mut state = state();
        let new = state.filter_new(vec![message("a"), message("a")]);
        assert_eq!(new.len(), 1);
    }
}
