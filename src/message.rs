//! Message records returned by a mailbox check.

use chrono::{DateTime, Utc};

/// One delivered email, as parsed from the service's check response.
///
/// Read-only after parsing; the watch loop never modifies delivered messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Value of the `From` header.
    pub sender: String,
    /// Value of the `Subject` header; empty if absent.
    pub subject: String,
    /// Value of the `Date` header; the Unix epoch if absent or unparseable.
    pub received_at: DateTime<Utc>,
    /// Whether `body` is the HTML part of the message.
    pub body_is_html: bool,
    /// The message body, passed through as delivered.
    pub body: String,
}

impl Message {
    /// Returns the natural key used for deduplication across polls.
    ///
    /// The service issues no message IDs, so identity is inferred from the
    /// stable header tuple (sender, subject, received-at). Two genuinely
    /// distinct messages carrying identical values for all three are
    /// indistinguishable and collapse into one; that is an accepted
    /// approximation, not something to compensate for.
    #[must_use]
    pub fn natural_key(&self) -> MessageKey {
        MessageKey {
            sender: self.sender.clone(),
            subject: self.subject.clone(),
            received_at: self.received_at.timestamp(),
        }
    }
}

/// Derived, non-authoritative identity of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    sender: String,
    subject: String,
    received_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(subject: &str) -> Message {
        Message {
            sender: "alice@example.com".into(),
            subject: subject.into(),
            received_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            body_is_html: false,
            body: "hello".into(),
        }
    }

    #[test]
    fn test_natural_key_stable() {
        assert_eq!(message("hi").natural_key(), message("hi").natural_key());
    }

    #[test]
    fn test_natural_key_ignores_body() {
        let mut other = message("hi");
        other.body = "different body".into();
        assert_eq!(message("hi").natural_key(), other.natural_key());
    }

    #[test]
    fn test_natural_key_differs_by_headers() {
        assert_ne!(message("hi").natural_key(), message("bye").natural_key());
    }
}
