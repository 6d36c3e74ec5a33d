//! Watch session options and the message sink interface.

use crate::error::{Error, Result};
use crate::message::Message;
use std::time::Duration;

/// Default delay between polls.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(30);

/// Options for one watch session.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    delay: Duration,
}

impl WatchOptions {
    /// Creates options with the given inter-poll delay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the delay is zero; a watch session
    /// must sleep between polls.
    pub fn new(delay: Duration) -> Result<Self> {
        if delay.is_zero() {
            return Err(Error::InvalidConfig {
                message: "watch delay must be positive".into(),
            });
        }
        Ok(Self { delay })
    }

    /// Convenience constructor taking the delay in whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `secs` is zero.
    pub fn from_secs(secs: u64) -> Result<Self> {
        Self::new(Duration::from_secs(secs))
    }

    /// The delay between the end of one poll and the start of the next.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

/// Receives the output of a watch session.
///
/// New messages are delivered synchronously, in service order, before the
/// session proceeds to its next poll. Display, storage and browser hand-off
/// all live behind this seam; the library itself never renders anything.
pub trait MessageSink {
    /// Called once for each newly observed message.
    fn deliver(&mut self, message: &Message);

    /// Called when a poll attempt fails with a transient error. The session
    /// continues afterwards; fatal errors end the session instead of being
    /// reported here.
    fn poll_failed(&mut self, _error: &Error) {}
}

/// Sink that collects delivered messages into a vector.
///
/// Useful for one-shot checks and in tests.
#[derive(Debug, Default)]
pub struct VecSink {
    /// Messages delivered so far.
    pub messages: Vec<Message>,
}

impl MessageSink for VecSink {
    fn deliver(&mut self, message: &Message) {
        self.messages.push(message.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay() {
        assert_eq!(WatchOptions::default().delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_delay_rejected() {
        assert!(matches!(
            WatchOptions::new(Duration::ZERO),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(matches!(
            WatchOptions::from_secs(0),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_from_secs() {
        let options = WatchOptions::from_secs(5).unwrap();
        assert_eq!(options.delay(), Duration::from_secs(5));
    }
}
