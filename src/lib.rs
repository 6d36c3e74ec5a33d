//! # anonbox
//!
//! Async client for the [anonbox.net](https://anonbox.net) one-time,
//! anonymous email service.
//!
//! This crate provides a high-level, async API for:
//! - Creating a mailbox and retrieving its access credentials
//! - Checking a mailbox once for its current message list
//! - Watching a mailbox: repeated polls at a fixed delay, with new-message
//!   detection across polls, until cancelled
//!
//! ## Quick start
//!
//! ```no_run
//! use anonbox::{AnonboxClient, ServiceConfig};
//!
//! # async fn example() -> anonbox::Result<()> {
//! let config = ServiceConfig::default(); // https://anonbox.net
//! let client = AnonboxClient::new(config)?;
//!
//! // Allocate a mailbox; keep the token if you want to check it again later.
//! let identity = client.create_mailbox().await?;
//! println!("address: {}", identity.address("anonbox.net"));
//! println!("token:   {identity}");
//!
//! // One-shot check.
//! for message in client.check_mailbox(&identity).await? {
//!     println!("{}: {}", message.sender, message.subject);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Watching a mailbox
//!
//! ```no_run
//! use anonbox::{AnonboxClient, Message, MessageSink, ServiceConfig, WatchOptions};
//!
//! struct Printer;
//!
//! impl MessageSink for Printer {
//!     fn deliver(&mut self, message: &Message) {
//!         println!("{}: {}", message.sender, message.subject);
//!     }
//! }
//!
//! # async fn example() -> anonbox::Result<()> {
//! let client = AnonboxClient::new(ServiceConfig::default())?;
//! let identity = client.create_mailbox().await?;
//!
//! let mut sink = Printer;
//! client
//!     .watch(
//!         identity,
//!         WatchOptions::default(), // poll every 30 seconds
//!         &mut sink,
//!         async { tokio::signal::ctrl_c().await.ok(); },
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Reusing an existing mailbox
//!
//! Credentials round-trip through a printable `DATEHASH,PRIVATE,PUBLIC`
//! token; the crate itself never persists them.
//!
//! ```
//! use anonbox::MailboxIdentity;
//!
//! let identity: MailboxIdentity = "abcde,0123456789,9876543210".parse().unwrap();
//! assert_eq!(identity.to_string(), "abcde,0123456789,9876543210");
//! ```
//!
//! ## Error handling
//!
//! All errors implement `std::error::Error`. During a watch session,
//! [`Error::is_fatal`] separates the errors that end the session (rejected
//! credentials, malformed tokens) from transient ones (network, HTTP status,
//! unexpected response shape), which are reported to the sink while the
//! polling cadence continues.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod credentials;
pub mod dedup;
pub mod error;
pub mod message;
pub mod transport;
pub mod watch;

// Internal modules
mod client;
mod parser;

// Re-exports for ergonomic API
pub use client::AnonboxClient;
pub use config::{ServiceConfig, ServiceConfigBuilder, TimeoutConfig, DEFAULT_HOST};
pub use credentials::MailboxIdentity;
pub use dedup::SessionState;
pub use error::{Error, ErrorCategory, Result};
pub use message::{Message, MessageKey};
pub use parser::{parse_check_response, parse_create_response};
pub use transport::{HttpTransport, MailboxTransport};
pub use watch::{MessageSink, VecSink, WatchOptions, DEFAULT_DELAY};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // Ensure all public types are accessible
        let _ = ServiceConfig::builder();
        let _ = WatchOptions::default();
        let _ = "abcde,0123456789,9876543210".parse::<MailboxIdentity>();
    }
}
