//! High-level client for the anonbox service.
//!
//! [`AnonboxClient`] ties the transport, the response parser and the
//! deduplicator together. It supports three operations:
//!
//! - [`create_mailbox`](AnonboxClient::create_mailbox) - allocate a mailbox
//!   and return its credentials
//! - [`check_mailbox`](AnonboxClient::check_mailbox) - one-shot poll of an
//!   existing mailbox
//! - [`watch`](AnonboxClient::watch) - poll repeatedly at a fixed delay,
//!   forwarding new messages to a sink, until cancelled
//!
//! # Example
//!
//! ```no_run
//! use anonbox::{AnonboxClient, ServiceConfig};
//!
//! # async fn example() -> anonbox::Result<()> {
//! let client = AnonboxClient::new(ServiceConfig::default())?;
//! let identity = client.create_mailbox().await?;
//! println!("write to {}", identity.address("anonbox.net"));
//!
//! let messages = client.check_mailbox(&identity).await?;
//! println!("{} messages", messages.len());
//! # Ok(())
//! # }
//! ```

use crate::config::ServiceConfig;
use crate::credentials::MailboxIdentity;
use crate::dedup::SessionState;
use crate::error::Result;
use crate::message::Message;
use crate::parser;
use crate::transport::{HttpTransport, MailboxTransport};
use crate::watch::{MessageSink, WatchOptions};
use std::future::Future;
use tracing::{debug, error, info, instrument, warn};

/// Client for one anonbox service instance.
///
/// Generic over the transport so tests can substitute a scripted one; regular
/// callers construct it with [`AnonboxClient::new`] and never see the
/// parameter.
#[derive(Debug)]
pub struct AnonboxClient<T = HttpTransport> {
    transport: T,
}

impl AnonboxClient<HttpTransport> {
    /// Creates a client for the given service configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be constructed.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }
}

impl<T: MailboxTransport> AnonboxClient<T> {
    /// Creates a client over a caller-supplied transport.
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Allocates a new mailbox and returns its credentials.
    ///
    /// # Errors
    ///
    /// Fails with a transport error if the service cannot be reached or
    /// answers a non-success status, and with
    /// [`Error::UnexpectedResponse`](crate::Error::UnexpectedResponse) if the
    /// create page does not carry the expected credential markup.
    #[instrument(name = "AnonboxClient::create_mailbox", skip_all)]
    pub async fn create_mailbox(&self) -> Result<MailboxIdentity> {
        let body = self.transport.fetch_create_page().await?;
        let identity = parser::parse_create_response(&body)?;

        debug!(date_hash = identity.date_hash(), "mailbox created");
        Ok(identity)
    }

    /// Polls an existing mailbox once and returns every message it currently
    /// holds, oldest first.
    ///
    /// This is the one-shot form of a watch poll: no delay, no deduplication.
    ///
    /// # Errors
    ///
    /// Fails with a transport error on connection or HTTP-level problems, and
    /// with [`Error::CredentialsRejected`](crate::Error::CredentialsRejected)
    /// if the service no longer recognises the mailbox.
    #[instrument(
        name = "AnonboxClient::check_mailbox",
        skip_all,
        fields(date_hash = %identity.date_hash())
    )]
    pub async fn check_mailbox(&self, identity: &MailboxIdentity) -> Result<Vec<Message>> {
        let body = self.transport.fetch_mailbox_page(identity).await?;
        let messages = parser::parse_check_response(&body);

        debug!(count = messages.len(), "poll complete");
        Ok(messages)
    }

    /// Watches a mailbox, delivering newly observed messages to `sink` until
    /// cancelled or a fatal error occurs.
    ///
    /// The first poll happens immediately; afterwards the session sleeps for
    /// the configured delay between polls. Transient failures (network,
    /// HTTP-level, unexpected response shape) are reported via
    /// [`MessageSink::poll_failed`] and the cadence continues - the polling
    /// interval itself is the retry mechanism. Fatal failures end the session
    /// with an error.
    ///
    /// `shutdown` is the cancellation signal: when it completes, the session
    /// stops promptly from whichever suspension point it is in (the HTTP
    /// exchange or the delay) and returns `Ok(())`. Pass
    /// `tokio::signal::ctrl_c()` or similar; pass `std::future::pending()` to
    /// watch until a fatal error.
    ///
    /// Session state is created fresh per invocation and dropped on return;
    /// watching again starts a new session that re-delivers everything.
    ///
    /// # Errors
    ///
    /// Returns the fatal error that ended the session
    /// ([`Error::CredentialsRejected`](crate::Error::CredentialsRejected) or
    /// [`Error::MalformedCredentials`](crate::Error::MalformedCredentials)).
    /// Cancellation is a normal termination, not an error.
    #[instrument(
        name = "AnonboxClient::watch",
        skip_all,
        fields(date_hash = %identity.date_hash(), delay_secs = options.delay().as_secs())
    )]
    pub async fn watch<S, F>(
        &self,
        identity: MailboxIdentity,
        options: WatchOptions,
        sink: &mut S,
        shutdown: F,
    ) -> Result<()>
    where
        S: MessageSink,
        F: Future<Output = ()>,
    {
        let mut state = SessionState::new(identity);
        tokio::pin!(shutdown);

        info!("watch session started");

        loop {
            // Polling: the HTTP exchange is a cancellation point.
            let poll = tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!("watch session cancelled during poll");
                    return Ok(());
                }
                result = self.check_mailbox(state.identity()) => result,
            };

            match poll {
                Ok(messages) => {
                    let new_messages = state.filter_new(messages);
                    if !new_messages.is_empty() {
                        info!(count = new_messages.len(), "new messages");
                    }
                    for message in &new_messages {
                        sink.deliver(message);
                    }
                }
                Err(e) if e.is_fatal() => {
                    error!(category = %e.category(), error = %e, "fatal error, watch session ends");
                    return Err(e);
                }
                Err(e) => {
                    warn!(category = %e.category(), error = %e, "transient poll failure, keeping cadence");
                    sink.poll_failed(&e);
                }
            }

            // Sleeping: the delay is the other cancellation point.
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!("watch session cancelled during delay");
                    return Ok(());
                }
                () = tokio::time::sleep(options.delay()) => {}
            }
        }
    }
}
