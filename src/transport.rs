//! HTTP transport for the two exchanges the service supports.
//!
//! The service has exactly two operations: fetching the create page (which
//! allocates a mailbox as a side effect) and fetching a mailbox's access URL
//! (which returns the raw message list). This module issues those requests
//! and maps transport-level failures onto the crate error taxonomy; it never
//! retries - retry policy belongs to the watch loop's cadence.

use crate::config::ServiceConfig;
use crate::credentials::MailboxIdentity;
use crate::error::{Error, Result};
use tracing::debug;

/// The two raw HTTP exchanges against a mailbox service.
///
/// Implemented by [`HttpTransport`] for the live service; tests substitute
/// scripted implementations to drive the client deterministically.
pub trait MailboxTransport {
    /// Requests the create page, allocating a new mailbox. Returns the raw
    /// response body.
    fn fetch_create_page(&self) -> impl std::future::Future<Output = Result<String>>;

    /// Requests the mailbox access page for an existing mailbox. Returns the
    /// raw response body.
    fn fetch_mailbox_page(
        &self,
        identity: &MailboxIdentity,
    ) -> impl std::future::Future<Output = Result<String>>;
}

/// [`MailboxTransport`] backed by reqwest against a live service instance.
#[derive(Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl HttpTransport {
    /// Creates a transport for the given service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the underlying HTTP client cannot
    /// be constructed (for example if the TLS backend fails to initialise).
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeouts.connect)
            .timeout(config.timeouts.request)
            .build()
            .map_err(|e| Error::InvalidConfig {
                message: format!("could not build HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    /// Returns the service configuration this transport talks to.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn fetch(&self, url: String) -> Result<(reqwest::StatusCode, String)> {
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| Error::Network {
                target: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| Error::Network {
            target: url,
            source,
        })?;

        Ok((status, body))
    }
}

impl MailboxTransport for HttpTransport {
    async fn fetch_create_page(&self) -> Result<String> {
        let url = create_url(&self.config);
        debug!(url = %url, "requesting new mailbox");

        let (status, body) = self.fetch(url.clone()).await?;
        if !status.is_success() {
            return Err(Error::ServiceStatus {
                target: url,
                status,
            });
        }

        Ok(body)
    }

    async fn fetch_mailbox_page(&self, identity: &MailboxIdentity) -> Result<String> {
        let url = mailbox_url(&self.config, identity);
        debug!(url = %url, "checking mailbox");

        let (status, body) = self.fetch(url.clone()).await?;
        // 404 means the mailbox has expired or never existed; it will not
        // come back, so this is an auth failure rather than a service error.
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::CredentialsRejected { target: url });
        }
        if !status.is_success() {
            return Err(Error::ServiceStatus {
                target: url,
                status,
            });
        }

        Ok(body)
    }
}

/// The create endpoint. Fetching the English landing page allocates a mailbox.
pub(crate) fn create_url(config: &ServiceConfig) -> String {
    format!("{}/en", config.base_url())
}

/// The check endpoint: the mailbox's authenticated access URL.
pub(crate) fn mailbox_url(config: &ServiceConfig, identity: &MailboxIdentity) -> String {
    identity.access_url(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> MailboxIdentity {
        MailboxIdentity::new("abcde", "0123456789", "9876543210").unwrap()
    }

    #[test]
    fn test_create_url() {
        let config = ServiceConfig::default();
        assert_eq!(create_url(&config), "https://anonbox.net/en");
    }

    #[test]
    fn test_mailbox_url_uses_private_key() {
        let config = ServiceConfig::default();
        assert_eq!(
            mailbox_url(&config, &identity()),
            "https://anonbox.net/abcde/0123456789"
        );
    }

    #[test]
    fn test_urls_respect_tls_toggle() {
        let config = ServiceConfig::builder()
            .host("box.example.org")
            .use_tls(false)
            .build()
            .unwrap();
        assert_eq!(create_url(&config), "http://box.example.org/en");
        assert_eq!(
            mailbox_url(&config, &identity()),
            "http://box.example.org/abcde/0123456789"
        );
    }
}
