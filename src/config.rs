//! Configuration for the anonbox service client.
//!
//! Use [`ServiceConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use anonbox::ServiceConfig;
//!
//! let config = ServiceConfig::builder()
//!     .host("anonbox.example.org")
//!     .use_tls(false)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.base_url(), "http://anonbox.example.org");
//! ```

use crate::error::{Error, Result};
use std::time::Duration;

/// Host name of the public anonbox instance.
pub const DEFAULT_HOST: &str = "anonbox.net";

/// Configuration for reaching an anonbox service instance.
///
/// Create using [`ServiceConfig::builder()`], or take the defaults with
/// [`ServiceConfig::default()`]. There is deliberately no ambient global
/// configuration; this struct is passed into transport construction.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Host name of the service (validated non-empty).
    host: String,
    /// Use HTTPS to reach the service. Only switch this off for instances
    /// that do not support TLS.
    pub use_tls: bool,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            use_tls: true,
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Returns the host name of the service.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the base URL of the service, `scheme://host` without a
    /// trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{scheme}://{}", self.host)
    }
}

/// Timeout configuration for HTTP exchanges.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for establishing the TCP/TLS connection.
    pub connect: Duration,
    /// Overall timeout for one request, response body included.
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    host: Option<String>,
    use_tls: Option<bool>,
    timeouts: Option<TimeoutConfig>,
}

impl ServiceConfigBuilder {
    /// Sets the service host name.
    ///
    /// Defaults to [`DEFAULT_HOST`].
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Switches HTTPS on or off. Default is on.
    #[must_use]
    pub fn use_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = Some(use_tls);
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .connect = timeout;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .request = timeout;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the host is empty or contains a
    /// path separator.
    pub fn build(self) -> Result<ServiceConfig> {
        let host = self.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

        if host.is_empty() {
            return Err(Error::InvalidConfig {
                message: "host must not be empty".into(),
            });
        }
        if host.contains('/') {
            return Err(Error::InvalidConfig {
                message: format!("host '{host}' must be a bare host name, not a URL"),
            });
        }

        Ok(ServiceConfig {
            host,
            use_tls: self.use_tls.unwrap_or(true),
            timeouts: self.timeouts.unwrap_or_default(),
        })
    }
}
