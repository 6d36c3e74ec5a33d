//! Mailbox credential codec.
//!
//! A mailbox is addressed by three keys the service hands out on creation: a
//! date hash, a private key and a public key. For passing between invocations
//! they are encoded as a single comma-delimited token, `DATEHASH,PRIVATE,PUBLIC`,
//! which is what the CLI prints after `create` and accepts via `--mailbox`.
//!
//! ```
//! use anonbox::MailboxIdentity;
//!
//! let identity: MailboxIdentity = "abcde,0123456789,9876543210".parse().unwrap();
//! assert_eq!(identity.to_string(), "abcde,0123456789,9876543210");
//! ```

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Field delimiter of the encoded credential token.
const DELIMITER: char = ',';

/// Credentials of one mailbox on the anonbox service.
///
/// Immutable once constructed; produced by mailbox creation and required as
/// input for checking. All three fields are non-empty and free of the token
/// delimiter, enforced at every construction site so that the encoded form
/// always round-trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxIdentity {
    date_hash: String,
    private_key: String,
    public_key: String,
}

impl MailboxIdentity {
    /// Creates an identity from its three fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedCredentials`] if any field is empty or
    /// contains the token delimiter.
    pub fn new(
        date_hash: impl Into<String>,
        private_key: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<Self> {
        let identity = Self {
            date_hash: date_hash.into(),
            private_key: private_key.into(),
            public_key: public_key.into(),
        };

        for (name, value) in [
            ("date hash", &identity.date_hash),
            ("private key", &identity.private_key),
            ("public key", &identity.public_key),
        ] {
            if value.is_empty() {
                return Err(identity.malformed(format!("{name} is empty")));
            }
            if value.contains(DELIMITER) {
                return Err(identity.malformed(format!("{name} contains '{DELIMITER}'")));
            }
        }

        Ok(identity)
    }

    /// The date hash, the service's 5-character hash of the creation date.
    #[must_use]
    pub fn date_hash(&self) -> &str {
        &self.date_hash
    }

    /// The private key authorising access to received messages.
    #[must_use]
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// The public key, used as the local part of the mailbox address.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// The mailbox address, `publickey@datehash.host`.
    #[must_use]
    pub fn address(&self, host: &str) -> String {
        format!("{}@{}.{}", self.public_key, self.date_hash, host)
    }

    /// The access URL of the mailbox, `scheme://host/datehash/privatekey`.
    #[must_use]
    pub fn access_url(&self, config: &ServiceConfig) -> String {
        format!(
            "{}/{}/{}",
            config.base_url(),
            self.date_hash,
            self.private_key
        )
    }

    fn malformed(&self, reason: String) -> Error {
        Error::MalformedCredentials {
            token: self.to_string(),
            reason,
        }
    }
}

impl FromStr for MailboxIdentity {
    type Err = Error;

    /// Parses a `DATEHASH,PRIVATE,PUBLIC` token.
    ///
    /// Rejects tokens that do not split into exactly three non-empty fields;
    /// a partially populated identity is never produced.
    fn from_str(token: &str) -> Result<Self> {
        let mut fields = token.split(DELIMITER);

        let (Some(date_hash), Some(private_key), Some(public_key), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return Err(Error::MalformedCredentials {
                token: token.to_string(),
                reason: "expected exactly 3 comma-separated fields (DATEHASH,PRIVATE,PUBLIC)"
                    .to_string(),
            });
        };

        Self::new(date_hash, private_key, public_key)
    }
}

impl fmt::Display for MailboxIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.date_hash, self.private_key, self.public_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> MailboxIdentity {
        MailboxIdentity::new("abcde", "0123456789", "9876543210").unwrap()
    }

    #[test]
    fn test_round_trip() {
        let original = identity();
        let reparsed: MailboxIdentity = original.to_string().parse().unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_parse_valid_token() {
        let parsed: MailboxIdentity = "abcde,0123456789,9876543210".parse().unwrap();
        assert_eq!(parsed.date_hash(), "abcde");
        assert_eq!(parsed.private_key(), "0123456789");
        assert_eq!(parsed.public_key(), "9876543210");
    }

    #[test]
    fn test_parse_wrong_field_count() {
        for token in ["", "abcde", "abcde,0123456789", "a,b,c,d"] {
            let result = token.parse::<MailboxIdentity>();
            assert!(
                matches!(result, Err(Error::MalformedCredentials { .. })),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_empty_field() {
        for token in [",b,c", "a,,c", "a,b,"] {
            let result = token.parse::<MailboxIdentity>();
            assert!(
                matches!(result, Err(Error::MalformedCredentials { .. })),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_new_rejects_delimiter_in_field() {
        let result = MailboxIdentity::new("ab,cd", "0123456789", "9876543210");
        assert!(matches!(result, Err(Error::MalformedCredentials { .. })));
    }

    #[test]
    fn test_address() {
        assert_eq!(
            identity().address("anonbox.net"),
            "9876543210@abcde.anonbox.net"
        );
    }

    #[test]
    fn test_access_url() {
        let config = ServiceConfig::default();
        assert_eq!(
            identity().access_url(&config),
            "https://anonbox.net/abcde/0123456789"
        );
    }
}
