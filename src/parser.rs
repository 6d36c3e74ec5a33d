//! Parsing of the service's create and check responses.
//!
//! The create page advertises the new mailbox address and its access URL in
//! HTML; the check endpoint answers with an mbox-style concatenation of raw
//! RFC 2822 messages. Both formats are properties of the external service,
//! so everything that knows about their shape lives in this module.

use crate::credentials::MailboxIdentity;
use crate::error::{Error, Result};
use crate::message::Message;
use chrono::DateTime;
use mailparse::{parse_mail, MailHeaderMap, ParsedMail};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Matches the advertised mailbox address, `publickey@datehash.host`.
static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<dd><p>([0-9a-z]{10})@([0-9a-z]{5})\.").unwrap());

/// Matches the advertised access URL, `scheme://host/datehash/privatekey`.
static ACCESS_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<dd><p><a href="https?://[^"]*/([0-9a-z]{5})/([0-9a-z]{10})">"#).unwrap());

/// Extracts the credentials of a freshly created mailbox from the create page.
///
/// The page advertises the address (which carries the public key and date
/// hash) and the access URL (which carries the date hash again, plus the
/// private key). The two date hashes must agree.
///
/// # Errors
///
/// Returns [`Error::UnexpectedResponse`] if either fragment is missing or the
/// date hashes disagree.
pub fn parse_create_response(body: &str) -> Result<MailboxIdentity> {
    let address = ADDRESS_RE
        .captures(body)
        .ok_or_else(|| unexpected("mailbox address not found in create response"))?;
    let public_key = &address[1];
    let date_hash = &address[2];

    let access = ACCESS_URL_RE
        .captures(body)
        .ok_or_else(|| unexpected("access URL not found in create response"))?;
    let access_date_hash = &access[1];
    let private_key = &access[2];

    if access_date_hash != date_hash {
        return Err(unexpected(
            "date hash of the access URL does not match the mailbox address",
        ));
    }

    MailboxIdentity::new(date_hash, private_key, public_key)
}

/// Parses the message list out of a check response body.
///
/// The body is a sequence of raw messages, each introduced by an mbox `From `
/// envelope line. An empty or message-free body is a valid "no messages"
/// result. A fragment that cannot be parsed is skipped with a warning rather
/// than failing the poll; one bad record should not hide the rest. Order is
/// preserved as delivered by the service.
#[must_use]
pub fn parse_check_response(body: &str) -> Vec<Message> {
    if !body.contains("From ") {
        return Vec::new();
    }

    let mut messages = Vec::new();
    for (index, fragment) in body.split("\nFrom ").enumerate() {
        if index == 0 && !fragment.starts_with("From ") {
            debug!("skipping preamble before first message envelope");
            continue;
        }

        // Drop the envelope line; the rest is the raw RFC 2822 message.
        let Some((_envelope, raw)) = fragment.split_once('\n') else {
            debug!(index, "fragment has no content after envelope, skipping");
            continue;
        };

        match parse_message(raw) {
            Some(message) => messages.push(message),
            None => warn!(index, "could not parse message fragment, skipping"),
        }
    }

    messages
}

/// Parses one raw message. Returns `None` if the fragment is not usable.
fn parse_message(raw: &str) -> Option<Message> {
    let parsed = match parse_mail(raw.as_bytes()) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "mail parse failed");
            return None;
        }
    };

    let headers = parsed.get_headers();
    let sender = headers.get_first_value("From")?;
    let subject = headers.get_first_value("Subject").unwrap_or_default();

    // A missing or broken Date should not hide a delivered message; the
    // natural key stays stable because it is derived from the same content.
    let received_at = headers
        .get_first_value("Date")
        .and_then(|date| mailparse::dateparse(&date).ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::UNIX_EPOCH);

    let (body, body_is_html) = extract_body(&parsed)?;

    Some(Message {
        sender,
        subject,
        received_at,
        body_is_html,
        body,
    })
}

/// Extracts the message body, preferring `text/plain` over `text/html` in
/// multipart messages. Returns the body together with whether it is HTML.
fn extract_body(parsed: &ParsedMail<'_>) -> Option<(String, bool)> {
    if !parsed.subparts.is_empty() {
        for target in ["text/plain", "text/html"] {
            for part in &parsed.subparts {
                if part.ctype.mimetype.eq_ignore_ascii_case(target) {
                    if let Ok(body) = part.get_body() {
                        return Some((body, target == "text/html"));
                    }
                }
            }
        }

        // No text part found, descend into the first subpart.
        return extract_body(parsed.subparts.first()?);
    }

    let is_html = parsed.ctype.mimetype.eq_ignore_ascii_case("text/html");
    match parsed.get_body() {
        Ok(body) => Some((body, is_html)),
        Err(e) => {
            debug!(error = %e, "body extraction failed");
            None
        }
    }
}

fn unexpected(context: &str) -> Error {
    Error::UnexpectedResponse {
        context: context.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATE_PAGE: &str = concat!(
        "<dl>\n",
        "<dt>Your one-time address</dt>\n",
        "<dd><p>abcdefghij@kl012.anonbox.net</p></dd>\n",
        "<dt>Access URL</dt>\n",
        "<dd><p><a href=\"https://anonbox.net/kl012/zyxwvutsrq\">",
        "https://anonbox.net/kl012/zyxwvutsrq</a></p></dd>\n",
        "</dl>\n",
    );

    #[test]
    fn test_parse_create_response() {
        let identity = parse_create_response(CREATE_PAGE).unwrap();
        assert_eq!(identity.date_hash(), "kl012");
        assert_eq!(identity.private_key(), "zyxwvutsrq");
        assert_eq!(identity.public_key(), "abcdefghij");
    }

    #[test]
    fn test_parse_create_response_missing_address() {
        let body = "<html><body>maintenance</body></html>";
        let result = parse_create_response(body);
        assert!(matches!(result, Err(Error::UnexpectedResponse { .. })));
    }

    #[test]
    fn test_parse_create_response_missing_access_url() {
        let body = "<dd><p>abcdefghij@kl012.anonbox.net</p></dd>";
        let result = parse_create_response(body);
        assert!(matches!(result, Err(Error::UnexpectedResponse { .. })));
    }

    #[test]
    fn test_parse_create_response_date_hash_mismatch() {
        let body = concat!(
            "<dd><p>abcdefghij@kl012.anonbox.net</p></dd>\n",
            "<dd><p><a href=\"https://anonbox.net/zz999/zyxwvutsrq\">x</a></p></dd>\n",
        );
        let result = parse_create_response(body);
        assert!(matches!(result, Err(Error::UnexpectedResponse { .. })));
    }

    const CHECK_PAGE: &str = concat!(
        "From alice@example.com Wed May  1 12:00:00 2024\n",
        "From: alice@example.com\n",
        "Subject: First\n",
        "Date: Wed, 01 May 2024 12:00:00 +0000\n",
        "\n",
        "Hello one.\n",
        "\nFrom bob@example.com Wed May  1 12:05:00 2024\n",
        "From: bob@example.com\n",
        "Subject: Second\n",
        "Date: Wed, 01 May 2024 12:05:00 +0000\n",
        "Content-Type: text/html\n",
        "\n",
        "<p>Hello two.</p>\n",
    );

    #[test]
    fn test_parse_check_response() {
        let messages = parse_check_response(CHECK_PAGE);
        assert_eq!(messages.len(), 2);

        assert_eq!(messages[0].sender, "alice@example.com");
        assert_eq!(messages[0].subject, "First");
        assert!(!messages[0].body_is_html);
        assert!(messages[0].body.contains("Hello one."));

        assert_eq!(messages[1].sender, "bob@example.com");
        assert!(messages[1].body_is_html);
        assert!(messages[1].body.contains("<p>Hello two.</p>"));

        // Order as delivered, oldest first
        assert!(messages[0].received_at < messages[1].received_at);
    }

    #[test]
    fn test_parse_check_response_empty() {
        assert!(parse_check_response("").is_empty());
        assert!(parse_check_response("<html>no messages yet</html>").is_empty());
    }

    #[test]
    fn test_parse_check_response_skips_malformed_fragment() {
        let body = concat!(
            "From alice@example.com Wed May  1 12:00:00 2024\n",
            "From: alice@example.com\n",
            "Subject: Good\n",
            "\n",
            "body\n",
            "\nFrom \n",
            "no headers here at all",
        );
        let messages = parse_check_response(body);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject, "Good");
    }

    #[test]
    fn test_parse_check_response_missing_date_keeps_message() {
        let body = concat!(
            "From alice@example.com Wed May  1 12:00:00 2024\n",
            "From: alice@example.com\n",
            "Subject: No date\n",
            "\n",
            "body\n",
        );
        let messages = parse_check_response(body);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].received_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_multipart_prefers_plain_text() {
        let body = concat!(
            "From carol@example.com Wed May  1 12:00:00 2024\n",
            "From: carol@example.com\n",
            "Subject: Multi\n",
            "MIME-Version: 1.0\n",
            "Content-Type: multipart/alternative; boundary=\"XYZ\"\n",
            "\n",
            "--XYZ\n",
            "Content-Type: text/plain\n",
            "\n",
            "plain body\n",
            "--XYZ\n",
            "Content-Type: text/html\n",
            "\n",
            "<b>html body</b>\n",
            "--XYZ--\n",
        );
        let messages = parse_check_response(body);
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].body_is_html);
        assert!(messages[0].body.contains("plain body"));
    }
}
