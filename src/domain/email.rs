//! Email domain types.
//!
//! Provider-neutral view of a fetched message: identifiers, labels and the
//! MIME payload (headers plus a flat list of parts). These are read-only
//! projections; nothing here is mutated after a provider builds it.

use serde::{Deserialize, Serialize};

use super::{EmailId, ThreadId};

/// A single `name: value` header pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name exactly as the provider returned it.
    pub name: String,
    /// Raw header value.
    pub value: String,
}

impl Header {
    /// Creates a header pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An individual email message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    /// Provider message ID.
    pub id: EmailId,
    /// Thread (conversation) this message belongs to.
    pub thread_id: ThreadId,
    /// Short plain-text preview.
    pub snippet: String,
    /// Provider history marker at the time of fetch.
    pub history_id: String,
    /// Labels applied to this message.
    pub label_ids: Vec<String>,
    /// Headers and MIME parts.
    pub payload: EmailPayload,
}

impl Email {
    /// Returns the value of the first header whose name matches exactly.
    ///
    /// Matching is case-sensitive: `"Subject"` does not find `"subject"`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.header(name)
    }
}

/// Message payload: top-level headers and flattened MIME parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailPayload {
    /// Top-level message headers in provider order.
    pub headers: Vec<Header>,
    /// MIME parts, flattened depth-first.
    pub parts: Vec<EmailPart>,
}

impl EmailPayload {
    /// Exact, case-sensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }
}

/// A single MIME part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPart {
    /// Part identifier within the message (e.g. `"0"`, `"1.2"`).
    pub part_id: String,
    /// MIME content type.
    pub mime_type: String,
    /// Filename for attachments, empty otherwise.
    pub filename: String,
    /// Part-level headers.
    pub headers: Vec<Header>,
    /// Inline body data or an attachment reference.
    pub body: PartBody,
}

impl EmailPart {
    /// Returns true if the body lives behind an attachment reference.
    pub fn is_attachment(&self) -> bool {
        self.body.attachment_id.is_some()
    }
}

/// Body of a MIME part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    /// Size in bytes as reported by the provider.
    pub size: u64,
    /// Base64url-encoded inline data, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Attachment reference, if the data is stored separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_email(headers: Vec<Header>) -> Email {
        Email {
            id: EmailId::from("msg-1"),
            thread_id: ThreadId::from("thread-1"),
            snippet: "Hi there".to_string(),
            history_id: "100".to_string(),
            label_ids: vec!["INBOX".to_string()],
            payload: EmailPayload {
                headers,
                parts: vec![],
            },
        }
    }

    #[test]
    fn header_lookup_is_exact() {
        let email = make_email(vec![
            Header::new("Subject", "Quarterly report"),
            Header::new("From", "alice@example.com"),
        ]);

        assert_eq!(email.header("Subject"), Some("Quarterly report"));
        assert_eq!(email.header("From"), Some("alice@example.com"));
        assert_eq!(email.header("Date"), None);
    }

    #[test]
    fn header_lookup_is_case_sensitive() {
        let email = make_email(vec![Header::new("subject", "x")]);
        assert_eq!(email.header("Subject"), None);
        assert_eq!(email.header("subject"), Some("x"));
    }

    #[test]
    fn header_lookup_returns_first_match() {
        let email = make_email(vec![
            Header::new("Received", "first"),
            Header::new("Received", "second"),
        ]);
        assert_eq!(email.header("Received"), Some("first"));
    }

    #[test]
    fn email_serializes_camel_case() {
        let email = make_email(vec![]);
        let json = serde_json::to_value(&email).unwrap();

        assert_eq!(json["threadId"], "thread-1");
        assert_eq!(json["historyId"], "100");
        assert_eq!(json["labelIds"][0], "INBOX");
    }

    #[test]
    fn part_body_omits_missing_fields() {
        let part = EmailPart {
            part_id: "1".to_string(),
            mime_type: "text/plain".to_string(),
            filename: String::new(),
            headers: vec![],
            body: PartBody {
                size: 12,
                data: Some("aGVsbG8".to_string()),
                attachment_id: None,
            },
        };

        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["partId"], "1");
        assert_eq!(json["body"]["data"], "aGVsbG8");
        assert!(json["body"].get("attachmentId").is_none());
        assert!(!part.is_attachment());
    }
}
