//! Conversion from Gmail wire types to provider-neutral domain types.

use super::api::{GmailBody, GmailHeader, GmailMessage, GmailPart, GmailThread};
use crate::domain::{Email, EmailId, EmailPart, EmailPayload, Header, PartBody, Thread, ThreadId};

/// Converts a full Gmail thread.
///
/// Thread snippets are only present on listings, so a fetched thread falls
/// back to the snippet of its newest message.
pub(crate) fn to_thread(thread: GmailThread) -> Thread {
    let messages: Vec<Email> = thread
        .messages
        .unwrap_or_default()
        .into_iter()
        .map(to_email)
        .collect();

    let snippet = thread
        .snippet
        .or_else(|| messages.last().map(|m| m.snippet.clone()))
        .unwrap_or_default();

    Thread {
        id: ThreadId::from(thread.id),
        history_id: thread.history_id.unwrap_or_default(),
        messages,
        snippet,
    }
}

/// Converts a full Gmail message.
pub(crate) fn to_email(message: GmailMessage) -> Email {
    let payload = message.payload.map(to_payload).unwrap_or_default();

    Email {
        id: EmailId::from(message.id),
        thread_id: ThreadId::from(message.thread_id),
        snippet: message.snippet.unwrap_or_default(),
        history_id: message.history_id.unwrap_or_default(),
        label_ids: message.label_ids.unwrap_or_default(),
        payload,
    }
}

fn to_payload(mut root: GmailPart) -> EmailPayload {
    let headers = to_headers(root.headers.as_deref());
    let mut parts = Vec::new();

    match root.parts.take() {
        Some(children) if !children.is_empty() => flatten_parts(children, &mut parts),
        // Single-part message: the body lives on the root.
        _ if root.body.as_ref().is_some_and(has_content) => {
            parts.push(to_part(root, headers.clone()));
        }
        _ => {}
    }

    EmailPayload { headers, parts }
}

fn has_content(body: &GmailBody) -> bool {
    body.data.is_some() || body.attachment_id.is_some()
}

fn flatten_parts(children: Vec<GmailPart>, out: &mut Vec<EmailPart>) {
    for mut child in children {
        let nested = child.parts.take();
        let headers = to_headers(child.headers.as_deref());
        out.push(to_part(child, headers));
        if let Some(nested) = nested {
            flatten_parts(nested, out);
        }
    }
}

fn to_part(part: GmailPart, headers: Vec<Header>) -> EmailPart {
    let body = part.body.map(|b| PartBody {
        size: b.size.unwrap_or(0),
        data: b.data,
        attachment_id: b.attachment_id,
    });

    EmailPart {
        part_id: part.part_id.unwrap_or_default(),
        mime_type: part.mime_type.unwrap_or_default(),
        filename: part.filename.unwrap_or_default(),
        headers,
        body: body.unwrap_or_default(),
    }
}

fn to_headers(headers: Option<&[GmailHeader]>) -> Vec<Header> {
    headers
        .unwrap_or_default()
        .iter()
        .map(|h| Header::new(h.name.clone(), h.value.clone()))
        .collect()
}
