//! Gmail multipart batch encoding.
//!
//! A batch request wraps up to [`MAX_BATCH_SIZE`] `GET` sub-requests in one
//! `multipart/mixed` body. The response mirrors it: one `application/http`
//! part per sub-request, each carrying a full HTTP response.

use super::super::traits::{ProviderError, Result};

/// Gmail rejects batches with more sub-requests than this.
pub(crate) const MAX_BATCH_SIZE: usize = 100;

/// One decoded sub-response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BatchItem {
    /// Position of the matching sub-request (0-based).
    pub index: usize,
    pub status: u16,
    pub body: String,
}

/// `Content-Type` header value for a batch request.
pub(crate) fn content_type(boundary: &str) -> String {
    format!("multipart/mixed; boundary={}", boundary)
}

/// Builds a batch body fetching `{path_prefix}/{resource}/{id}?format=full`
/// for each id.
pub(crate) fn build_request(
    path_prefix: &str,
    resource: &str,
    ids: &[String],
    boundary: &str,
) -> String {
    let mut body = String::new();

    for (i, id) in ids.iter().enumerate() {
        let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
        body.push_str(&format!("--{}\r\n", boundary));
        body.push_str("Content-Type: application/http\r\n");
        body.push_str(&format!("Content-ID: <item{}>\r\n\r\n", i));
        body.push_str(&format!(
            "GET {}/{}/{}?format=full\r\n\r\n",
            path_prefix, resource, id
        ));
    }

    body.push_str(&format!("--{}--\r\n", boundary));
    body
}

/// Extracts the boundary parameter from a `multipart/mixed` content type.
pub(crate) fn boundary_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|b| !b.is_empty())
    })
}

/// Splits a batch response body into its sub-responses, in sub-request
/// order.
pub(crate) fn parse_response(body: &str, boundary: &str) -> Result<Vec<BatchItem>> {
    let delimiter = format!("--{}", boundary);
    let mut items = Vec::new();

    // Anything before the first delimiter is preamble.
    for (position, segment) in body.split(delimiter.as_str()).skip(1).enumerate() {
        if segment.starts_with("--") {
            break;
        }
        let segment = segment.trim_start_matches(['\r', '\n']);
        if segment.trim().is_empty() {
            continue;
        }

        let (part_headers, http) =
            split_head(segment).ok_or_else(|| malformed("part headers"))?;
        let index = content_id_index(part_headers).unwrap_or(position);

        let (response_head, response_body) =
            split_head(http).ok_or_else(|| malformed("sub-response headers"))?;
        let status = parse_status_line(response_head)?;

        items.push(BatchItem {
            index,
            status,
            body: response_body.trim_end_matches(['\r', '\n']).to_string(),
        });
    }

    items.sort_by_key(|item| item.index);
    Ok(items)
}

/// Splits at the first blank line, accepting CRLF or bare LF.
fn split_head(s: &str) -> Option<(&str, &str)> {
    let crlf = s.find("\r\n\r\n").map(|i| (i, 4));
    let lf = s.find("\n\n").map(|i| (i, 2));
    let (at, len) = match (crlf, lf) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some((&s[..at], &s[at + len..]))
}

/// Reads N from `Content-ID: <response-itemN>`.
fn content_id_index(headers: &str) -> Option<usize> {
    headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("content-id") {
            return None;
        }
        let value = value.trim().trim_start_matches('<').trim_end_matches('>');
        let digits = value.trim_start_matches(|c: char| !c.is_ascii_digit());
        digits.parse().ok()
    })
}

fn parse_status_line(head: &str) -> Result<u16> {
    let line = head.lines().next().unwrap_or_default();
    line.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| malformed("status line"))
}

fn malformed(what: &str) -> ProviderError {
    ProviderError::Provider(format!("malformed batch response: missing {}", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_has_one_part_per_id() {
        let ids = vec!["t1".to_string(), "t2".to_string()];
        let body = build_request("/gmail/v1/users/me", "threads", &ids, "b0");

        assert_eq!(
            body,
            "--b0\r\n\
             Content-Type: application/http\r\n\
             Content-ID: <item0>\r\n\r\n\
             GET /gmail/v1/users/me/threads/t1?format=full\r\n\r\n\
             --b0\r\n\
             Content-Type: application/http\r\n\
             Content-ID: <item1>\r\n\r\n\
             GET /gmail/v1/users/me/threads/t2?format=full\r\n\r\n\
             --b0--\r\n"
        );
    }

    #[test]
    fn boundary_is_read_from_content_type() {
        assert_eq!(
            boundary_from_content_type("multipart/mixed; boundary=batch_abc"),
            Some("batch_abc".to_string())
        );
        assert_eq!(
            boundary_from_content_type("multipart/mixed; charset=utf-8; Boundary=\"q\""),
            Some("q".to_string())
        );
        assert_eq!(boundary_from_content_type("application/json"), None);
    }

    #[test]
    fn response_items_are_ordered_by_content_id() {
        let body = "--batch_x\r\n\
            Content-Type: application/http\r\n\
            Content-ID: <response-item1>\r\n\r\n\
            HTTP/1.1 404 Not Found\r\n\
            Content-Type: application/json\r\n\r\n\
            {\"error\":{\"code\":404}}\r\n\
            --batch_x\r\n\
            Content-Type: application/http\r\n\
            Content-ID: <response-item0>\r\n\r\n\
            HTTP/1.1 200 OK\r\n\
            Content-Type: application/json; charset=UTF-8\r\n\r\n\
            {\"id\":\"t1\"}\r\n\
            --batch_x--\r\n";

        let items = parse_response(body, "batch_x").unwrap();

        assert_eq!(
            items,
            vec![
                BatchItem {
                    index: 0,
                    status: 200,
                    body: "{\"id\":\"t1\"}".to_string(),
                },
                BatchItem {
                    index: 1,
                    status: 404,
                    body: "{\"error\":{\"code\":404}}".to_string(),
                },
            ]
        );
    }

    #[test]
    fn bare_newlines_and_missing_content_id_are_accepted() {
        let body = "preamble\n--b\nContent-Type: application/http\n\nHTTP/1.1 200 OK\n\n{\"id\":\"m1\"}\n--b--\n";

        let items = parse_response(body, "b").unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].index, 0);
        assert_eq!(items[0].body, "{\"id\":\"m1\"}");
    }

    #[test]
    fn garbage_part_is_an_error() {
        let body = "--b\r\nContent-Type: application/http\r\n\r\nnot http\r\n--b--";
        let err = parse_response(body, "b").unwrap_err();
        assert!(matches!(err, ProviderError::Provider(_)));
    }
}
