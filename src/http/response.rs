use bytes::Bytes;

/// Represents a fully received HTTP response.
///
/// Headers are kept in the order they arrived, with key case and duplicates
/// preserved. Point lookups go through [`Response::header`], which is
/// case-insensitive and last-wins for duplicate keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    code: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    pub(crate) fn new(code: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// The numeric HTTP status code, e.g. 200.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// All response headers, in received order, duplicates included.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Retrieves a header value by name.
    ///
    /// The lookup is case-insensitive. When the same key appears more than
    /// once, the last occurrence wins.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpflight::http::response::Response;
    /// # use bytes::Bytes;
    /// # let response = Response::from_parts(
    /// #     200,
    /// #     vec![("Content-Type".to_string(), "text/plain".to_string())],
    /// #     Bytes::new(),
    /// # );
    /// assert_eq!(response.header("content-type"), Some("text/plain"));
    /// assert_eq!(response.header("X-Missing"), None);
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The response body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The response body as a cheaply cloneable buffer.
    pub fn body_bytes(&self) -> Bytes {
        self.body.clone()
    }

    /// Assembles a response from already-parsed parts. Intended for tests and
    /// for callers that cache responses.
    pub fn from_parts(code: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self::new(code, headers, body)
    }
}

/// Case-insensitive, last-wins lookup over an ordered header list.
///
/// Shared with the receive loop, which sniffs `Transfer-Encoding`,
/// `Content-Length`, and `Connection` before the `Response` exists.
pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_header_is_case_insensitive() {
        let headers = vec![("Content-Length".to_string(), "5".to_string())];
        assert_eq!(find_header(&headers, "content-length"), Some("5"));
        assert_eq!(find_header(&headers, "CONTENT-LENGTH"), Some("5"));
        assert_eq!(find_header(&headers, "Content-Type"), None);
    }

    #[test]
    fn find_header_last_wins_on_duplicates() {
        let headers = vec![
            ("X-Trace".to_string(), "first".to_string()),
            ("x-trace".to_string(), "second".to_string()),
        ];
        assert_eq!(find_header(&headers, "X-Trace"), Some("second"));
    }
}
