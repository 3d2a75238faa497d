use thiserror::Error;

/// Failures while parsing pieces of an HTTP/1.x response.
///
/// The receive loop maps every variant to a `MalformedResponse` outcome; the
/// offending line is kept in the payload for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid status line: {0:?}")]
    InvalidStatusLine(String),
    #[error("invalid header line: {0:?}")]
    InvalidHeader(String),
    #[error("invalid chunk size line: {0:?}")]
    InvalidChunkSize(String),
    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),
}

/// Parses a status line such as `HTTP/1.1 200 OK` into the status code.
///
/// Accepts `HTTP/1.0` and `HTTP/1.1`; the reason phrase is optional and
/// ignored. The code must be exactly three ASCII digits.
pub fn parse_status_line(line: &str) -> Result<u16, ParseError> {
    let mut parts = line.splitn(3, ' ');

    let version = parts.next().unwrap_or("");
    if version != "HTTP/1.1" && version != "HTTP/1.0" {
        return Err(ParseError::InvalidStatusLine(line.to_string()));
    }

    let code = parts.next().unwrap_or("");
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidStatusLine(line.to_string()));
    }

    code.parse::<u16>()
        .map_err(|_| ParseError::InvalidStatusLine(line.to_string()))
}

/// Splits a header line at the first `:`.
///
/// The key is kept exactly as received; the value is trimmed of surrounding
/// whitespace. A line without a `:` is malformed.
pub fn parse_header_line(line: &str) -> Result<(String, String), ParseError> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;

    Ok((key.to_string(), value.trim().to_string()))
}

/// Parses a chunk-size line of a chunked body.
///
/// The size is hexadecimal; anything after a `;` is a chunk extension and is
/// ignored. Zero marks the last chunk.
pub fn parse_chunk_size(line: &str) -> Result<usize, ParseError> {
    let digits = line.split(';').next().unwrap_or("").trim();

    usize::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidChunkSize(line.to_string()))
}

/// Parses a `Content-Length` header value.
pub fn parse_content_length(value: &str) -> Result<usize, ParseError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidContentLength(value.to_string()))
}
