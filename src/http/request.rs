use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Notify;

use crate::error::{ErrorKind, HttpError};
use crate::http::parser::{self, ParseError};
use crate::http::reader::{RecvBuffer, RecvError};
use crate::http::response::{Response, find_header};

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpflight::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    /// The method as it appears on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a request.
///
/// States only ever move forward along the ladder in the module
/// documentation; `Success`, `Error`, and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    /// Constructed; `run` has not been called.
    Init = 0,
    /// Establishing the TCP connection.
    Connecting = 1,
    /// Connected; writing the request.
    Connected = 2,
    /// Request flushed; reading the response.
    RequestSent = 3,
    /// The full response was parsed.
    Success = 4,
    /// A connect, write, read, or parse step failed.
    Error = 5,
    /// The caller aborted the request.
    Aborted = 6,
}

impl Status {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Success | Status::Error | Status::Aborted)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Status::Init,
            1 => Status::Connecting,
            2 => Status::Connected,
            3 => Status::RequestSent,
            4 => Status::Success,
            5 => Status::Error,
            _ => Status::Aborted,
        }
    }
}

/// Response progress and terminal outcome, observable while the exchange is
/// still in flight. `code` appears as soon as the status line parses,
/// `headers` once the header block completes, and `body` grows chunk by
/// chunk, so an abort or failure mid-stream leaves the partial data behind
/// for diagnostics.
#[derive(Debug, Default)]
struct Progress {
    code: Option<u16>,
    headers: Option<Vec<(String, String)>>,
    body: Vec<u8>,
    error: Option<HttpError>,
}

/// State shared between the exchange, `abort` callers, and the read-only
/// accessors.
struct Shared {
    status: AtomicU8,
    progress: Mutex<Progress>,
    abort_wakeup: Notify,
}

impl Shared {
    fn new() -> Self {
        Self {
            status: AtomicU8::new(Status::Init as u8),
            progress: Mutex::new(Progress::default()),
            abort_wakeup: Notify::new(),
        }
    }

    fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        // Poisoning only means some holder panicked; the fields themselves
        // stay consistent, so take the data either way.
        self.progress
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Non-terminal forward step. Fails when something else (an abort) got
    /// to the status word first.
    fn advance(&self, from: Status, to: Status) -> bool {
        self.status
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Claims the terminal state. Exactly one claim ever succeeds; the
    /// outcome fields are published under the lock before the status store,
    /// so a reader that sees a terminal status sees the whole outcome.
    fn claim_terminal(&self, to: Status, error: Option<HttpError>) -> bool {
        let mut progress = self.lock();
        if self.status().is_terminal() {
            return false;
        }

        progress.error = error;
        self.status.store(to as u8, Ordering::Release);
        true
    }

    fn abort(&self, error: HttpError) {
        if self.claim_terminal(Status::Aborted, Some(error)) {
            tracing::debug!("Request aborted");
            // Stored as a permit if the exchange is between awaits, so the
            // wakeup is not lost.
            self.abort_wakeup.notify_one();
        } else {
            tracing::trace!("Abort after terminal state ignored");
        }
    }
}

/// Why the connect/send/receive sequence stopped early.
enum Interrupt {
    /// A step failed; the error has not been recorded yet.
    Failed(HttpError),
    /// An abort claimed the terminal state; its error is already recorded.
    Aborted,
}

impl From<RecvError> for Interrupt {
    fn from(err: RecvError) -> Self {
        match err {
            RecvError::Io(e) => Interrupt::Failed(HttpError::read(&e)),
            RecvError::ClosedEarly(what) => Interrupt::Failed(HttpError::read_interrupted(what)),
            RecvError::NotUtf8 => {
                Interrupt::Failed(HttpError::malformed("response line is not valid UTF-8"))
            }
            RecvError::LineTooLong => {
                Interrupt::Failed(HttpError::malformed("response line exceeds the size limit"))
            }
            RecvError::Aborted => Interrupt::Aborted,
        }
    }
}

impl From<ParseError> for Interrupt {
    fn from(err: ParseError) -> Self {
        Interrupt::Failed(HttpError::malformed(err.to_string()))
    }
}

/// One in-flight HTTP request over one connection.
///
/// Construction captures the immutable identity (target address, path,
/// method, body, headers) and performs no I/O. [`HttpRequest::run`] drives
/// the whole exchange and resolves exactly once to the terminal outcome;
/// [`HttpRequest::abort`] (or an [`AbortHandle`]) cancels it from any task
/// at any time. The read-only accessors expose the state and whatever
/// response data has arrived so far.
pub struct HttpRequest {
    address: SocketAddr,
    path: String,
    method: Method,
    body: Bytes,
    headers: HashMap<String, String>,
    shared: Arc<Shared>,
}

/// Cancels the request it was taken from, without borrowing it.
///
/// Clone it freely; aborting an already-terminal request is a no-op.
#[derive(Clone)]
pub struct AbortHandle {
    shared: Arc<Shared>,
}

impl AbortHandle {
    /// Same contract as [`HttpRequest::abort`].
    pub fn abort(&self, error: HttpError) {
        self.shared.abort(error);
    }
}

impl HttpRequest {
    /// Captures the request identity. No I/O happens until [`run`].
    ///
    /// Headers are sent exactly as supplied — Host, Content-Length, and
    /// Connection are the caller's responsibility.
    ///
    /// [`run`]: HttpRequest::run
    pub fn new(
        address: SocketAddr,
        path: impl Into<String>,
        method: Method,
        body: impl Into<Bytes>,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            address,
            path: path.into(),
            method,
            body: body.into(),
            headers,
            shared: Arc::new(Shared::new()),
        }
    }

    /// Runs the exchange to its terminal state and returns the outcome.
    ///
    /// Only the first call proceeds; any later call is rejected with an
    /// `AlreadyStarted` error and never opens a second connection. If the
    /// request was aborted before it started, the recorded abort error is
    /// returned instead.
    ///
    /// The exchange executes on the awaiting task; callers that want it in
    /// the background spawn it. Every suspension point is raced against the
    /// abort notification, and whichever side claims the terminal state
    /// first wins.
    pub async fn run(&self) -> Result<Response, HttpError> {
        if !self.shared.advance(Status::Init, Status::Connecting) {
            if self.status() == Status::Aborted {
                if let Some(err) = self.shared.lock().error.clone() {
                    return Err(err);
                }
            }
            return Err(HttpError::new(
                ErrorKind::AlreadyStarted,
                "run may only be called once",
            ));
        }

        tracing::debug!(
            address = %self.address,
            method = %self.method,
            path = %self.path,
            "Starting request"
        );

        match self.exchange().await {
            Ok(response) => {
                if self.shared.claim_terminal(Status::Success, None) {
                    tracing::debug!(code = response.code(), "Request completed");
                    Ok(response)
                } else {
                    Err(self.recorded_error())
                }
            }
            Err(Interrupt::Failed(err)) => {
                if self.shared.claim_terminal(Status::Error, Some(err.clone())) {
                    tracing::warn!(error = %err, address = %self.address, "Request failed");
                    Err(err)
                } else {
                    Err(self.recorded_error())
                }
            }
            Err(Interrupt::Aborted) => Err(self.recorded_error()),
        }
    }

    /// Aborts the request, recording `error` as its outcome.
    ///
    /// Safe from any task at any time. If a terminal state was already
    /// reached this does nothing — a prior outcome is never overwritten.
    pub fn abort(&self, error: HttpError) {
        self.shared.abort(error);
    }

    /// A handle that can abort this request without borrowing it.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    // Identity accessors.

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Current lifecycle state. Lock-free; safe to poll from any task.
    pub fn status(&self) -> Status {
        self.shared.status()
    }

    /// The response status code, present as soon as the status line parses.
    pub fn response_code(&self) -> Option<u16> {
        self.shared.lock().code
    }

    /// The response headers, present once the header block fully parses.
    /// Received order, key case, and duplicates are preserved.
    pub fn response_headers(&self) -> Option<Vec<(String, String)>> {
        self.shared.lock().headers.clone()
    }

    /// Snapshot of the response body bytes read so far. After an abort or a
    /// mid-stream failure this is the partial body.
    pub fn response_body(&self) -> Bytes {
        Bytes::copy_from_slice(&self.shared.lock().body)
    }

    /// The recorded failure; present iff the status is `Error` or `Aborted`.
    pub fn error(&self) -> Option<HttpError> {
        self.shared.lock().error.clone()
    }

    /// The error recorded by whichever side claimed the terminal state.
    fn recorded_error(&self) -> HttpError {
        // Every claim records its error first, so the fallback is unreachable
        // in practice.
        self.shared
            .lock()
            .error
            .clone()
            .unwrap_or_else(|| HttpError::aborted("request aborted"))
    }

    /// Connect, send, receive. The stream never escapes this scope, so every
    /// exit path releases it exactly once by drop.
    async fn exchange(&self) -> Result<Response, Interrupt> {
        let mut stream = self.connect().await?;
        self.send(&mut stream).await?;
        self.receive(&mut stream).await
    }

    async fn connect(&self) -> Result<TcpStream, Interrupt> {
        let stream = tokio::select! {
            res = TcpStream::connect(self.address) => {
                res.map_err(|e| Interrupt::Failed(HttpError::connect(&e)))?
            }
            _ = self.shared.abort_wakeup.notified() => return Err(Interrupt::Aborted),
        };

        // An abort that raced the connect has already claimed the status
        // word; the failed step detects it here.
        if !self.shared.advance(Status::Connecting, Status::Connected) {
            return Err(Interrupt::Aborted);
        }

        tracing::trace!(address = %self.address, "Connected");
        Ok(stream)
    }

    async fn send(&self, stream: &mut TcpStream) -> Result<(), Interrupt> {
        let wire = self.serialize();

        tokio::select! {
            res = async {
                stream.write_all(&wire).await?;
                stream.flush().await
            } => {
                res.map_err(|e| Interrupt::Failed(HttpError::write(&e)))?;
            }
            _ = self.shared.abort_wakeup.notified() => return Err(Interrupt::Aborted),
        }

        if !self.shared.advance(Status::Connected, Status::RequestSent) {
            return Err(Interrupt::Aborted);
        }

        tracing::trace!(bytes = wire.len(), "Request sent");
        Ok(())
    }

    /// Serializes the request line, headers, blank line, and body. An empty
    /// path is sent as `/`; headers are written verbatim in map order.
    fn serialize(&self) -> Vec<u8> {
        let path = if self.path.is_empty() { "/" } else { &self.path };

        let mut wire = Vec::new();
        wire.extend_from_slice(format!("{} {} HTTP/1.1\r\n", self.method, path).as_bytes());

        for (key, value) in &self.headers {
            wire.extend_from_slice(format!("{}: {}\r\n", key, value).as_bytes());
        }

        wire.extend_from_slice(b"\r\n");
        wire.extend_from_slice(&self.body);
        wire
    }

    async fn receive(&self, stream: &mut TcpStream) -> Result<Response, Interrupt> {
        let mut reader = RecvBuffer::new(stream, &self.shared.abort_wakeup);

        let status_line = reader.read_line().await?;
        let code = parser::parse_status_line(&status_line)?;
        self.shared.lock().code = Some(code);

        let mut headers = Vec::new();
        loop {
            let line = reader.read_line().await?;
            if line.is_empty() {
                break;
            }
            headers.push(parser::parse_header_line(&line)?);
        }
        self.shared.lock().headers = Some(headers.clone());

        tracing::trace!(code = code, headers = headers.len(), "Response head parsed");

        if self.expects_body(code) {
            self.read_body(&mut reader, &headers).await?;
        }

        let body = Bytes::copy_from_slice(&self.shared.lock().body);
        Ok(Response::new(code, headers, body))
    }

    /// Whether a body follows the header block. Informational responses,
    /// 204, 304, and any response to a HEAD request carry none.
    fn expects_body(&self, code: u16) -> bool {
        if (100..200).contains(&code) || code == 204 || code == 304 {
            return false;
        }
        self.method != Method::HEAD
    }

    /// Reads the body with the applicable framing: chunked transfer coding,
    /// then an explicit Content-Length, then close-delimited if the response
    /// says `Connection: close`, and otherwise no body at all. Bytes land in
    /// the shared progress chunk by chunk.
    async fn read_body(
        &self,
        reader: &mut RecvBuffer<'_>,
        headers: &[(String, String)],
    ) -> Result<(), Interrupt> {
        let shared = &self.shared;
        let mut sink = |chunk: &[u8]| shared.lock().body.extend_from_slice(chunk);

        let chunked = find_header(headers, "Transfer-Encoding")
            .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case("chunked")))
            .unwrap_or(false);

        if chunked {
            loop {
                let size_line = reader.read_line().await?;
                let size = parser::parse_chunk_size(&size_line)?;

                if size == 0 {
                    // Trailer lines are consumed and discarded.
                    while !reader.read_line().await?.is_empty() {}
                    return Ok(());
                }

                reader.read_counted(size, &mut sink).await?;
                if !reader.read_line().await?.is_empty() {
                    return Err(Interrupt::Failed(HttpError::malformed(
                        "chunk data not followed by CRLF",
                    )));
                }
            }
        } else if let Some(value) = find_header(headers, "Content-Length") {
            let count = parser::parse_content_length(value)?;
            if count > 0 {
                reader.read_counted(count, &mut sink).await?;
            }
            Ok(())
        } else if find_header(headers, "Connection")
            .map(|v| v.eq_ignore_ascii_case("close"))
            .unwrap_or(false)
        {
            reader.read_to_close(&mut sink).await?;
            Ok(())
        } else {
            // No framing indicator: the response ends with its header block.
            Ok(())
        }
    }
}
