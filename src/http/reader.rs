//! Abort-aware buffered reads from the connection.
//!
//! The receive phase never reads the socket directly; it goes through
//! [`RecvBuffer`], which races every socket read against the request's abort
//! notification and hands body bytes to a caller-supplied sink chunk by
//! chunk, so partial data is already published when a read is cut short.

use bytes::{Buf, BytesMut};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::Notify;

/// Initial capacity of the receive buffer.
const BUFFER_SIZE: usize = 8192;

/// Cap on a single line; prevents unbounded buffer growth on a peer that
/// never sends a newline.
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Why a read could not complete.
#[derive(Debug)]
pub(crate) enum RecvError {
    /// The transport read failed.
    Io(std::io::Error),
    /// The peer closed the connection before the expected bytes arrived.
    ClosedEarly(&'static str),
    /// A line contained bytes that are not valid UTF-8.
    NotUtf8,
    /// A line exceeded [`MAX_LINE_BYTES`] without a newline.
    LineTooLong,
    /// The abort notification fired while waiting for bytes.
    Aborted,
}

/// Buffered reader over the request's connection.
pub(crate) struct RecvBuffer<'a> {
    stream: &'a mut TcpStream,
    abort: &'a Notify,
    buf: BytesMut,
}

impl<'a> RecvBuffer<'a> {
    pub(crate) fn new(stream: &'a mut TcpStream, abort: &'a Notify) -> Self {
        Self {
            stream,
            abort,
            buf: BytesMut::with_capacity(BUFFER_SIZE),
        }
    }

    /// One socket read into the buffer, raced against abort. Returns the
    /// number of bytes read; 0 means the peer closed the connection.
    async fn fill(&mut self) -> Result<usize, RecvError> {
        tokio::select! {
            res = self.stream.read_buf(&mut self.buf) => res.map_err(RecvError::Io),
            _ = self.abort.notified() => Err(RecvError::Aborted),
        }
    }

    /// Reads one line, ending at `\n` with a trailing `\r` stripped.
    pub(crate) async fn read_line(&mut self) -> Result<String, RecvError> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let mut line = self.buf.split_to(pos + 1);
                line.truncate(pos);
                if line.last() == Some(&b'\r') {
                    line.truncate(pos - 1);
                }
                return String::from_utf8(line.to_vec()).map_err(|_| RecvError::NotUtf8);
            }

            if self.buf.len() > MAX_LINE_BYTES {
                return Err(RecvError::LineTooLong);
            }

            if self.fill().await? == 0 {
                return Err(RecvError::ClosedEarly("connection closed mid-line"));
            }
        }
    }

    /// Reads exactly `count` bytes, handing each chunk to `sink` as it
    /// arrives. A close before `count` bytes is an error.
    pub(crate) async fn read_counted(
        &mut self,
        count: usize,
        sink: &mut (dyn FnMut(&[u8]) + Send),
    ) -> Result<(), RecvError> {
        let mut remaining = count;

        while remaining > 0 {
            if self.buf.is_empty() && self.fill().await? == 0 {
                return Err(RecvError::ClosedEarly("connection closed mid-body"));
            }

            let take = self.buf.len().min(remaining);
            sink(&self.buf[..take]);
            self.buf.advance(take);
            remaining -= take;
        }

        Ok(())
    }

    /// Reads until the peer closes the connection, handing each chunk to
    /// `sink` as it arrives.
    pub(crate) async fn read_to_close(
        &mut self,
        sink: &mut (dyn FnMut(&[u8]) + Send),
    ) -> Result<(), RecvError> {
        loop {
            if !self.buf.is_empty() {
                sink(&self.buf);
                self.buf.clear();
            }

            if self.fill().await? == 0 {
                return Ok(());
            }
        }
    }
}
