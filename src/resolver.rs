//! Hostname resolution.
//!
//! Turns a hostname and port into an ordered list of connectable socket
//! addresses. Resolution runs on a background task and the result comes back
//! through a single-completion future, so the caller can only observe it at
//! an await point — never inside the `resolve` call itself, even when the
//! answer is immediate (e.g. a numeric address literal).

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// Pending result of a [`resolve`] call.
///
/// Completes exactly once with the ordered address list; an empty list means
/// resolution failed. Dropping the future abandons the lookup.
pub struct Resolution {
    rx: oneshot::Receiver<Vec<SocketAddr>>,
}

impl Future for Resolution {
    type Output = Vec<SocketAddr>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // The lookup task never drops its sender before sending, but an
        // aborted runtime can; report that as a failed resolution.
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or_default())
    }
}

/// Resolves `hostname:port` to an ordered list of socket addresses.
///
/// Every failure mode — empty hostname, resolver error, no address records —
/// is reported as an empty list; there is no separate error channel at this
/// layer. Must be called from within a tokio runtime.
///
/// # Example
///
/// ```ignore
/// let addrs = httpflight::resolver::resolve("example.com", 80).await;
/// if addrs.is_empty() {
///     eprintln!("resolution failed");
/// }
/// ```
pub fn resolve(hostname: &str, port: u16) -> Resolution {
    let (tx, rx) = oneshot::channel();
    let hostname = hostname.to_string();

    tokio::spawn(async move {
        let addrs = lookup(&hostname, port).await;
        // Receiver may have been dropped; the lookup is simply abandoned.
        let _ = tx.send(addrs);
    });

    Resolution { rx }
}

async fn lookup(hostname: &str, port: u16) -> Vec<SocketAddr> {
    if hostname.is_empty() {
        return Vec::new();
    }

    // Bare IPv6 literals must be bracketed before the host:port join, or
    // the colons are misread as port separators.
    let target = if hostname.contains(':') && !hostname.starts_with('[') {
        format!("[{}]:{}", hostname, port)
    } else {
        format!("{}:{}", hostname, port)
    };

    match tokio::net::lookup_host(&target).await {
        Ok(addrs) => {
            let addrs: Vec<SocketAddr> = addrs.collect();
            tracing::debug!(
                hostname = %hostname,
                port = port,
                count = addrs.len(),
                "Hostname resolved"
            );
            addrs
        }
        Err(e) => {
            tracing::debug!(
                hostname = %hostname,
                port = port,
                error = %e,
                "Hostname resolution failed"
            );
            Vec::new()
        }
    }
}
