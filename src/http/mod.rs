//! HTTP protocol implementation.
//!
//! This module implements the client side of one HTTP/1.x exchange over an
//! already-resolved socket address.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`request`**: The request object implementing the connect/send/receive state machine
//! - **`response`**: HTTP response representation with case-insensitive header lookup
//! - **`parser`**: Parses status lines, header lines, and chunk-size lines
//! - **`reader`**: Abort-aware buffered reads from the connection
//!
//! # Request State Machine
//!
//! Each request goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │    Init     │ ← Constructed, no I/O yet
//!        └──────┬──────┘
//!               │ run() invoked
//!               ▼
//!        ┌──────────────────┐
//!        │   Connecting     │ ← Establish TCP connection
//!        └──────┬───────────┘
//!               │ Connected
//!               ▼
//!        ┌──────────────────┐
//!        │   Connected      │ ← Write request line, headers, body
//!        └──────┬───────────┘
//!               │ Request flushed
//!               ▼
//!        ┌──────────────────┐
//!        │   RequestSent    │ ← Parse status line, headers, body
//!        └──────┬───────────┘
//!               │ Full response parsed
//!               ▼
//!        ┌──────────────────┐
//!        │    Success       │
//!        └──────────────────┘
//! ```
//!
//! Any non-terminal state moves to `Error` when its step fails, or to
//! `Aborted` when `abort()` is called. Transitions are monotonic; the three
//! terminal states are final.
//!
//! # Example
//!
//! ```ignore
//! use httpflight::http::request::{HttpRequest, Method};
//! use std::collections::HashMap;
//!
//! #[tokio::main]
//! async fn main() {
//!     let addrs = httpflight::resolver::resolve("example.com", 80).await;
//!     let request = HttpRequest::new(
//!         addrs[0],
//!         "/",
//!         Method::GET,
//!         Vec::new(),
//!         HashMap::from([("Host".to_string(), "example.com".to_string())]),
//!     );
//!     match request.run().await {
//!         Ok(response) => println!("{}", response.code()),
//!         Err(e) => eprintln!("request failed: {}", e),
//!     }
//! }
//! ```

pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
