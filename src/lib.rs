//! httpflight - One In-Flight HTTP Request
//!
//! Core library for issuing a single HTTP/1.x exchange over a resolved
//! socket address, with out-of-band abort.

pub mod error;
pub mod http;
pub mod resolver;
