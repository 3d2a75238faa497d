//! Tests for the resolver delivery contract.

use std::pin::Pin;
use std::task::{Context, Waker};

use httpflight::resolver;

#[tokio::test]
async fn numeric_ipv4_literal_resolves_to_one_address() {
    let addrs = resolver::resolve("127.0.0.1", 8080).await;
    assert_eq!(addrs.len(), 1);
    assert_eq!(addrs[0], "127.0.0.1:8080".parse().unwrap());
}

#[tokio::test]
async fn bare_ipv6_literal_is_bracketed_before_lookup() {
    let addrs = resolver::resolve("::1", 443).await;
    assert_eq!(addrs.len(), 1);
    assert_eq!(addrs[0], "[::1]:443".parse().unwrap());
}

#[tokio::test]
async fn empty_hostname_delivers_empty_list() {
    assert!(resolver::resolve("", 80).await.is_empty());
}

#[tokio::test]
async fn unresolvable_hostname_delivers_empty_list() {
    // RFC 2606 reserves .invalid; it never has address records.
    assert!(resolver::resolve("unresolvable.invalid", 80).await.is_empty());
}

#[tokio::test]
async fn delivery_is_never_synchronous() {
    use std::future::Future;

    // On the current-thread runtime the lookup task cannot run until this
    // task yields, so a result observable here would mean `resolve`
    // delivered synchronously within the call.
    let mut resolution = resolver::resolve("127.0.0.1", 80);

    let mut cx = Context::from_waker(Waker::noop());
    assert!(Pin::new(&mut resolution).poll(&mut cx).is_pending());

    // The same future then completes exactly once at an await point.
    let addrs = resolution.await;
    assert_eq!(addrs.len(), 1);
}
