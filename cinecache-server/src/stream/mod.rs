//! Signed stream links for the external media proxy.

pub mod resolve;
pub mod signing;

pub use resolve::RedirectResolver;
pub use signing::{SignError, SignedStream, StreamSigner};
