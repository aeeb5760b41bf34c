//! Outbound HTTP with bounded retry.
//!
//! Every network-facing component (search provider, document hosts,
//! completion service) goes through [`ResilientClient`], which retries
//! transient server errors and transport failures with linear backoff and
//! enforces a finite timeout on every request.

mod client;
mod retry;

pub use client::{FetchError, FetchRequest, FetchResponse, ResilientClient};
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES, RETRY_STATUSES};
