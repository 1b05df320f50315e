//! Shared HTTP plumbing for the network adapters.

mod client;
mod policy;
mod request;

pub use client::{ClientBuildError, DEFAULT_TIMEOUT, build_client};
pub use policy::{RateLimitPolicy, RetryPolicy};
pub use request::{ApiRequest, RawResponse, send};
