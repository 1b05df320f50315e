//! Uniform app and ad-unit management across advertising network APIs.
//!
//! Each supported network exposes its own REST contract, authentication scheme
//! and response envelope. This crate hides those differences behind a single
//! [`NetworkAdapter`] contract (`create_app`, `create_unit`, `list_apps`,
//! `list_units`) and a canonical [`AdapterResult`] envelope.
//!
//! # Architecture
//!
//! - [`credentials::CredentialStore`]: per-network secret material
//! - [`signing`]: per-request signature engines (BigOAds, Mintegral, Pangle)
//! - [`token::TokenManager`]: refreshable bearer tokens (IronSource, Fyber, Vungle)
//! - [`networks`]: one adapter per network
//! - [`normalizer`]: maps raw responses into [`AdapterResult`]
//! - [`resolver`]: extracts [`NormalizedIdentifier`]s from results
//! - [`AdapterRegistry`]: single dispatch point used by callers

pub mod adapter;
pub mod bulk;
pub mod config;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod http;
pub mod identifier;
pub mod network;
pub mod networks;
pub mod normalizer;
pub mod registry;
pub mod resolver;
pub mod signing;
pub mod token;
pub mod utils;

pub use adapter::{AdapterContext, NetworkAdapter, Operation, Payload};
pub use config::{AdapterConfig, EndpointConfig};
pub use credentials::{AuthKind, CredentialStore, NetworkCredential};
pub use envelope::{AdapterResult, ResultCode, ResultStatus};
pub use error::AdapterError;
pub use identifier::{EntityKind, NormalizedIdentifier};
pub use network::Network;
pub use registry::AdapterRegistry;
