//! Credential management.
//!
//! Secret material is loaded once from a [`CredentialSource`] into an
//! explicit [`CredentialStore`] value which is handed to every adapter. The
//! store can be reloaded on demand when the backing source changes.
//!
//! - [`AuthKind`]: how a network authenticates
//! - [`NetworkCredential`]: one network's secret group
//! - [`CredentialSource`]: where secrets come from (environment, `.env`, map)
//! - [`CredentialStore`]: typed lookups over the loaded snapshot

mod error;
mod source;
mod store;
mod types;

pub use error::CredentialError;
pub use source::{CredentialSource, EnvSource, MapSource};
pub use store::CredentialStore;
pub use types::{AuthKind, NetworkCredential};
