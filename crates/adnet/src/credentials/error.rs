//! Credential error types.

use thiserror::Error;

use crate::network::Network;

/// Errors that can occur while loading or looking up credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No secret material at all for the network.
    #[error("No credentials configured for {0}")]
    NotConfigured(Network),

    /// A required secret field is absent or blank.
    #[error("Missing credential field {field} for {network}")]
    MissingField {
        network: Network,
        field: &'static str,
    },

    /// The backing source could not be read.
    #[error("Credential source error: {0}")]
    Source(String),
}
