use serde_json::Value;
use thiserror::Error;

use crate::adapter::Operation;
use crate::credentials::CredentialError;
use crate::envelope::{AdapterResult, ResultCode, codes};
use crate::network::Network;
use crate::token::TokenError;

/// Expected failure modes of an adapter call.
///
/// None of these escape an adapter operation: they are folded into a
/// `status=1` [`AdapterResult`] via [`AdapterError::into_result`].
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("signature error: {0}")]
    Signature(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream error (code={code}): {message}")]
    Upstream {
        code: ResultCode,
        message: String,
        payload: Value,
    },
    #[error("json error: {0}")]
    Parse(String),
    #[error("{operation} is not supported by {network}")]
    Unsupported {
        network: Network,
        operation: Operation,
    },
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl AdapterError {
    pub fn unsupported(network: Network, operation: Operation) -> Self {
        Self::Unsupported { network, operation }
    }

    /// Envelope code for this error.
    pub fn code(&self) -> ResultCode {
        match self {
            Self::Auth(_) => codes::AUTH_ERROR.into(),
            Self::Signature(_) => codes::SIGNATURE_ERROR.into(),
            Self::Transport(_) => codes::API_ERROR.into(),
            Self::Upstream { code, .. } => code.clone(),
            Self::Parse(_) => codes::JSON_ERROR.into(),
            Self::Unsupported { .. } => codes::NOT_SUPPORTED.into(),
            Self::InvalidParams(_) => codes::INVALID_PARAMS.into(),
        }
    }

    pub fn into_result(self) -> AdapterResult {
        let code = self.code();
        match self {
            Self::Upstream {
                message, payload, ..
            } => AdapterResult::failure(code, message, payload),
            other => AdapterResult::failure(code, other.to_string(), Value::Null),
        }
    }
}

impl From<AdapterError> for AdapterResult {
    fn from(err: AdapterError) -> Self {
        err.into_result()
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<CredentialError> for AdapterError {
    fn from(err: CredentialError) -> Self {
        Self::Auth(err.to_string())
    }
}

impl From<TokenError> for AdapterError {
    fn from(err: TokenError) -> Self {
        Self::Auth(err.to_string())
    }
}
