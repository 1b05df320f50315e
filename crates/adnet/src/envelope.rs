//! The canonical result envelope returned by every adapter operation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known failure codes produced by this crate (as opposed to
/// network-native codes, which are passed through untouched).
pub mod codes {
    pub const AUTH_ERROR: &str = "AUTH_ERROR";
    pub const SIGNATURE_ERROR: &str = "SIGNATURE_ERROR";
    pub const API_ERROR: &str = "API_ERROR";
    pub const JSON_ERROR: &str = "JSON_ERROR";
    pub const NOT_SUPPORTED: &str = "NOT_SUPPORTED";
    pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
}

/// `0` for success, `1` for failure on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ResultStatus {
    Success,
    Failure,
}

impl From<ResultStatus> for u8 {
    fn from(status: ResultStatus) -> Self {
        match status {
            ResultStatus::Success => 0,
            ResultStatus::Failure => 1,
        }
    }
}

impl TryFrom<u8> for ResultStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Failure),
            other => Err(format!("invalid result status: {other}")),
        }
    }
}

/// A network-native result code. Some networks answer with numbers, others
/// with strings; callers treat the value as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultCode {
    Int(i64),
    Text(String),
}

impl ResultCode {
    /// Read a code out of a JSON value. Only numbers and strings qualify.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Self::Int),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Integer view of the code, parsing numeric strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn is(&self, text: &str) -> bool {
        matches!(self, Self::Text(s) if s == text)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ResultCode {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u16> for ResultCode {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ResultCode {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ResultCode {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Canonical adapter envelope.
///
/// Serializes as `{"status":0|1,"code":...,"message":"...","payload":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterResult {
    pub status: ResultStatus,
    pub code: ResultCode,
    pub message: String,
    pub payload: Value,
}

const CANONICAL_KEYS: [&str; 4] = ["status", "code", "message", "payload"];

impl AdapterResult {
    pub const SUCCESS_MESSAGE: &'static str = "Success";

    pub fn success(payload: Value) -> Self {
        Self {
            status: ResultStatus::Success,
            code: ResultCode::Int(0),
            message: Self::SUCCESS_MESSAGE.to_string(),
            payload,
        }
    }

    pub fn failure(
        code: impl Into<ResultCode>,
        message: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            status: ResultStatus::Failure,
            code: code.into(),
            message: message.into(),
            payload,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    /// Recognize a body that is already a canonical envelope.
    ///
    /// The object must carry exactly the four envelope keys with a `0`/`1`
    /// status, a number-or-string code and a string message.
    pub fn from_canonical(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != CANONICAL_KEYS.len()
            || !CANONICAL_KEYS.iter().all(|k| object.contains_key(*k))
        {
            return None;
        }

        let status = object
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u8::try_from(s).ok())
            .and_then(|s| ResultStatus::try_from(s).ok())?;
        let code = object.get("code").and_then(ResultCode::from_json)?;
        let message = object.get("message").and_then(Value::as_str)?.to_string();
        let payload = object.get("payload").cloned().unwrap_or(Value::Null);

        Some(Self {
            status,
            code,
            message,
            payload,
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "status": u8::from(self.status),
            "code": self.code,
            "message": self.message,
            "payload": self.payload,
        })
    }
}
