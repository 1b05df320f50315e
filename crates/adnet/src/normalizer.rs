//! Maps raw upstream responses into the canonical [`AdapterResult`].
//!
//! Every network signals success differently: some through a body `code`,
//! some only through the HTTP status. A [`SuccessPredicate`] captures one
//! network's rule; [`normalize`] applies it together with the shared error
//! extraction (message fallback chain, code fallback chain, raw body kept in
//! the payload).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::envelope::{AdapterResult, ResultCode, codes};
use crate::http::RawResponse;
use crate::network::Network;

/// Pangle wraps the real failure reason of a `50003` in its message text.
const PANGLE_WRAPPED_CODE: i64 = 50003;

static INTERNAL_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Internal code:\s*(-?\d+)").unwrap());

const UNKNOWN_ERROR: &str = "Unknown error";

/// Upper bound on raw error text copied into a message.
const MAX_TEXT_MESSAGE: usize = 500;

/// A network's success rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessPredicate {
    /// `code` is the string `"100"` or the number `0`, or `status` is `0`;
    /// payload under `result`/`data`.
    BigOAds,
    /// `code` is `0` or `200`; payload under `data`.
    Mintegral,
    /// `code` or `ret_code` is `0`; payload under `data`.
    Pangle,
    /// Any 2xx; an empty body is an empty success.
    IronSource,
    /// HTTP 200/201, plus 204 with no body when `accept_no_content`.
    HttpStatus { accept_no_content: bool },
}

impl SuccessPredicate {
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::BigOAds => Self::BigOAds,
            Network::Mintegral => Self::Mintegral,
            Network::Pangle => Self::Pangle,
            Network::IronSource => Self::IronSource,
            Network::Unity => Self::HttpStatus {
                accept_no_content: true,
            },
            Network::InMobi | Network::Fyber | Network::AppLovin | Network::Vungle => {
                Self::HttpStatus {
                    accept_no_content: false,
                }
            }
        }
    }

    fn accepts_empty(&self, status: u16) -> bool {
        match self {
            Self::IronSource => (200..300).contains(&status),
            Self::HttpStatus { accept_no_content } => *accept_no_content && status == 204,
            _ => false,
        }
    }

    pub fn is_success(&self, status: u16, body: &Value) -> bool {
        if !(200..300).contains(&status) {
            return false;
        }
        let code = body.get("code").and_then(ResultCode::from_json);
        let code = code.as_ref().and_then(ResultCode::as_i64);
        match self {
            Self::BigOAds => {
                let raw_code = body.get("code");
                raw_code.and_then(Value::as_str) == Some("100")
                    || raw_code.and_then(Value::as_i64) == Some(0)
                    || body.get("status").and_then(Value::as_i64) == Some(0)
            }
            Self::Mintegral => matches!(code, Some(0 | 200)),
            Self::Pangle => {
                code == Some(0) || body.get("ret_code").and_then(Value::as_i64) == Some(0)
            }
            Self::IronSource => true,
            Self::HttpStatus { .. } => matches!(status, 200 | 201),
        }
    }

    /// The part of a success body handed to the caller.
    fn success_payload(&self, body: Value) -> Value {
        let keys: &[&str] = match self {
            Self::BigOAds => &["result", "data"],
            Self::Mintegral | Self::Pangle => &["data"],
            Self::IronSource | Self::HttpStatus { .. } => &[],
        };
        match body {
            Value::Object(mut object) => {
                for key in keys {
                    if let Some(inner) = object.remove(*key) {
                        return inner;
                    }
                }
                Value::Object(object)
            }
            other => other,
        }
    }

    fn error_code(&self, body: &Value, status: u16) -> ResultCode {
        body.get("code")
            .and_then(ResultCode::from_json)
            .or_else(|| match self {
                Self::Pangle => body.get("ret_code").and_then(ResultCode::from_json),
                _ => None,
            })
            .unwrap_or(ResultCode::from(status))
    }
}

/// Best human-readable error text in an upstream body.
///
/// Looks at `msg`, `message`, `error` (a string or an object with its own
/// `message`) and Vungle's `messages` list, in that order.
pub fn error_message(body: &Value) -> Option<String> {
    fn non_empty(value: Option<&Value>) -> Option<String> {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    non_empty(body.get("msg"))
        .or_else(|| non_empty(body.get("message")))
        .or_else(|| match body.get("error") {
            Some(Value::Object(inner)) => non_empty(inner.get("message")),
            other => non_empty(other),
        })
        .or_else(|| match body.get("messages") {
            Some(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(|item| {
                        item.as_str()
                            .map(str::to_string)
                            .or_else(|| error_message(item))
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                (!joined.is_empty()).then_some(joined)
            }
            other => non_empty(other),
        })
}

/// Normalize with the network's own predicate.
pub fn normalize(network: Network, response: &RawResponse) -> AdapterResult {
    let result = normalize_with(SuccessPredicate::for_network(network), response);
    if !result.is_success() {
        debug!(
            %network,
            http_status = response.status,
            code = %result.code,
            message = %result.message,
            "Upstream call failed"
        );
    }
    result
}

pub fn normalize_with(predicate: SuccessPredicate, response: &RawResponse) -> AdapterResult {
    let status = response.status;
    let http_ok = response.is_success();
    let text = response.body.trim();

    if text.is_empty() {
        if predicate.accepts_empty(status) {
            return AdapterResult::success(Value::Null);
        }
        if http_ok {
            return AdapterResult::failure(
                codes::JSON_ERROR,
                "Empty response body",
                Value::String(String::new()),
            );
        }
        return AdapterResult::failure(status, format!("HTTP {status}"), Value::Null);
    }

    let body: Value = match serde_json::from_str(text) {
        Ok(body) => body,
        Err(e) if http_ok => {
            return AdapterResult::failure(
                codes::JSON_ERROR,
                format!("Invalid JSON response: {e}"),
                Value::String(response.body.clone()),
            );
        }
        Err(_) => {
            return AdapterResult::failure(
                status,
                text.chars().take(MAX_TEXT_MESSAGE).collect::<String>(),
                Value::String(response.body.clone()),
            );
        }
    };

    if http_ok && let Some(canonical) = AdapterResult::from_canonical(&body) {
        return canonical;
    }

    if predicate.is_success(status, &body) {
        return AdapterResult::success(predicate.success_payload(body));
    }

    let mut code = predicate.error_code(&body, status);
    let message = error_message(&body).unwrap_or_else(|| UNKNOWN_ERROR.to_string());

    if predicate == SuccessPredicate::Pangle
        && code.as_i64() == Some(PANGLE_WRAPPED_CODE)
        && let Some(inner) = INTERNAL_CODE_REGEX
            .captures(&message)
            .and_then(|c| c[1].parse::<i64>().ok())
    {
        code = ResultCode::Int(inner);
    }

    AdapterResult::failure(code, message, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::ResultStatus;
    use rstest::rstest;
    use serde_json::json;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse::new(status, body)
    }

    #[test]
    fn test_bigoads_success_unwraps_result() {
        let result = normalize(
            Network::BigOAds,
            &raw(200, r#"{"code":"100","result":{"appCode":"A1"}}"#),
        );
        assert_eq!(result.status, ResultStatus::Success);
        assert_eq!(result.code, ResultCode::Int(0));
        assert_eq!(result.message, "Success");
        assert_eq!(result.payload, json!({"appCode": "A1"}));
    }

    #[test]
    fn test_bigoads_status_zero() {
        let result = normalize(
            Network::BigOAds,
            &raw(200, r#"{"status":0,"data":{"list":[]}}"#),
        );
        assert!(result.is_success());
        assert_eq!(result.payload, json!({"list": []}));
    }

    #[rstest]
    #[case(r#"{"code":"100","result":{}}"#, true)]
    #[case(r#"{"code":0,"result":{}}"#, true)]
    #[case(r#"{"code":"0","result":{}}"#, false)]
    #[case(r#"{"code":100,"result":{}}"#, false)]
    #[case(r#"{"code":"200","msg":"busy"}"#, false)]
    fn test_bigoads_code_type_matters(#[case] body: &str, #[case] success: bool) {
        assert_eq!(normalize(Network::BigOAds, &raw(200, body)).is_success(), success);
    }

    #[test]
    fn test_mintegral_failure() {
        let result = normalize(
            Network::Mintegral,
            &raw(200, r#"{"code":-2007,"msg":"Invalid Params"}"#),
        );
        assert_eq!(result.status, ResultStatus::Failure);
        assert_eq!(result.code, ResultCode::Int(-2007));
        assert_eq!(result.message, "Invalid Params");
        assert_eq!(result.payload["code"], -2007);
    }

    #[rstest]
    #[case(r#"{"code":0,"data":{"app_id":1}}"#)]
    #[case(r#"{"code":200,"data":{"app_id":1}}"#)]
    fn test_mintegral_success_codes(#[case] body: &str) {
        let result = normalize(Network::Mintegral, &raw(200, body));
        assert!(result.is_success());
        assert_eq!(result.payload, json!({"app_id": 1}));
    }

    #[test]
    fn test_pangle_ret_code() {
        let result = normalize(
            Network::Pangle,
            &raw(200, r#"{"ret_code":0,"data":{"site_id":8}}"#),
        );
        assert!(result.is_success());
        assert_eq!(result.payload["site_id"], 8);

        let failed = normalize(
            Network::Pangle,
            &raw(200, r#"{"ret_code":40001,"message":"sign error"}"#),
        );
        assert_eq!(failed.code, ResultCode::Int(40001));
        assert_eq!(failed.message, "sign error");
    }

    #[test]
    fn test_pangle_internal_code() {
        let result = normalize(
            Network::Pangle,
            &raw(
                200,
                r#"{"code":50003,"message":"internal error, Internal code: 41012, app not found"}"#,
            ),
        );
        assert_eq!(result.code, ResultCode::Int(41012));
        assert!(result.message.contains("Internal code: 41012"));

        let plain = normalize(
            Network::Pangle,
            &raw(200, r#"{"code":50003,"message":"internal error"}"#),
        );
        assert_eq!(plain.code, ResultCode::Int(50003));
    }

    #[rstest]
    #[case(Network::InMobi, 200, true)]
    #[case(Network::Fyber, 201, true)]
    #[case(Network::Vungle, 202, false)]
    #[case(Network::AppLovin, 400, false)]
    #[case(Network::Unity, 201, true)]
    fn test_http_status_predicate(
        #[case] network: Network,
        #[case] status: u16,
        #[case] success: bool,
    ) {
        let result = normalize(network, &raw(status, r#"{"id":"x"}"#));
        assert_eq!(result.is_success(), success);
    }

    #[rstest]
    #[case(r#"{"msg":"a","message":"b"}"#, "a")]
    #[case(r#"{"message":"b","error":"c"}"#, "b")]
    #[case(r#"{"error":"c"}"#, "c")]
    #[case(r#"{"error":{"message":"nested"}}"#, "nested")]
    #[case(r#"{"messages":["Invalid token","expired"]}"#, "Invalid token; expired")]
    #[case(r#"{"detail":"x"}"#, "Unknown error")]
    fn test_error_message_chain(#[case] body: &str, #[case] expected: &str) {
        let result = normalize(Network::Fyber, &raw(400, body));
        assert_eq!(result.message, expected);
        assert_eq!(result.code, ResultCode::Int(400));
    }

    #[test]
    fn test_body_code_wins_over_http_status() {
        let result = normalize(
            Network::Vungle,
            &raw(403, r#"{"code":"forbidden","message":"no access"}"#),
        );
        assert_eq!(result.code, ResultCode::from("forbidden"));
    }

    #[test]
    fn test_invalid_json_on_success() {
        let result = normalize(Network::InMobi, &raw(200, "<html>oops</html>"));
        assert!(result.code.is(codes::JSON_ERROR));
        assert_eq!(result.payload, json!("<html>oops</html>"));
    }

    #[test]
    fn test_text_error_body() {
        let result = normalize(Network::InMobi, &raw(502, "Bad Gateway"));
        assert_eq!(result.code, ResultCode::Int(502));
        assert_eq!(result.message, "Bad Gateway");

        let empty = normalize(Network::InMobi, &raw(503, ""));
        assert_eq!(empty.message, "HTTP 503");
    }

    #[rstest]
    #[case(Network::IronSource, 200, true)]
    #[case(Network::IronSource, 204, true)]
    #[case(Network::Unity, 204, true)]
    #[case(Network::Unity, 200, false)]
    #[case(Network::Fyber, 204, false)]
    #[case(Network::BigOAds, 200, false)]
    fn test_empty_body(#[case] network: Network, #[case] status: u16, #[case] success: bool) {
        let result = normalize(network, &raw(status, ""));
        assert_eq!(result.is_success(), success);
        if success {
            assert_eq!(result.payload, Value::Null);
        } else {
            assert!(result.code.is(codes::JSON_ERROR));
        }
    }

    #[rstest]
    #[case(AdapterResult::success(json!({"appCode": "A1"})))]
    #[case(AdapterResult::failure(-2007i64, "Invalid Params", json!({"code": -2007})))]
    #[case(AdapterResult::failure(codes::NOT_SUPPORTED, "x", Value::Null))]
    fn test_idempotent(#[case] result: AdapterResult, #[values(Network::BigOAds, Network::Pangle, Network::Unity)] network: Network) {
        let body = serde_json::to_string(&result).unwrap();
        assert_eq!(normalize(network, &raw(200, &body)), result);
    }

    #[test]
    fn test_canonical_body_on_http_error_is_failure() {
        let body = r#"{"status":0,"code":0,"message":"Success","payload":{"appCode":"A1"}}"#;
        for network in [Network::BigOAds, Network::Unity, Network::IronSource] {
            let result = normalize(network, &raw(500, body));
            assert_eq!(result.status, ResultStatus::Failure);
        }
        assert!(normalize(Network::Unity, &raw(200, body)).is_success());
    }

    #[test]
    fn test_ironsource_json_success() {
        let result = normalize(
            Network::IronSource,
            &raw(200, r#"{"appKey":"k1","appName":"Demo"}"#),
        );
        assert!(result.is_success());
        assert_eq!(result.payload["appKey"], "k1");
    }
}
