use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rpc::clients::qtum::{asm::AsmError, errors::QtumClientError};

/// Generic "invalid input" code used for every parameter problem.
pub const INVALID_INPUT_CODE: i64 = 150;
pub const UNKNOWN_OPERATION_CODE: i64 = 151;

#[derive(Debug, thiserror::Error)]
pub enum RpcErr {
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("Bad params: {0}")]
    BadParams(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("unknown operation")]
    UnknownOperation,
    #[error("{0}")]
    Unsupported(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Node error {code}: {message}")]
    NodeError { code: i64, message: String },
    #[error("Malformed node response: {0}")]
    MalformedNodeResponse(String),
    #[error("filter not found")]
    UnknownFilter,
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid request: {0}")]
    MalformedRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcErrorMetadata {
    pub code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub message: String,
}

impl RpcErrorMetadata {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            message: message.into(),
        }
    }
}

impl From<RpcErr> for RpcErrorMetadata {
    fn from(value: RpcErr) -> Self {
        match value {
            RpcErr::InvalidEncoding(reason) | RpcErr::BadParams(reason) => {
                tracing::debug!(%reason, "Rejected invalid input");
                RpcErrorMetadata::new(INVALID_INPUT_CODE, "Input is invalid")
            }
            RpcErr::InvalidRequest(message) => RpcErrorMetadata::new(INVALID_INPUT_CODE, message),
            RpcErr::UnknownOperation => {
                RpcErrorMetadata::new(UNKNOWN_OPERATION_CODE, "unknown operation")
            }
            RpcErr::Unsupported(message) => RpcErrorMetadata::new(-32000, message),
            RpcErr::MethodNotFound(method) => {
                RpcErrorMetadata::new(-32601, format!("Method not found: {method}"))
            }
            RpcErr::NodeError { code, message } => RpcErrorMetadata::new(code, message),
            RpcErr::UnknownFilter => RpcErrorMetadata::new(-32000, "filter not found"),
            RpcErr::ParseError(reason) => {
                tracing::debug!(%reason, "Unparseable request body");
                RpcErrorMetadata::new(-32700, "Parse error")
            }
            RpcErr::MalformedRequest(reason) => {
                RpcErrorMetadata::new(-32600, format!("Invalid request: {reason}"))
            }
            RpcErr::MalformedNodeResponse(reason) | RpcErr::Internal(reason) => {
                tracing::error!(%reason, "Internal error while serving request");
                RpcErrorMetadata::new(-32603, "Internal error")
            }
        }
    }
}

impl From<serde_json::Error> for RpcErr {
    fn from(error: serde_json::Error) -> Self {
        Self::BadParams(error.to_string())
    }
}

impl From<QtumClientError> for RpcErr {
    fn from(error: QtumClientError) -> Self {
        match error {
            QtumClientError::RpcError { code, message } => RpcErr::NodeError { code, message },
            QtumClientError::MalformedResponse { method, reason } => {
                RpcErr::MalformedNodeResponse(format!("{method}: {reason}"))
            }
            other => RpcErr::Internal(other.to_string()),
        }
    }
}

impl From<AsmError> for RpcErr {
    fn from(error: AsmError) -> Self {
        RpcErr::MalformedNodeResponse(error.to_string())
    }
}

#[derive(Debug)]
pub enum RpcNamespace {
    Eth,
    Net,
    Web3,
    Personal,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(untagged)]
pub enum RpcRequestId {
    Number(serde_json::Number),
    String(String),
    #[default]
    Null,
}

impl RpcRequestId {
    /// Best-effort id of an entry that failed to parse as a request.
    pub fn from_raw(entry: &Value) -> Self {
        entry
            .get("id")
            .cloned()
            .and_then(|id| serde_json::from_value(id).ok())
            .unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: RpcRequestId,
    #[serde(default)]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Vec<Value>>,
}

impl RpcRequest {
    pub fn namespace(&self) -> Result<RpcNamespace, RpcErr> {
        let mut parts = self.method.split('_');
        let Some(namespace) = parts.next() else {
            return Err(RpcErr::MethodNotFound(self.method.clone()));
        };
        resolve_namespace(namespace, self.method.clone())
    }
}

pub fn resolve_namespace(maybe_namespace: &str, method: String) -> Result<RpcNamespace, RpcErr> {
    match maybe_namespace {
        "eth" => Ok(RpcNamespace::Eth),
        "net" => Ok(RpcNamespace::Net),
        "web3" => Ok(RpcNamespace::Web3),
        "personal" => Ok(RpcNamespace::Personal),
        _ => Err(RpcErr::MethodNotFound(method)),
    }
}

impl Default for RpcRequest {
    fn default() -> Self {
        RpcRequest {
            id: RpcRequestId::Number(1.into()),
            jsonrpc: "2.0".to_string(),
            method: "".to_string(),
            params: None,
        }
    }
}

pub fn rpc_response<E>(id: RpcRequestId, res: Result<Value, E>) -> Result<Value, RpcErr>
where
    E: Into<RpcErrorMetadata>,
{
    Ok(match res {
        Ok(result) => serde_json::to_value(RpcSuccessResponse {
            id,
            jsonrpc: "2.0".to_string(),
            result,
        }),
        Err(error) => serde_json::to_value(RpcErrorResponse {
            id,
            jsonrpc: "2.0".to_string(),
            error: error.into(),
        }),
    }
    .map_err(|error| RpcErr::Internal(error.to_string()))?)
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RpcSuccessResponse {
    pub id: RpcRequestId,
    pub jsonrpc: String,
    pub result: Value,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RpcErrorResponse {
    pub id: RpcRequestId,
    pub jsonrpc: String,
    pub error: RpcErrorMetadata,
}

/// Returns the positional params, checking there are between `min` and
/// `max` of them.
pub fn expect_params(
    params: &Option<Vec<Value>>,
    min: usize,
    max: usize,
) -> Result<&[Value], RpcErr> {
    let params = params
        .as_ref()
        .ok_or(RpcErr::BadParams("No params provided".to_owned()))?;
    if params.len() < min || params.len() > max {
        return Err(RpcErr::BadParams(format!(
            "Expected between {min} and {max} params and {} were provided",
            params.len()
        )));
    }
    Ok(params)
}

pub fn parse_json_hex(hex: &serde_json::Value) -> Result<u64, String> {
    if let Value::String(maybe_hex) = hex {
        let trimmed = maybe_hex.trim_start_matches("0x");
        let maybe_parsed = u64::from_str_radix(trimmed, 16);
        maybe_parsed.map_err(|_| format!("Could not parse given hex {maybe_hex}"))
    } else {
        Err(format!("Could not parse given hex {hex}"))
    }
}
