#[derive(Debug, thiserror::Error)]
pub enum QtumClientError {
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("Failed to serialize request body: {0}")]
    FailedToSerializeRequestBody(String),
    #[error("Parse Url Error. {0}")]
    ParseUrlError(String),
    #[error("QTUM_RPC url must specify user & password")]
    MissingCredentials,
    #[error("Node RPC error {code}: {message}")]
    RpcError { code: i64, message: String },
    #[error("Unexpected response to {method}: {reason}")]
    MalformedResponse { method: String, reason: String },
}
