use serde_json::{Value, json};

use crate::rpc::{RpcHandler, utils::RpcErr};

/// Reported by `web3_clientVersion`. Tooling such as truffle keys its
/// behavior off the `ETHTestRPC` marker.
pub const CLIENT_VERSION: &str = "QTUM ETHTestRPC/ethereum-js";

pub struct ClientVersionRequest;

impl<T> RpcHandler<T> for ClientVersionRequest {
    fn parse(_params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(ClientVersionRequest)
    }

    async fn handle(&self, _context: T) -> Result<Value, RpcErr> {
        Ok(json!(CLIENT_VERSION))
    }
}
