use serde_json::{Value, json};

use crate::rpc::{RpcApiContext, RpcHandler, clients::qtum::QtumRpc, utils::RpcErr};

/// Ethereum network id for a Qtum chain name. Unknown chains are reported
/// by name.
pub fn network_id(chain: &str) -> &str {
    match chain {
        "main" => "81",
        "test" => "8889",
        "regtest" => "8890",
        other => other,
    }
}

pub struct NetVersionRequest;

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for NetVersionRequest {
    fn parse(_params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(NetVersionRequest)
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let info = context.node.get_blockchain_info().await?;
        Ok(json!(network_id(&info.chain)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::utils::test_utils::{FakeNode, request};

    #[test]
    fn test_network_id() {
        assert_eq!(network_id("main"), "81");
        assert_eq!(network_id("test"), "8889");
        assert_eq!(network_id("regtest"), "8890");
        assert_eq!(network_id("signet"), "signet");
    }

    #[tokio::test]
    async fn test_net_version_regtest() {
        let node = FakeNode::new().on(
            "getblockchaininfo",
            json!({ "chain": "regtest", "blocks": 4063, "headers": 4063 }),
        );
        let result = NetVersionRequest::call(&request("net_version", json!([])), node.context())
            .await
            .unwrap();
        assert_eq!(result, json!("8890"));
    }
}
