use alloy_primitives::U256;
use serde_json::{Value, json};

use crate::rpc::{
    RpcApiContext, RpcHandler,
    clients::qtum::{QtumRpc, types::AddressBalance},
    codec::{AddressFormat, add_hex_prefix, encode_hex_big, encode_hex_u64, normalize_address},
    utils::{RpcErr, expect_params},
};

/// `getaddressbalance` reports satoshis; Ethereum balances are in wei.
const WEI_PER_SATOSHI: u64 = 10_000_000_000;

pub struct AccountsRequest;

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for AccountsRequest {
    fn parse(_params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(AccountsRequest)
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let addresses: Vec<String> = context
            .node
            .request_as("getaddressesbyaccount", vec![json!("")])
            .await?;

        let mut accounts = Vec::with_capacity(addresses.len());
        for address in addresses {
            match context.node.get_hex_address(&address).await {
                Ok(hex) => accounts.push(add_hex_prefix(&hex)),
                // Wallets can hold addresses without a hex form (P2SH).
                Err(error) => tracing::debug!(%address, %error, "Skipping wallet address"),
            }
        }
        Ok(json!(accounts))
    }
}

/// Address argument shared by the per-account queries. The block
/// parameter is accepted and ignored: the node only answers for the tip.
fn parse_address(params: &Option<Vec<Value>>) -> Result<String, RpcErr> {
    let params = expect_params(params, 1, 2)?;
    Ok(serde_json::from_value(params[0].clone())?)
}

pub struct GetBalanceRequest {
    pub address: String,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for GetBalanceRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(GetBalanceRequest {
            address: parse_address(params)?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let address =
            normalize_address(&context.node, &self.address, AddressFormat::Native).await?;
        let balance: AddressBalance = context
            .node
            .request_as("getaddressbalance", vec![json!({ "addresses": [address] })])
            .await?;

        let satoshi = U256::from(balance.balance.max(0) as u64);
        Ok(json!(encode_hex_big(satoshi * U256::from(WEI_PER_SATOSHI))))
    }
}

pub struct GetTransactionCountRequest {
    pub address: String,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for GetTransactionCountRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(GetTransactionCountRequest {
            address: parse_address(params)?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let address =
            normalize_address(&context.node, &self.address, AddressFormat::Native).await?;
        let txids: Vec<String> = context
            .node
            .request_as("getaddresstxids", vec![json!({ "addresses": [address] })])
            .await?;
        Ok(json!(encode_hex_u64(txids.len() as u64)))
    }
}

pub struct GetCodeRequest {
    pub address: String,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for GetCodeRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(GetCodeRequest {
            address: parse_address(params)?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let address = normalize_address(&context.node, &self.address, AddressFormat::Hex).await?;
        let account = context
            .node
            .get_account_info(address.trim_start_matches("0x"))
            .await?;
        Ok(json!(add_hex_prefix(&account.code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::utils::test_utils::{FakeNode, request};

    const HEX_ADDRESS: &str = "0x7926223070547d2d15b2ef5e7383e541c338ffe9";
    const NATIVE_ADDRESS: &str = "qUbxboqjBRp96j3La8D1RYkyqx5uQbJPoW";

    #[tokio::test]
    async fn test_accounts_skips_unconvertible_addresses() {
        let node = FakeNode::new()
            .on(
                "getaddressesbyaccount",
                json!([NATIVE_ADDRESS, "2N1ccXAcTdC1fxqGSNW9FMUTsz6szLKTJRK"]),
            )
            .on("gethexaddress", json!("7926223070547d2d15b2ef5e7383e541c338ffe9"))
            .fail("gethexaddress", -5, "Only pubkeyhash addresses are supported");

        let result = AccountsRequest::call(&request("eth_accounts", json!([])), node.context())
            .await
            .unwrap();
        assert_eq!(result, json!([HEX_ADDRESS]));
    }

    #[tokio::test]
    async fn test_get_balance_converts_satoshi_to_wei() {
        let node = FakeNode::new()
            .on("fromhexaddress", json!(NATIVE_ADDRESS))
            .on("getaddressbalance", json!({ "balance": 150000000, "received": 150000000 }));
        let context = node.clone().context();

        let result = GetBalanceRequest::call(
            &request("eth_getBalance", json!([HEX_ADDRESS, "latest"])),
            context,
        )
        .await
        .unwrap();

        // 1.5 QTUM = 1.5e18 wei
        assert_eq!(result, json!("0x14d1120d7b160000"));
        assert_eq!(
            node.calls_to("getaddressbalance"),
            vec![vec![json!({ "addresses": [NATIVE_ADDRESS] })]]
        );
    }

    #[tokio::test]
    async fn test_get_balance_requires_address() {
        let result =
            GetBalanceRequest::call(&request("eth_getBalance", json!([])), FakeNode::new().context())
                .await;
        assert!(matches!(result, Err(RpcErr::BadParams(_))));
    }

    #[tokio::test]
    async fn test_get_transaction_count() {
        let node = FakeNode::new().on("getaddresstxids", json!(["aa", "bb", "cc"]));
        let result = GetTransactionCountRequest::call(
            &request("eth_getTransactionCount", json!([NATIVE_ADDRESS])),
            node.clone().context(),
        )
        .await
        .unwrap();
        assert_eq!(result, json!("0x3"));
        // Already native, no conversion needed.
        assert!(node.calls_to("fromhexaddress").is_empty());
    }

    #[tokio::test]
    async fn test_get_code() {
        let node = FakeNode::new().on(
            "getaccountinfo",
            json!({
                "address": "7926223070547d2d15b2ef5e7383e541c338ffe9",
                "balance": 0,
                "storage": {},
                "code": "6080604052"
            }),
        );
        let result = GetCodeRequest::call(
            &request("eth_getCode", json!([HEX_ADDRESS, "latest"])),
            node.clone().context(),
        )
        .await
        .unwrap();
        assert_eq!(result, json!("0x6080604052"));
        assert_eq!(
            node.calls_to("getaccountinfo"),
            vec![vec![json!("7926223070547d2d15b2ef5e7383e541c338ffe9")]]
        );
    }
}
