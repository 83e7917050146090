use serde_json::{Value, json};

use crate::rpc::{
    RpcApiContext, RpcHandler,
    clients::qtum::QtumRpc,
    codec::{add_hex_prefix, encode_hex_u64},
    eth::types::{BlockNumberOrTag, EthBlock},
    utils::{RpcErr, expect_params},
};

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

pub struct BlockNumberRequest;

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for BlockNumberRequest {
    fn parse(_params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(BlockNumberRequest)
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let count = context.node.get_block_count().await?;
        Ok(json!(encode_hex_u64(count)))
    }
}

pub struct GetBlockByNumberRequest {
    pub block: BlockNumberOrTag,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for GetBlockByNumberRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        // The second parameter asks for full transaction objects; only
        // hashes are ever returned.
        let params = expect_params(params, 1, 2)?;
        Ok(GetBlockByNumberRequest {
            block: BlockNumberOrTag::parse(&params[0])?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let height = match self.block {
            BlockNumberOrTag::Number(number) => number,
            BlockNumberOrTag::Earliest => 0,
            BlockNumberOrTag::Latest => context.node.get_block_count().await?,
            BlockNumberOrTag::Pending => {
                return Err(RpcErr::Unsupported("pending block is not supported".to_owned()));
            }
        };

        let hash = context.node.get_block_hash(height).await?;
        let header = context.node.get_block_header(&hash).await?;
        let block = context.node.get_block(&hash).await?;

        let block = EthBlock {
            number: encode_hex_u64(header.height),
            hash: add_hex_prefix(&header.hash),
            parent_hash: add_hex_prefix(header.previous_block_hash.as_deref().unwrap_or_default()),
            nonce: encode_hex_u64(header.nonce),
            logs_bloom: "0x".to_owned(),
            transactions_root: add_hex_prefix(&header.merkle_root),
            state_root: add_hex_prefix(&header.hash_state_root),
            miner: ZERO_ADDRESS.to_owned(),
            difficulty: encode_hex_u64(header.difficulty as u64),
            total_difficulty: "0x0".to_owned(),
            extra_data: "0x0".to_owned(),
            size: encode_hex_u64(block.size),
            gas_limit: "0x0".to_owned(),
            gas_used: "0x0".to_owned(),
            timestamp: encode_hex_u64(header.time),
            transactions: block.tx.iter().map(|tx| add_hex_prefix(tx)).collect(),
            uncles: vec![],
        };
        Ok(serde_json::to_value(block)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::utils::test_utils::{FakeNode, request};

    fn node_with_block() -> FakeNode {
        FakeNode::new()
            .on("getblockcount", json!(4063))
            .on(
                "getblockhash",
                json!("bba11e1bacc69ba535d478cf1f2e542da3735a517b0b8eebaf7e6bb25eeb48c5"),
            )
            .on(
                "getblockheader",
                json!({
                    "hash": "bba11e1bacc69ba535d478cf1f2e542da3735a517b0b8eebaf7e6bb25eeb48c5",
                    "confirmations": 1,
                    "height": 4063,
                    "version": 536870912,
                    "merkleroot": "0b5f03dc9d456c63c587cc554b70c1232449be43d1df62bc25a493b04de90334",
                    "time": 1533020036,
                    "mediantime": 1533020035,
                    "nonce": 0,
                    "bits": "207fffff",
                    "difficulty": 4.656542373906925e-10,
                    "chainwork": "0000000000000000000000000000000000000000000000000000000000001fc0",
                    "hashStateRoot": "3e49216e58f1ad9e6823b5095dc532f0a6cc44943d36ff4a7b1aa474e172d672",
                    "hashUTXORoot": "130a3e712d9f8b06b83f5ebf02b27542fb682cdff3ce1af1c17b804729cbe7a0",
                    "previousblockhash": "6d7d56af09383301e1bb32a97d4a5c0661d62302c06a778487d919b7115543be",
                    "flags": "proof-of-stake"
                }),
            )
            .on(
                "getblock",
                json!({
                    "hash": "bba11e1bacc69ba535d478cf1f2e542da3735a517b0b8eebaf7e6bb25eeb48c5",
                    "size": 1290,
                    "height": 4063,
                    "tx": [
                        "3208dc44733cbfa11654ad5651305428de473ef1e61a1ec07b0c1a5f4843be91",
                        "8fcd819194cce6a8454b2bec334d3448df4f097e9cdc36707bfd569900268950"
                    ]
                }),
            )
    }

    #[tokio::test]
    async fn test_block_number() {
        let result =
            BlockNumberRequest::call(&request("eth_blockNumber", json!([])), node_with_block().context())
                .await
                .unwrap();
        assert_eq!(result, json!("0xfdf"));
    }

    #[tokio::test]
    async fn test_get_block_by_number() {
        let node = node_with_block();
        let result = GetBlockByNumberRequest::call(
            &request("eth_getBlockByNumber", json!(["0xfdf", false])),
            node.clone().context(),
        )
        .await
        .unwrap();

        assert_eq!(node.calls_to("getblockhash"), vec![vec![json!(4063)]]);
        assert!(node.calls_to("getblockcount").is_empty());
        assert_eq!(result["number"], json!("0xfdf"));
        assert_eq!(
            result["hash"],
            json!("0xbba11e1bacc69ba535d478cf1f2e542da3735a517b0b8eebaf7e6bb25eeb48c5")
        );
        assert_eq!(
            result["parentHash"],
            json!("0x6d7d56af09383301e1bb32a97d4a5c0661d62302c06a778487d919b7115543be")
        );
        assert_eq!(result["timestamp"], json!("0x5b600784"));
        assert_eq!(result["size"], json!("0x50a"));
        assert_eq!(result["miner"], json!(ZERO_ADDRESS));
        assert_eq!(result["uncles"], json!([]));
        assert_eq!(result["transactions"].as_array().unwrap().len(), 2);
        assert_eq!(
            result["transactions"][0],
            json!("0x3208dc44733cbfa11654ad5651305428de473ef1e61a1ec07b0c1a5f4843be91")
        );
    }

    #[tokio::test]
    async fn test_get_block_by_number_latest_uses_tip() {
        let node = node_with_block();
        GetBlockByNumberRequest::call(
            &request("eth_getBlockByNumber", json!(["latest"])),
            node.clone().context(),
        )
        .await
        .unwrap();
        assert_eq!(node.calls_to("getblockhash"), vec![vec![json!(4063)]]);
    }

    #[tokio::test]
    async fn test_get_block_by_number_pending_is_unsupported() {
        let node = node_with_block();
        let result = GetBlockByNumberRequest::call(
            &request("eth_getBlockByNumber", json!(["pending", false])),
            node.clone().context(),
        )
        .await;
        assert!(matches!(result, Err(RpcErr::Unsupported(_))));
        assert!(node.calls().is_empty());
    }
}
