use serde_json::Value;

use crate::rpc::{
    RpcApiContext, RpcHandler,
    clients::qtum::{
        QtumRpc,
        types::{Log, TransactionReceipt},
    },
    codec::{add_hex_prefix, encode_hex_u64},
    eth::types::{BlockNumberOrTag, EthLog, LogFilterArgs},
    utils::RpcErr,
};

pub(crate) fn to_eth_log(receipt: &TransactionReceipt, index: usize, log: &Log) -> EthLog {
    EthLog {
        removed: false,
        log_index: encode_hex_u64(index as u64),
        transaction_index: encode_hex_u64(receipt.transaction_index),
        transaction_hash: add_hex_prefix(&receipt.transaction_hash),
        block_hash: add_hex_prefix(&receipt.block_hash),
        block_number: encode_hex_u64(receipt.block_number),
        address: add_hex_prefix(&log.address),
        data: add_hex_prefix(&log.data),
        topics: log.topics.iter().map(|topic| add_hex_prefix(topic)).collect(),
    }
}

/// Flattens node receipts into Ethereum logs. `logIndex` is the position
/// of the log inside its receipt.
pub(crate) fn receipts_to_logs(receipts: &[TransactionReceipt]) -> Vec<EthLog> {
    receipts
        .iter()
        .flat_map(|receipt| {
            receipt
                .log
                .iter()
                .enumerate()
                .map(move |(index, log)| to_eth_log(receipt, index, log))
        })
        .collect()
}

pub struct GetLogsRequest {
    pub from: i64,
    pub to: i64,
    pub addresses: Vec<String>,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for GetLogsRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        let filter = LogFilterArgs::from_params(params)?;
        filter.reject_topics()?;

        let from = match &filter.from_block {
            None | Some(Value::Null) => 0,
            Some(block) => BlockNumberOrTag::parse(block)?.to_search_height()?,
        };
        let to = match &filter.to_block {
            None | Some(Value::Null) => -1,
            Some(block) => BlockNumberOrTag::parse(block)?.to_search_height()?,
        };
        Ok(GetLogsRequest {
            from,
            to,
            addresses: filter.addresses()?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let receipts = context
            .node
            .search_logs(self.from, self.to, &self.addresses)
            .await?;
        Ok(serde_json::to_value(receipts_to_logs(&receipts))?)
    }
}
