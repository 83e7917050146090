use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rpc::{
    codec::decode_hex_big,
    utils::{RpcErr, expect_params},
};

/// `eth_sendTransaction` / `eth_call` transaction object. All quantities
/// stay as the hex strings the caller sent.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionArgs {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub gas: Option<String>,
    #[serde(default)]
    pub gas_price: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, alias = "input")]
    pub data: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

impl TransactionArgs {
    pub fn from(&self) -> Option<&str> {
        non_empty(&self.from)
    }

    pub fn to(&self) -> Option<&str> {
        non_empty(&self.to)
    }

    pub fn gas(&self) -> Option<&str> {
        non_empty(&self.gas)
    }

    pub fn gas_price(&self) -> Option<&str> {
        non_empty(&self.gas_price)
    }

    pub fn value(&self) -> Option<&str> {
        non_empty(&self.value)
    }

    pub fn data(&self) -> Option<&str> {
        non_empty(&self.data)
    }
}

/// Filter object of `eth_getLogs` and `eth_newFilter`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogFilterArgs {
    #[serde(default)]
    pub from_block: Option<Value>,
    #[serde(default)]
    pub to_block: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
    #[serde(default)]
    pub topics: Option<Vec<Value>>,
}

impl LogFilterArgs {
    /// Reads the optional filter object. Without one every contract is
    /// matched from genesis to the tip.
    pub fn from_params(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        match params.as_deref() {
            None | Some([]) => Ok(Self::default()),
            Some(_) => {
                let params = expect_params(params, 1, 1)?;
                Ok(serde_json::from_value(params[0].clone())?)
            }
        }
    }

    /// Contract addresses without `0x`. Accepts a single string or a list.
    pub fn addresses(&self) -> Result<Vec<String>, RpcErr> {
        let strip = |address: &str| address.trim_start_matches("0x").to_owned();
        match &self.address {
            None | Some(Value::Null) => Ok(vec![]),
            Some(Value::String(address)) => Ok(vec![strip(address)]),
            Some(Value::Array(addresses)) => addresses
                .iter()
                .map(|address| {
                    address
                        .as_str()
                        .map(strip)
                        .ok_or_else(|| RpcErr::BadParams(format!("invalid address {address}")))
                })
                .collect(),
            Some(other) => Err(RpcErr::BadParams(format!("invalid address {other}"))),
        }
    }

    /// Topic matching cannot be expressed through `searchlogs` yet.
    pub fn reject_topics(&self) -> Result<(), RpcErr> {
        match &self.topics {
            Some(topics) if !topics.is_empty() => Err(RpcErr::Unsupported(
                "topics is not supported yet".to_owned(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockNumberOrTag {
    Number(u64),
    Latest,
    Earliest,
    Pending,
}

impl BlockNumberOrTag {
    pub fn parse(value: &Value) -> Result<Self, RpcErr> {
        match value {
            Value::String(tag) => match tag.as_str() {
                "latest" => Ok(Self::Latest),
                "earliest" => Ok(Self::Earliest),
                "pending" => Ok(Self::Pending),
                hex => {
                    let number = decode_hex_big(hex)?;
                    u64::try_from(number)
                        .map(Self::Number)
                        .map_err(|_| RpcErr::InvalidEncoding(format!("block {hex} out of range")))
                }
            },
            Value::Number(number) => number
                .as_u64()
                .map(Self::Number)
                .ok_or_else(|| RpcErr::InvalidEncoding(format!("invalid block number {number}"))),
            other => Err(RpcErr::BadParams(format!("invalid block number {other}"))),
        }
    }

    /// Height in `searchlogs` terms, where `-1` is the chain tip.
    pub fn to_search_height(self) -> Result<i64, RpcErr> {
        match self {
            Self::Number(number) => i64::try_from(number)
                .map_err(|_| RpcErr::InvalidEncoding(format!("block {number} out of range"))),
            Self::Latest => Ok(-1),
            Self::Earliest | Self::Pending => Err(RpcErr::Unsupported(
                "earliest and pending blocks are not supported".to_owned(),
            )),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EthLog {
    pub removed: bool,
    pub log_index: String,
    pub transaction_index: String,
    pub transaction_hash: String,
    pub block_hash: String,
    pub block_number: String,
    pub address: String,
    pub data: String,
    pub topics: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EthTransactionReceipt {
    pub transaction_hash: String,
    pub transaction_index: String,
    pub block_hash: String,
    pub block_number: String,
    pub from: String,
    pub to: Option<String>,
    pub cumulative_gas_used: String,
    pub gas_used: String,
    pub contract_address: Option<String>,
    pub logs: Vec<EthLog>,
    pub logs_bloom: String,
    pub status: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EthTransaction {
    pub hash: String,
    pub nonce: String,
    pub block_hash: Option<String>,
    pub block_number: Option<String>,
    pub transaction_index: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub value: String,
    pub gas: String,
    pub gas_price: String,
    pub input: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EthBlock {
    pub number: String,
    pub hash: String,
    pub parent_hash: String,
    pub nonce: String,
    pub logs_bloom: String,
    pub transactions_root: String,
    pub state_root: String,
    pub miner: String,
    pub difficulty: String,
    pub total_difficulty: String,
    pub extra_data: String,
    pub size: String,
    pub gas_limit: String,
    pub gas_used: String,
    pub timestamp: String,
    pub transactions: Vec<String>,
    pub uncles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_args_treats_empty_as_missing() {
        let args: TransactionArgs = serde_json::from_value(json!({
            "from": "0x7926223070547d2d15b2ef5e7383e541c338ffe9",
            "to": "",
            "input": "0x6080"
        }))
        .unwrap();
        assert_eq!(args.to(), None);
        assert_eq!(args.data(), Some("0x6080"));
        assert_eq!(args.value(), None);
    }

    #[test]
    fn test_log_filter_addresses() {
        let single: LogFilterArgs =
            serde_json::from_value(json!({ "address": "0xdb46f738bf32cdafb9a4a70eb8b44c76646bcaf0" }))
                .unwrap();
        assert_eq!(
            single.addresses().unwrap(),
            vec!["db46f738bf32cdafb9a4a70eb8b44c76646bcaf0"]
        );

        let many: LogFilterArgs =
            serde_json::from_value(json!({ "address": ["0xaa", "bb"] })).unwrap();
        assert_eq!(many.addresses().unwrap(), vec!["aa", "bb"]);

        let none = LogFilterArgs::default();
        assert!(none.addresses().unwrap().is_empty());

        let bad: LogFilterArgs = serde_json::from_value(json!({ "address": 5 })).unwrap();
        assert!(bad.addresses().is_err());
    }

    #[test]
    fn test_log_filter_from_params() {
        let missing = LogFilterArgs::from_params(&None).unwrap();
        assert!(missing.from_block.is_none());
        assert!(missing.addresses().unwrap().is_empty());

        let empty = LogFilterArgs::from_params(&Some(vec![])).unwrap();
        assert!(empty.to_block.is_none());

        let given = LogFilterArgs::from_params(&Some(vec![json!({ "fromBlock": "0x1" })])).unwrap();
        assert_eq!(given.from_block, Some(json!("0x1")));

        assert!(matches!(
            LogFilterArgs::from_params(&Some(vec![json!({}), json!({})])),
            Err(RpcErr::BadParams(_))
        ));
    }

    #[test]
    fn test_log_filter_topics() {
        let empty: LogFilterArgs = serde_json::from_value(json!({ "topics": [] })).unwrap();
        assert!(empty.reject_topics().is_ok());

        let topics: LogFilterArgs =
            serde_json::from_value(json!({ "topics": ["0x0f67", null] })).unwrap();
        assert!(matches!(topics.reject_topics(), Err(RpcErr::Unsupported(_))));
    }

    #[test]
    fn test_block_number_or_tag() {
        assert_eq!(
            BlockNumberOrTag::parse(&json!("latest")).unwrap(),
            BlockNumberOrTag::Latest
        );
        assert_eq!(
            BlockNumberOrTag::parse(&json!("0x1f")).unwrap(),
            BlockNumberOrTag::Number(31)
        );
        assert_eq!(
            BlockNumberOrTag::parse(&json!(7)).unwrap(),
            BlockNumberOrTag::Number(7)
        );
        assert!(BlockNumberOrTag::parse(&json!("0xnope")).is_err());
        assert!(BlockNumberOrTag::parse(&json!(true)).is_err());

        assert_eq!(BlockNumberOrTag::Latest.to_search_height().unwrap(), -1);
        assert_eq!(BlockNumberOrTag::Number(9).to_search_height().unwrap(), 9);
        assert!(matches!(
            BlockNumberOrTag::Pending.to_search_height(),
            Err(RpcErr::Unsupported(_))
        ));
    }
}
