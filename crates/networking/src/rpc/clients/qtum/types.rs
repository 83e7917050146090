//! Result shapes of the Qtum node RPCs the adapter consumes. Fields the
//! adapter never reads are left out; serde ignores them.

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Log {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

/// One contract execution recorded by `gettransactionreceipt` or
/// `searchlogs`. Hashes and addresses come without the `0x` prefix.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub block_hash: String,
    pub block_number: u64,
    pub transaction_hash: String,
    pub transaction_index: u64,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub cumulative_gas_used: u64,
    #[serde(default)]
    pub gas_used: u64,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub excepted: String,
    #[serde(default)]
    pub log: Vec<Log>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.excepted == "None"
    }
}

/// Wallet view of a transaction (`gettransaction`).
#[derive(Deserialize, Debug, Clone)]
pub struct WalletTransaction {
    pub amount: f64,
    pub txid: String,
    #[serde(default)]
    pub blockhash: Option<String>,
    #[serde(default)]
    pub blockindex: Option<u64>,
    pub hex: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DecodedRawTransaction {
    pub txid: String,
    #[serde(default)]
    pub vout: Vec<TransactionOutput>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TransactionOutput {
    pub value: f64,
    pub n: u64,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ScriptPubKey {
    pub asm: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ScriptPubKey {
    pub fn is_contract(&self) -> bool {
        matches!(self.kind.as_str(), "create" | "call")
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CallContractResult {
    pub address: String,
    pub execution_result: ExecutionResult,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub gas_used: u64,
    pub excepted: String,
    pub output: String,
}

/// Result of `createcontract` and `sendtocontract`.
#[derive(Deserialize, Debug, Clone)]
pub struct ContractTransaction {
    pub txid: String,
    pub sender: String,
    pub hash160: String,
    /// Only set by `createcontract`.
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlockchainInfo {
    pub chain: String,
    pub blocks: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub hash: String,
    pub height: u64,
    pub time: u64,
    pub nonce: u64,
    pub difficulty: f64,
    #[serde(rename = "merkleroot")]
    pub merkle_root: String,
    pub hash_state_root: String,
    #[serde(default, rename = "previousblockhash")]
    pub previous_block_hash: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlockInfo {
    pub size: u64,
    #[serde(default)]
    pub tx: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AccountInfo {
    pub address: String,
    #[serde(default)]
    pub code: String,
}

/// `getaddressbalance` reports satoshis.
#[derive(Deserialize, Debug, Clone)]
pub struct AddressBalance {
    pub balance: i64,
}
