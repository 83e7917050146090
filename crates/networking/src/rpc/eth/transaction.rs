use serde_json::{Value, json};

use crate::rpc::{
    RpcApiContext, RpcHandler,
    clients::qtum::{
        QtumRpc,
        asm::Asm,
        types::{ContractTransaction, TransactionReceipt, WalletTransaction},
    },
    codec::{
        AddressFormat, DEFAULT_GAS_LIMIT, add_hex_prefix, decode_hex_big, encode_hex_u64,
        eth_gas_to_qtum, native_amount_to_wei_hex, normalize_address, strip_hex_prefix,
        wei_hex_to_native_amount,
    },
    eth::{
        logs::to_eth_log,
        types::{EthTransaction, EthTransactionReceipt, TransactionArgs},
    },
    utils::{RpcErr, expect_params},
};

/// Which node RPC an `eth_sendTransaction` maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SendOperation {
    /// No recipient, has bytecode: `createcontract`.
    CreateContract,
    /// Recipient, value and sender, no data: `sendtoaddress`.
    SendEther,
    /// Recipient and call data: `sendtocontract`.
    CallContract,
}

impl SendOperation {
    pub fn classify(args: &TransactionArgs) -> Result<Self, RpcErr> {
        match (args.to(), args.data()) {
            (None, Some(_)) => Ok(SendOperation::CreateContract),
            (Some(_), None) if args.value().is_some() && args.from().is_some() => {
                Ok(SendOperation::SendEther)
            }
            (Some(_), Some(_)) => Ok(SendOperation::CallContract),
            _ => Err(RpcErr::UnknownOperation),
        }
    }
}

/// Optional trailing sender argument, in the node's address form.
async fn sender<C: QtumRpc>(node: &C, args: &TransactionArgs) -> Result<Option<Value>, RpcErr> {
    match args.from() {
        Some(from) => Ok(Some(json!(
            normalize_address(node, from, AddressFormat::Native).await?
        ))),
        None => Ok(None),
    }
}

pub struct SendTransactionRequest {
    pub args: TransactionArgs,
    pub operation: SendOperation,
}

impl SendTransactionRequest {
    /// `createcontract bytecode gaslimit gasprice [sender]`
    async fn create_contract<C: QtumRpc>(&self, node: &C) -> Result<String, RpcErr> {
        if let Some(value) = self.args.value() {
            if !decode_hex_big(value)?.is_zero() {
                return Err(RpcErr::InvalidRequest("value must be empty".to_owned()));
            }
        }
        let gas = eth_gas_to_qtum(self.args.gas(), self.args.gas_price(), DEFAULT_GAS_LIMIT)?;
        let mut params = vec![
            json!(strip_hex_prefix(self.args.data().unwrap_or_default())),
            gas.limit_json(),
            json!(gas.price),
        ];
        params.extend(sender(node, &self.args).await?);

        let created: ContractTransaction = node.request_as("createcontract", params).await?;
        tracing::debug!(txid = %created.txid, address = ?created.address, "Contract created");
        Ok(created.txid)
    }

    /// `sendtoaddress address amount "" "" false null null null sender true`:
    /// the sender is pinned and change returns to it.
    async fn send_ether<C: QtumRpc>(&self, node: &C) -> Result<String, RpcErr> {
        let amount = wei_hex_to_native_amount(self.args.value().unwrap_or_default())?;
        let to = normalize_address(node, self.args.to().unwrap_or_default(), AddressFormat::Native)
            .await?;
        let from = sender(node, &self.args).await?.unwrap_or(Value::Null);
        let params = vec![
            json!(to),
            json!(amount),
            json!(""),
            json!(""),
            json!(false),
            Value::Null,
            Value::Null,
            Value::Null,
            from,
            json!(true),
        ];
        Ok(node.request_as("sendtoaddress", params).await?)
    }

    /// `sendtocontract contract data amount gaslimit gasprice [sender]`
    async fn call_contract<C: QtumRpc>(&self, node: &C) -> Result<String, RpcErr> {
        let amount = match self.args.value() {
            Some(value) => wei_hex_to_native_amount(value)?,
            None => 0.0,
        };
        let gas = eth_gas_to_qtum(self.args.gas(), self.args.gas_price(), DEFAULT_GAS_LIMIT)?;
        let mut params = vec![
            json!(strip_hex_prefix(self.args.to().unwrap_or_default())),
            json!(strip_hex_prefix(self.args.data().unwrap_or_default())),
            json!(amount),
            gas.limit_json(),
            json!(gas.price),
        ];
        params.extend(sender(node, &self.args).await?);

        let sent: ContractTransaction = node.request_as("sendtocontract", params).await?;
        Ok(sent.txid)
    }
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for SendTransactionRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        let params = expect_params(params, 1, 1)?;
        let args: TransactionArgs = serde_json::from_value(params[0].clone())?;
        let operation = SendOperation::classify(&args)?;
        Ok(SendTransactionRequest { args, operation })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let txid = match self.operation {
            SendOperation::CreateContract => self.create_contract(&context.node).await?,
            SendOperation::SendEther => self.send_ether(&context.node).await?,
            SendOperation::CallContract => self.call_contract(&context.node).await?,
        };
        Ok(json!(add_hex_prefix(&txid)))
    }
}

fn parse_transaction_hash(params: &Option<Vec<Value>>) -> Result<String, RpcErr> {
    let params = expect_params(params, 1, 1)?;
    let hash: String = serde_json::from_value(params[0].clone())?;
    Ok(strip_hex_prefix(&hash).to_owned())
}

/// The node leaves fields it has no value for empty; those become `null`.
fn optional_hex(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| add_hex_prefix(value))
}

fn to_eth_receipt(receipt: &TransactionReceipt) -> EthTransactionReceipt {
    EthTransactionReceipt {
        transaction_hash: add_hex_prefix(&receipt.transaction_hash),
        transaction_index: encode_hex_u64(receipt.transaction_index),
        block_hash: add_hex_prefix(&receipt.block_hash),
        block_number: encode_hex_u64(receipt.block_number),
        from: add_hex_prefix(&receipt.from),
        to: optional_hex(&receipt.to),
        cumulative_gas_used: encode_hex_u64(receipt.cumulative_gas_used),
        gas_used: encode_hex_u64(receipt.gas_used),
        contract_address: optional_hex(&receipt.contract_address),
        logs: receipt
            .log
            .iter()
            .enumerate()
            .map(|(index, log)| to_eth_log(receipt, index, log))
            .collect(),
        logs_bloom: "0x".to_owned(),
        status: if receipt.succeeded() { "0x1" } else { "0x0" }.to_owned(),
    }
}

pub struct GetTransactionReceiptRequest {
    pub hash: String,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for GetTransactionReceiptRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(GetTransactionReceiptRequest {
            hash: parse_transaction_hash(params)?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let receipts = context.node.get_transaction_receipt(&self.hash).await?;
        match receipts.first() {
            Some(receipt) => Ok(serde_json::to_value(to_eth_receipt(receipt))?),
            None => Ok(Value::Null),
        }
    }
}

pub struct GetTransactionByHashRequest {
    pub hash: String,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for GetTransactionByHashRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(GetTransactionByHashRequest {
            hash: parse_transaction_hash(params)?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let raw = context
            .node
            .request("gettransaction", vec![json!(self.hash)])
            .await?;
        if raw.is_null() || raw.as_array().is_some_and(|entries| entries.is_empty()) {
            return Ok(Value::Null);
        }
        let wallet_tx: WalletTransaction = serde_json::from_value(raw)
            .map_err(|error| RpcErr::MalformedNodeResponse(format!("gettransaction: {error}")))?;

        let decoded = context.node.decode_raw_transaction(&wallet_tx.hex).await?;
        let script = decoded
            .vout
            .iter()
            .find(|output| output.script_pub_key.is_contract())
            .map(|output| Asm::parse(&output.script_pub_key.asm))
            .transpose()?;

        let receipt = context
            .node
            .get_transaction_receipt(&self.hash)
            .await?
            .into_iter()
            .next();

        let to = match (&script, &receipt) {
            (Some(Asm::Call(call)), _) => Some(add_hex_prefix(&call.contract_address)),
            (_, Some(receipt)) if !receipt.to.is_empty() => Some(add_hex_prefix(&receipt.to)),
            _ => None,
        };

        let transaction = EthTransaction {
            hash: add_hex_prefix(&wallet_tx.txid),
            nonce: "0x0".to_owned(),
            block_hash: receipt
                .as_ref()
                .map(|receipt| receipt.block_hash.as_str())
                .or(wallet_tx.blockhash.as_deref())
                .map(add_hex_prefix),
            block_number: receipt
                .as_ref()
                .map(|receipt| encode_hex_u64(receipt.block_number)),
            transaction_index: receipt
                .as_ref()
                .map(|receipt| receipt.transaction_index)
                .or(wallet_tx.blockindex)
                .map(encode_hex_u64),
            from: receipt.as_ref().map(|receipt| add_hex_prefix(&receipt.from)),
            to,
            value: native_amount_to_wei_hex(wallet_tx.amount),
            gas: encode_hex_u64(script.as_ref().map(Asm::gas_limit).unwrap_or_default()),
            gas_price: encode_hex_u64(script.as_ref().map(Asm::gas_price).unwrap_or_default()),
            input: add_hex_prefix(script.as_ref().map(Asm::input).unwrap_or_default()),
        };
        Ok(serde_json::to_value(transaction)?)
    }
}
