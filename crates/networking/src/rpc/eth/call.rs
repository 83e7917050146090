use serde_json::{Value, json};

use crate::rpc::{
    RpcApiContext, RpcHandler,
    clients::qtum::{QtumRpc, types::CallContractResult},
    codec::{
        AddressFormat, CALL_GAS_LIMIT, DEFAULT_GAS_LIMIT, add_hex_prefix, encode_hex_u64,
        eth_gas_to_qtum, normalize_address, strip_hex_prefix,
    },
    eth::types::TransactionArgs,
    utils::{RpcErr, expect_params},
};

fn parse_call_args(params: &Option<Vec<Value>>) -> Result<TransactionArgs, RpcErr> {
    let params = expect_params(params, 1, 2)?;
    Ok(serde_json::from_value(params[0].clone())?)
}

/// Executes `args` against the node's state without broadcasting.
///
/// `callcontract address data [sender [gaslimit]]`; a missing sender is
/// sent as an empty string so the gas limit keeps its position.
async fn call_contract<C: QtumRpc>(
    node: &C,
    args: &TransactionArgs,
) -> Result<CallContractResult, RpcErr> {
    let to = args.to().unwrap_or_default();
    let from = match args.from() {
        Some(from) => json!(normalize_address(node, from, AddressFormat::Native).await?),
        None => json!(""),
    };
    let gas = eth_gas_to_qtum(args.gas(), None, CALL_GAS_LIMIT)?;

    let params = vec![
        json!(strip_hex_prefix(to)),
        json!(strip_hex_prefix(args.data().unwrap_or_default())),
        from,
        gas.limit_json(),
    ];
    Ok(node.request_as("callcontract", params).await?)
}

pub struct CallRequest {
    pub args: TransactionArgs,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for CallRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        let args = parse_call_args(params)?;
        if args.to().is_none() {
            return Err(RpcErr::BadParams("call without a contract address".to_owned()));
        }
        Ok(CallRequest { args })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let result = call_contract(&context.node, &self.args).await?;
        Ok(json!(add_hex_prefix(&result.execution_result.output)))
    }
}

pub struct EstimateGasRequest {
    pub args: TransactionArgs,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for EstimateGasRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(EstimateGasRequest {
            args: parse_call_args(params)?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        // Deployments cannot be dry-run through callcontract; quote the
        // limit createcontract would use.
        if self.args.to().is_none() {
            return Ok(json!(encode_hex_u64(DEFAULT_GAS_LIMIT)));
        }
        let result = call_contract(&context.node, &self.args).await?;
        Ok(json!(encode_hex_u64(result.execution_result.gas_used)))
    }
}
