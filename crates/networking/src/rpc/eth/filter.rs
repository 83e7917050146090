use serde_json::{Value, json};

use crate::rpc::{
    RpcApiContext, RpcHandler,
    clients::qtum::QtumRpc,
    codec::encode_hex_u64,
    eth::types::{BlockNumberOrTag, LogFilterArgs},
    filter::{FilterId, FilterKind, LogCriteria, search_height},
    utils::{RpcErr, expect_params, parse_json_hex},
};

fn parse_filter_id(params: &Option<Vec<Value>>) -> Result<FilterId, RpcErr> {
    let params = expect_params(params, 1, 1)?;
    parse_json_hex(&params[0]).map_err(RpcErr::BadParams)
}

fn filter_id_response(id: FilterId) -> Value {
    json!(encode_hex_u64(id))
}

/// Where a new log filter starts. `toBlock` is not tracked: a filter
/// always follows the tip.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FilterStart {
    Genesis,
    Block(u64),
    Tip,
}

pub struct NewFilterRequest {
    addresses: Vec<String>,
    start: FilterStart,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for NewFilterRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        let filter = LogFilterArgs::from_params(params)?;
        filter.reject_topics()?;

        let start = match &filter.from_block {
            None | Some(Value::Null) => FilterStart::Genesis,
            Some(block) => match BlockNumberOrTag::parse(block)? {
                BlockNumberOrTag::Number(number) => {
                    // Rejected here rather than on the first poll.
                    search_height(number)?;
                    FilterStart::Block(number)
                }
                BlockNumberOrTag::Latest => FilterStart::Tip,
                BlockNumberOrTag::Earliest | BlockNumberOrTag::Pending => {
                    return Err(RpcErr::Unsupported(
                        "earliest and pending blocks are not supported".to_owned(),
                    ));
                }
            },
        };
        Ok(NewFilterRequest {
            addresses: filter.addresses()?,
            start,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        // The cursor is the last block considered reported.
        let (cursor, from_block) = match self.start {
            FilterStart::Genesis => (0, 0),
            FilterStart::Block(number) => (number.saturating_sub(1), number),
            FilterStart::Tip => {
                let current = context.node.get_block_count().await?;
                (current, current.saturating_add(1))
            }
        };
        let criteria = LogCriteria {
            addresses: self.addresses.clone(),
            from_block,
        };
        let id = context
            .filters
            .create(FilterKind::Log(criteria), cursor)
            .await;
        Ok(filter_id_response(id))
    }
}

pub struct NewBlockFilterRequest;

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for NewBlockFilterRequest {
    fn parse(_params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(NewBlockFilterRequest)
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let current = context.node.get_block_count().await?;
        let id = context.filters.create(FilterKind::Block, current).await;
        Ok(filter_id_response(id))
    }
}

pub struct NewPendingTransactionFilterRequest;

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for NewPendingTransactionFilterRequest {
    fn parse(_params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(NewPendingTransactionFilterRequest)
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        let id = context
            .filters
            .create(FilterKind::PendingTransaction, 0)
            .await;
        Ok(filter_id_response(id))
    }
}

pub struct GetFilterChangesRequest {
    pub id: FilterId,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for GetFilterChangesRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(GetFilterChangesRequest {
            id: parse_filter_id(params)?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        context.filters.poll(self.id, &context.node).await
    }
}

pub struct GetFilterLogsRequest {
    pub id: FilterId,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for GetFilterLogsRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(GetFilterLogsRequest {
            id: parse_filter_id(params)?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        context.filters.logs(self.id, &context.node).await
    }
}

pub struct UninstallFilterRequest {
    pub id: FilterId,
}

impl<C: QtumRpc> RpcHandler<RpcApiContext<C>> for UninstallFilterRequest {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr> {
        Ok(UninstallFilterRequest {
            id: parse_filter_id(params)?,
        })
    }

    async fn handle(&self, context: RpcApiContext<C>) -> Result<Value, RpcErr> {
        Ok(json!(context.filters.uninstall(self.id).await))
    }
}
