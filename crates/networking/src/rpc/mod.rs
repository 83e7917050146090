pub mod clients;
pub mod codec;
pub mod eth;
pub mod filter;
pub mod net;
pub mod server;
pub mod utils;
pub mod web3;

use crate::rpc::{
    clients::qtum::QtumRpc,
    filter::FilterStore,
    utils::{RpcErr, RpcRequest},
};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Deserialize)]
#[serde(untagged)]
pub enum RpcRequestWrapper {
    Single(Map<String, Value>),
    Multiple(Vec<Value>),
}

/// State shared by every handler: the node and the filters installed
/// through this adapter.
#[derive(Clone, Debug)]
pub struct RpcApiContext<C> {
    pub node: C,
    pub filters: FilterStore,
    /// Log raw request and response bodies.
    pub debug: bool,
}

impl<C: QtumRpc> RpcApiContext<C> {
    pub fn new(node: C) -> Self {
        Self {
            node,
            filters: FilterStore::default(),
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[allow(async_fn_in_trait)]
pub trait RpcHandler<T>: Sized {
    fn parse(params: &Option<Vec<Value>>) -> Result<Self, RpcErr>;

    async fn call(req: &RpcRequest, context: T) -> Result<Value, RpcErr> {
        let request = Self::parse(&req.params)?;
        request.handle(context).await
    }

    async fn handle(&self, context: T) -> Result<Value, RpcErr>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_object_is_kept_raw() {
        // Shape errors are reported per request, so a missing method still
        // deserializes and keeps its id.
        let wrapper: RpcRequestWrapper =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 9, "params": [] })).unwrap();

        let RpcRequestWrapper::Single(request) = wrapper else {
            panic!("expected a single request");
        };
        assert_eq!(request.get("id"), Some(&json!(9)));
        assert!(request.get("method").is_none());
    }

    #[test]
    fn test_batch_accepts_non_object_entries() {
        let wrapper: RpcRequestWrapper = serde_json::from_value(json!([
            { "jsonrpc": "2.0", "id": 1, "method": "eth_blockNumber" },
            "garbage",
            42
        ]))
        .unwrap();

        let RpcRequestWrapper::Multiple(entries) = wrapper else {
            panic!("expected a batch");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1], json!("garbage"));
    }

    #[test]
    fn test_scalar_body_is_rejected() {
        for body in [json!("eth_blockNumber"), json!(1), Value::Null] {
            assert!(serde_json::from_value::<RpcRequestWrapper>(body).is_err());
        }
    }
}
