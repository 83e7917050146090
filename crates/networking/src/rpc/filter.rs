//! In-memory emulation of Ethereum's polling filters.
//!
//! Qtum has no filter primitive, so each filter remembers the last block
//! height it reported and a poll fetches whatever lies between that cursor
//! and the current tip.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use serde_json::Value;
use tokio::sync::Mutex;

use crate::rpc::{
    clients::qtum::QtumRpc,
    codec::add_hex_prefix,
    eth::logs::receipts_to_logs,
    utils::RpcErr,
};

pub type FilterId = u64;

/// Converts a block height into `searchlogs` terms, where negative values
/// mean the chain tip.
pub(crate) fn search_height(height: u64) -> Result<i64, RpcErr> {
    i64::try_from(height)
        .map_err(|_| RpcErr::InvalidEncoding(format!("block {height} out of range")))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogCriteria {
    /// Contract addresses, hex without `0x`. Empty matches every contract.
    pub addresses: Vec<String>,
    /// First block the filter covers.
    pub from_block: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Log(LogCriteria),
    Block,
    PendingTransaction,
}

#[derive(Debug)]
pub struct Filter {
    pub kind: FilterKind,
    /// Height of the last block already reported.
    pub cursor: u64,
}

#[derive(Default)]
struct FilterStoreInner {
    last_id: AtomicU64,
    filters: Mutex<HashMap<FilterId, Arc<Mutex<Filter>>>>,
}

/// Registry of installed filters, shared by every request.
///
/// The map lock only guards lookups. Each filter has its own lock, held
/// for a whole poll so that concurrent polls of one filter never report
/// the same block twice.
#[derive(Clone, Default)]
pub struct FilterStore {
    inner: Arc<FilterStoreInner>,
}

impl std::fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterStore")
            .field("last_id", &self.inner.last_id.load(Ordering::Relaxed))
            .finish()
    }
}

impl FilterStore {
    pub async fn create(&self, kind: FilterKind, cursor: u64) -> FilterId {
        let id = self.inner.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let filter = Arc::new(Mutex::new(Filter { kind, cursor }));
        self.inner.filters.lock().await.insert(id, filter);
        tracing::debug!(id, cursor, "Installed filter");
        id
    }

    pub async fn uninstall(&self, id: FilterId) -> bool {
        let removed = self.inner.filters.lock().await.remove(&id).is_some();
        tracing::debug!(id, removed, "Uninstall filter");
        removed
    }

    async fn get(&self, id: FilterId) -> Result<Arc<Mutex<Filter>>, RpcErr> {
        self.inner
            .filters
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(RpcErr::UnknownFilter)
    }

    /// Returns what happened since the previous poll: block hashes for a
    /// block filter, logs for a log filter.
    pub async fn poll<C: QtumRpc>(&self, id: FilterId, node: &C) -> Result<Value, RpcErr> {
        let filter = self.get(id).await?;
        let mut filter = filter.lock().await;

        if filter.kind == FilterKind::PendingTransaction {
            return Err(RpcErr::Unsupported(
                "pending transaction filters are not supported".to_owned(),
            ));
        }

        let current = node.get_block_count().await?;
        if current <= filter.cursor {
            return Ok(Value::Array(vec![]));
        }

        let changes = match &filter.kind {
            FilterKind::Block => {
                let mut hashes = Vec::with_capacity((current - filter.cursor) as usize);
                for height in filter.cursor + 1..=current {
                    let hash = node.get_block_hash(height).await?;
                    hashes.push(Value::String(add_hex_prefix(&hash)));
                }
                Value::Array(hashes)
            }
            FilterKind::Log(criteria) => {
                let from = search_height(filter.cursor.saturating_add(1))?;
                let receipts = node
                    .search_logs(from, search_height(current)?, &criteria.addresses)
                    .await?;
                serde_json::to_value(receipts_to_logs(&receipts))
                    .map_err(|error| RpcErr::Internal(error.to_string()))?
            }
            FilterKind::PendingTransaction => Value::Array(vec![]),
        };

        tracing::debug!(id, from = filter.cursor, to = current, "Advancing filter");
        filter.cursor = current;
        Ok(changes)
    }

    /// Every log a log filter matches, from its first block to the tip.
    /// The cursor is left untouched.
    pub async fn logs<C: QtumRpc>(&self, id: FilterId, node: &C) -> Result<Value, RpcErr> {
        let filter = self.get(id).await?;
        let filter = filter.lock().await;
        let FilterKind::Log(criteria) = &filter.kind else {
            return Err(RpcErr::InvalidRequest(format!(
                "filter {id:#x} is not a log filter"
            )));
        };
        let receipts = node
            .search_logs(search_height(criteria.from_block)?, -1, &criteria.addresses)
            .await?;
        serde_json::to_value(receipts_to_logs(&receipts))
            .map_err(|error| RpcErr::Internal(error.to_string()))
    }
}
