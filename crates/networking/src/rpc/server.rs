use crate::rpc::{
    RpcApiContext, RpcHandler, RpcRequestWrapper,
    clients::qtum::{Client, QtumRpc},
    eth::{
        account::{AccountsRequest, GetBalanceRequest, GetCodeRequest, GetTransactionCountRequest},
        block::{BlockNumberRequest, GetBlockByNumberRequest},
        call::{CallRequest, EstimateGasRequest},
        filter::{
            GetFilterChangesRequest, GetFilterLogsRequest, NewBlockFilterRequest,
            NewFilterRequest, NewPendingTransactionFilterRequest, UninstallFilterRequest,
        },
        logs::GetLogsRequest,
        transaction::{
            GetTransactionByHashRequest, GetTransactionReceiptRequest, SendTransactionRequest,
        },
    },
    net::NetVersionRequest,
    utils::{RpcErr, RpcNamespace, RpcRequest, RpcRequestId, rpc_response},
    web3::ClientVersionRequest,
};
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use futures::future::join_all;
use serde_json::{Map, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

/// JSON-RPC over `POST /`, shared by every request through `context`.
pub fn router(context: RpcApiContext<Client>) -> Router {
    // All request headers allowed.
    // All methods allowed.
    // All origins allowed.
    // All headers exposed.
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", post(handle_http_request))
        .layer(cors)
        .with_state(context)
}

pub async fn start_api(http_addr: SocketAddr, context: RpcApiContext<Client>) -> Result<(), RpcErr> {
    let http_router = router(context);
    let http_listener = TcpListener::bind(http_addr)
        .await
        .map_err(|error| RpcErr::Internal(error.to_string()))?;
    info!("Starting HTTP server at {http_addr}");

    axum::serve(http_listener, http_router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|error| RpcErr::Internal(error.to_string()))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for Ctrl-C");
        // Without a signal handler there is nothing to wait on.
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl-C, shutting down");
}

async fn handle_http_request(
    State(service_context): State<RpcApiContext<Client>>,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    let res = handle_body(&body, service_context)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(res))
}

/// Answers a raw request body: one envelope for a single request, an array
/// of envelopes in input order for a batch.
pub async fn handle_body<C: QtumRpc>(
    body: &str,
    context: RpcApiContext<C>,
) -> Result<Value, RpcErr> {
    let debug = context.debug;
    if debug {
        tracing::debug!(%body, "=> rpc request");
    }
    let res = match serde_json::from_str::<RpcRequestWrapper>(body) {
        Ok(RpcRequestWrapper::Single(request)) => handle_entry(request, context).await?,
        Ok(RpcRequestWrapper::Multiple(requests)) if requests.is_empty() => rpc_response(
            RpcRequestId::Null,
            Err(RpcErr::MalformedRequest("empty batch".to_owned())),
        )?,
        Ok(RpcRequestWrapper::Multiple(requests)) => {
            let responses = join_all(requests.into_iter().map(|entry| {
                let context = context.clone();
                async move {
                    match entry {
                        Value::Object(request) => handle_entry(request, context).await,
                        other => rpc_response(
                            RpcRequestId::Null,
                            Err(RpcErr::MalformedRequest(format!("not an object: {other}"))),
                        ),
                    }
                }
            }))
            .await;
            Value::Array(responses.into_iter().collect::<Result<_, _>>()?)
        }
        Err(error) => rpc_response(RpcRequestId::Null, Err(RpcErr::ParseError(error.to_string())))?,
    };
    if debug {
        tracing::debug!(response = %res, "<= rpc response");
    }
    Ok(res)
}

async fn handle_entry<C: QtumRpc>(
    entry: Map<String, Value>,
    context: RpcApiContext<C>,
) -> Result<Value, RpcErr> {
    let entry = Value::Object(entry);
    match serde_json::from_value::<RpcRequest>(entry.clone()) {
        Ok(request) => {
            let res = map_http_requests(&request, context).await;
            if let Err(error) = &res {
                tracing::debug!(method = %request.method, %error, "Request failed");
            }
            rpc_response(request.id, res)
        }
        Err(error) => rpc_response(
            RpcRequestId::from_raw(&entry),
            Err(RpcErr::MalformedRequest(error.to_string())),
        ),
    }
}

pub async fn map_http_requests<C: QtumRpc>(
    req: &RpcRequest,
    context: RpcApiContext<C>,
) -> Result<Value, RpcErr> {
    match req.namespace() {
        Ok(RpcNamespace::Eth) => map_eth_requests(req, context).await,
        Ok(RpcNamespace::Net) => map_net_requests(req, context).await,
        Ok(RpcNamespace::Web3) => map_web3_requests(req, context).await,
        Ok(RpcNamespace::Personal) => map_personal_requests(req),
        Err(rpc_err) => Err(rpc_err),
    }
}

pub async fn map_eth_requests<C: QtumRpc>(
    req: &RpcRequest,
    context: RpcApiContext<C>,
) -> Result<Value, RpcErr> {
    match req.method.as_str() {
        "eth_accounts" => AccountsRequest::call(req, context).await,
        "eth_blockNumber" => BlockNumberRequest::call(req, context).await,
        "eth_call" => CallRequest::call(req, context).await,
        "eth_estimateGas" => EstimateGasRequest::call(req, context).await,
        "eth_getBalance" => GetBalanceRequest::call(req, context).await,
        "eth_getBlockByNumber" => GetBlockByNumberRequest::call(req, context).await,
        "eth_getCode" => GetCodeRequest::call(req, context).await,
        "eth_getFilterChanges" => GetFilterChangesRequest::call(req, context).await,
        "eth_getFilterLogs" => GetFilterLogsRequest::call(req, context).await,
        "eth_getLogs" => GetLogsRequest::call(req, context).await,
        "eth_getTransactionByHash" => GetTransactionByHashRequest::call(req, context).await,
        "eth_getTransactionCount" => GetTransactionCountRequest::call(req, context).await,
        "eth_getTransactionReceipt" => GetTransactionReceiptRequest::call(req, context).await,
        "eth_newBlockFilter" => NewBlockFilterRequest::call(req, context).await,
        "eth_newFilter" => NewFilterRequest::call(req, context).await,
        "eth_newPendingTransactionFilter" => {
            NewPendingTransactionFilterRequest::call(req, context).await
        }
        "eth_sendTransaction" => SendTransactionRequest::call(req, context).await,
        "eth_uninstallFilter" => UninstallFilterRequest::call(req, context).await,
        unknown => Err(RpcErr::MethodNotFound(unknown.to_owned())),
    }
}

pub async fn map_net_requests<C: QtumRpc>(
    req: &RpcRequest,
    context: RpcApiContext<C>,
) -> Result<Value, RpcErr> {
    match req.method.as_str() {
        "net_version" => NetVersionRequest::call(req, context).await,
        unknown => Err(RpcErr::MethodNotFound(unknown.to_owned())),
    }
}

pub async fn map_web3_requests<C: QtumRpc>(
    req: &RpcRequest,
    context: RpcApiContext<C>,
) -> Result<Value, RpcErr> {
    match req.method.as_str() {
        "web3_clientVersion" => ClientVersionRequest::call(req, context).await,
        unknown => Err(RpcErr::MethodNotFound(unknown.to_owned())),
    }
}

/// The node's wallet signs with its own keys; unlocking is a no-op.
pub fn map_personal_requests(req: &RpcRequest) -> Result<Value, RpcErr> {
    match req.method.as_str() {
        "personal_unlockAccount" => Ok(Value::Bool(true)),
        unknown => Err(RpcErr::MethodNotFound(unknown.to_owned())),
    }
}
