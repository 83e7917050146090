use std::{
    io,
    net::{SocketAddr, ToSocketAddrs},
};

use anyhow::{Context, Result};
use janus_networking::rpc::{RpcApiContext, clients::qtum::Client, server::start_api};

use crate::options::Options;

pub fn parse_socket_addr(addr: &str, port: &str) -> io::Result<SocketAddr> {
    // NOTE: this blocks until hostname can be resolved
    format!("{addr}:{port}")
        .to_socket_addrs()?
        .next()
        .ok_or(io::Error::new(
            io::ErrorKind::NotFound,
            "Failed to parse socket address",
        ))
}

pub fn get_http_socket_addr(opts: &Options) -> Result<SocketAddr> {
    parse_socket_addr(&opts.http_addr, &opts.http_port)
        .with_context(|| format!("Failed to parse http address {}:{}", opts.http_addr, opts.http_port))
}

/// Connects to the node and serves until Ctrl-C.
pub async fn init_rpc_api(opts: &Options) -> Result<()> {
    let client = Client::new(&opts.qtum_rpc, opts.debug).context("Invalid --qtum.rpc")?;
    let http_addr = get_http_socket_addr(opts)?;

    let context = RpcApiContext::new(client).with_debug(opts.debug);
    start_api(http_addr, context).await?;
    Ok(())
}
