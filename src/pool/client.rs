// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/client.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the TCP client for the upstream pool connection of the
// Graxil proxy, located in the pool subdirectory.
//
// Tree Location:
// - src/pool/client.rs (upstream TCP client)
// - Depends on: tokio, std

use crate::Result;
use log::debug;
use std::net::SocketAddr;
use tokio::net::{TcpStream, lookup_host};

const LOG_TARGET: &str = "graxil::proxy::pool::client";

/// Pool client for opening the upstream TCP connection
#[derive(Clone, Default)]
pub struct PoolClient;

impl PoolClient {
    pub fn new() -> Self {
        Self
    }

    /// Resolve pool address from either IP:port or domain:port format
    pub async fn resolve(pool_address: &str) -> Result<SocketAddr> {
        if let Ok(addr) = pool_address.parse::<SocketAddr>() {
            return Ok(addr);
        }

        let mut addrs = lookup_host(pool_address).await?;
        addrs
            .next()
            .ok_or_else(|| format!("No addresses found for {}", pool_address).into())
    }

    /// Connect to the pool (supports both IP and domain)
    pub async fn connect(&self, pool_address: &str) -> Result<TcpStream> {
        let resolved = Self::resolve(pool_address).await?;
        debug!(target: LOG_TARGET, "Resolved {} to {}", pool_address, resolved);
        let stream = TcpStream::connect(resolved).await?;
        stream.set_nodelay(true)?; // Disable Nagle's algorithm for low latency
        Ok(stream)
    }
}


// Changelog:
// - v1.0.0 (2026-10-16): Upstream client for the proxy.
//   - Single connect(&str) entry point with DNS fallback.
