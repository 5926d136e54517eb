// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/upstream.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file drives the upstream pool session of the proxy, located in the pool
// subdirectory. It subscribes and authorizes, then feeds every pool message
// into the shared job registry, reconnecting when the pool drops us.
//
// Tree Location:
// - src/pool/upstream.rs (upstream session)
// - Depends on: tokio, crate::jobs::registry, crate::pool

use crate::Result;
use crate::jobs::registry::SharedRegistry;
use crate::pool::client::PoolClient;
use crate::pool::messages::{PoolMessage, parse_pool_message};
use crate::pool::protocol::StratumProtocol;
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;

const LOG_TARGET: &str = "graxil::proxy::upstream";

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Upstream pool session feeding one job registry
pub struct UpstreamSession {
    registry: SharedRegistry,
    pool_client: PoolClient,
    pool_address: String,
    user: String,
    password: String,
}

impl UpstreamSession {
    pub fn new(registry: SharedRegistry, pool_address: String, user: String, password: String) -> Self {
        Self {
            registry,
            pool_client: PoolClient::new(),
            pool_address,
            user,
            password,
        }
    }

    pub fn registry(&self) -> SharedRegistry {
        SharedRegistry::clone(&self.registry)
    }

    /// Run forever, reconnecting after the pool closes the connection
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.run_connection().await {
                Ok(()) => info!(target: LOG_TARGET, "📡 Pool connection closed, reconnecting..."),
                Err(e) => error!(target: LOG_TARGET, "❌ Pool session failed: {}", e),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    async fn run_connection(&self) -> Result<()> {
        let stream = self.pool_client.connect(&self.pool_address).await?;
        info!(target: LOG_TARGET, "✅ Connected to pool {}", self.pool_address);

        let (reader, mut writer) = stream.into_split();
        self.login(&mut writer).await?;

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            self.handle_line(&line).await?;
        }
        Ok(())
    }

    async fn login(&self, writer: &mut OwnedWriteHalf) -> Result<()> {
        let requests = [
            StratumProtocol::create_subscribe_request(),
            StratumProtocol::create_authorize_request(&self.user, &self.password),
            StratumProtocol::create_extranonce_subscribe_request(),
        ];
        for request in requests {
            let message = StratumProtocol::to_message(request);
            if message.is_empty() {
                return Err("Failed to build login request".into());
            }
            writer.write_all(message.as_bytes()).await?;
        }
        writer.flush().await?;
        info!(target: LOG_TARGET, "📤 Sent subscribe and authorize for {}", self.user);
        Ok(())
    }

    /// Parse and apply one pool line; malformed lines are skipped
    pub async fn handle_line(&self, line: &str) -> Result<()> {
        debug!(target: LOG_TARGET, "📨 Raw pool message: {}", line);
        match parse_pool_message(line) {
            Ok(Some(message)) => self.apply(message).await,
            Ok(None) => Ok(()),
            Err(e) => {
                warn!(target: LOG_TARGET, "Skipping malformed pool message: {}", e);
                Ok(())
            }
        }
    }

    /// Apply a pool message to the registry.
    ///
    /// Registry errors only reject the message, a failed authorization ends the session.
    pub async fn apply(&self, message: PoolMessage) -> Result<()> {
        let mut registry = self.registry.write().await;
        let outcome = match message {
            PoolMessage::Subscribed { extranonce1, extranonce2_size }
            | PoolMessage::SetExtranonce { extranonce1, extranonce2_size } => {
                registry.set_extranonce(&extranonce1, extranonce2_size)
            }
            PoolMessage::SetDifficulty(difficulty) => registry.set_difficulty(difficulty),
            PoolMessage::Notify(broadcast) => registry.add_broadcast(&broadcast).map(|job| {
                info!(target: LOG_TARGET,
                    "📋 New job {} (clean: {}, difficulty: {})",
                    job.job_id,
                    broadcast.clean_jobs,
                    job.difficulty
                );
            }),
            PoolMessage::Authorized(true) => {
                info!(target: LOG_TARGET, "✅ Authorized as {}", self.user);
                Ok(())
            }
            PoolMessage::Authorized(false) => {
                return Err(format!("Pool rejected authorization for {}", self.user).into());
            }
            PoolMessage::Error { id, message } => {
                error!(target: LOG_TARGET, "❌ Pool error (id {:?}): {}", id, message);
                Ok(())
            }
            PoolMessage::Response { id, result } => {
                debug!(target: LOG_TARGET, "Response {}: {}", id, result);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            error!(target: LOG_TARGET, "❌ Rejected pool message: {}", e);
        }
        Ok(())
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Initial upstream session.
//   - Login sends subscribe, authorize and extranonce.subscribe in one flush.
//   - Pool messages go straight into the shared registry under its write lock.
