// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for the upstream pool communication of
// the Graxil proxy, located in the pool subdirectory. It declares submodules
// and re-exports key types for use throughout the project.
//
// Tree Location:
// - src/pool/mod.rs (pool module entry point)
// - Submodules: client, messages, protocol, upstream

pub mod client;
pub mod messages;
pub mod protocol;
pub mod upstream;

// Re-export key types for convenience
pub use client::PoolClient;
pub use messages::{PoolMessage, parse_pool_message};
pub use upstream::UpstreamSession;

// Changelog:
// - v1.0.0 (2026-10-16): Pool module for the proxy.
//   - Added the upstream session that feeds the job registry.
