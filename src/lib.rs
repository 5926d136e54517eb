// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/lib.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file serves as the main library entry point for the Graxil proxy,
// located at the root of the source tree. It exports all public modules
// and types that other crates or binaries can use.
//
// Tree Location:
// - src/lib.rs (root library file)
// - Exports modules: core, jobs, pool

pub mod core;
pub mod jobs;
pub mod pool;

// Re-export commonly used types at the crate root for convenience
pub use crate::jobs::{Job, JobBroadcast, JobRegistry, RegistryConfig, RegistryError, SharedRegistry};
pub use crate::pool::{PoolClient, UpstreamSession};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

// Changelog:
// - v1.0.0 (2026-10-16): Library root for the proxy.
//   - Exports the core, jobs and pool modules.
//   - Keeps the crate-wide boxed Result used by the pool and binary code.
