// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for the job state of the Graxil proxy,
// located in the jobs subdirectory. It declares submodules and re-exports key
// types for use throughout the project.
//
// Tree Location:
// - src/jobs/mod.rs (jobs module entry point)
// - Submodules: error, extranonce, hook, job, notify, registry, tail

pub mod error;
pub mod extranonce;
pub mod hook;
pub mod job;
pub mod notify;
pub mod registry;
pub mod tail;

// Re-export the most commonly used items
pub use error::RegistryError;
pub use job::{Job, JobBroadcast};
pub use notify::{BlockChange, CleanJobSubscription};
pub use registry::{JobRegistry, MerkleResolution, RegistryConfig, SharedRegistry};
pub use tail::Tail;

// Changelog:
// - v1.0.0 (2026-10-16): Initial jobs module.
//   - Groups the registry with its job, tail, extranonce, notify and hook parts.
