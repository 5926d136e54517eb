// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for the core functionality of the Graxil
// proxy, located in the core subdirectory. It declares submodules and re-exports
// key types for use throughout the project.

pub mod difficulty;
pub mod types;

// Re-export the most commonly used items
pub use difficulty::{U256, difficulty_to_target, target_to_hex};
pub use types::{Algorithm, Args, MerkleHash};

// Changelog:
// - v1.0.0 (2026-10-16): Proxy core.
//   - Dropped the hashing modules, kept difficulty and types.
