// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/types.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines core data structures for the Graxil proxy, located in the
// core subdirectory. It includes command-line arguments, the hashing algorithm
// selector and the fixed-width merkle hash used to resolve submitted shares.
//
// Tree Location:
// - src/core/types.rs (core data structures)
// - Depends on: clap, hex

use crate::jobs::error::RegistryError;
use clap::Parser;
use std::fmt;

/// Hashing algorithm of the upstream pool, selects the difficulty-1 target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Sha256,
    Scrypt,
}

/// Command-line arguments for the Graxil proxy
#[derive(Parser, Debug)]
#[command(
    name = "graxil-proxy",
    author = "Graxil Mining Team",
    version = "1.0.0",
    about = "Stratum mining proxy that multiplexes one upstream session across many miners",
    long_about = "Graxil Proxy connects to a Stratum V1 pool, tracks the jobs it broadcasts and\n\
                  carves the upstream extranonce2 space into per-miner slots.\n\n\
                  Examples:\n\
                    SHA-256 pool: graxil-proxy -o pool.example.com:3333 -u wallet.worker\n\
                    Scrypt pool:  graxil-proxy -o ltc.example.com:3333 -u wallet.worker --scrypt\n\
                    Blocknotify:  graxil-proxy -o pool.example.com:3333 -u wallet --blocknotify-cmd 'notify.sh %s'"
)]
pub struct Args {
    /// Upstream pool address in format hostname:port or ip:port
    #[arg(
        short = 'o',
        long = "pool",
        value_name = "HOST:PORT",
        help = "Upstream pool address (format: host:port)"
    )]
    pub pool: String,

    /// Pool username, usually wallet.worker
    #[arg(
        short = 'u',
        long = "user",
        value_name = "USER",
        help = "Pool username (e.g., wallet.worker)"
    )]
    pub user: String,

    /// Pool password (often 'x' for no password)
    #[arg(
        short = 'p',
        long = "password",
        value_name = "PASSWORD",
        default_value = "x",
        help = "Pool password (usually 'x')"
    )]
    pub password: String,

    /// Use the scrypt difficulty-1 target instead of the SHA-256 one
    #[arg(
        long,
        default_value = "false",
        help = "Calculate targets for scrypt pools"
    )]
    pub scrypt: bool,

    /// Command executed on every new block, `%s` is replaced by the previous block hash
    #[arg(
        long = "blocknotify-cmd",
        value_name = "COMMAND",
        help = "Command to run on new block (%s = prev hash)"
    )]
    pub blocknotify_cmd: Option<String>,

    /// Log level used when no log config file is given
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        help = "Log level [error, warn, info, debug, trace]"
    )]
    pub log_level: String,

    /// Optional log4rs configuration file (YAML or TOML)
    #[arg(
        long = "log-config",
        value_name = "PATH",
        help = "Path to a log4rs config file"
    )]
    pub log_config: Option<std::path::PathBuf>,
}

impl Args {
    /// Validate arguments and return helpful errors
    pub fn validate(&self) -> Result<(), String> {
        if !self.pool.contains(':') {
            return Err("Pool address must be in format HOST:PORT (e.g., pool.example.com:3333)".to_string());
        }
        let parts: Vec<&str> = self.pool.rsplitn(2, ':').collect();
        if parts[0].parse::<u16>().is_err() {
            return Err("Pool port must be a valid number (1-65535)".to_string());
        }
        if self.user.is_empty() {
            return Err("Pool username is required. Use --user WALLET.WORKER".to_string());
        }
        if let Some(ref cmd) = self.blocknotify_cmd {
            if !cmd.contains("%s") {
                return Err("Blocknotify command must contain a %s placeholder for the block hash".to_string());
            }
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(format!("Unknown log level: {}", self.log_level));
        }
        Ok(())
    }

    /// Algorithm selected by the command line flags
    pub fn algorithm(&self) -> Algorithm {
        if self.scrypt { Algorithm::Scrypt } else { Algorithm::Sha256 }
    }
}

/// Merkle root of a block header, in the byte order it appears in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MerkleHash(pub [u8; 32]);

impl MerkleHash {
    /// Decode a 64 character hex string (case-insensitive)
    pub fn from_hex(hex_str: &str) -> Result<Self, RegistryError> {
        let bytes = hex::decode(hex_str).map_err(|source| RegistryError::InvalidHex {
            field: "merkle_hash",
            source,
        })?;
        let hash: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| RegistryError::InvalidHashLength {
                field: "merkle_hash",
                len: bytes.len(),
            })?;
        Ok(Self(hash))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for MerkleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pool: &str, cmd: Option<&str>) -> Args {
        Args {
            pool: pool.to_string(),
            user: "wallet.rig01".to_string(),
            password: "x".to_string(),
            scrypt: false,
            blocknotify_cmd: cmd.map(str::to_string),
            log_level: "info".to_string(),
            log_config: None,
        }
    }

    #[test]
    fn test_args_validate() {
        assert!(args("pool.example.com:3333", None).validate().is_ok());
        assert!(args("pool.example.com", None).validate().is_err());
        assert!(args("pool.example.com:port", None).validate().is_err());
        assert!(args("pool.example.com:3333", Some("notify.sh")).validate().is_err());
        assert!(args("pool.example.com:3333", Some("notify.sh %s")).validate().is_ok());
    }

    #[test]
    fn test_merkle_hash_hex_boundary() {
        let upper = "AB".repeat(32);
        let hash = MerkleHash::from_hex(&upper).unwrap();
        assert_eq!(hash.to_hex(), "ab".repeat(32));
        assert!(matches!(
            MerkleHash::from_hex("abcd"),
            Err(RegistryError::InvalidHashLength { len: 2, .. })
        ));
        assert!(matches!(
            MerkleHash::from_hex(&"zz".repeat(32)),
            Err(RegistryError::InvalidHex { .. })
        ));
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Proxy types.
//   - Replaced miner arguments with pool, user, scrypt, blocknotify and logging options.
//   - Algorithm now selects between the SHA-256 and scrypt difficulty-1 bases.
//   - Added MerkleHash so header hex is converted to fixed-width bytes at the boundary.
