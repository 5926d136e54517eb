// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/job.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines the upstream job template and its construction from a
// pool broadcast, located in the jobs subdirectory. Every hex field is decoded
// to fixed-width binary here so nothing downstream carries pool hex around.
//
// Tree Location:
// - src/jobs/job.rs (job template)
// - Depends on: hex, serde, crate::core::types

use crate::core::types::MerkleHash;
use crate::jobs::error::RegistryError;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Raw job fields of a pool `mining.notify` broadcast.
///
/// Field order matches the notify params array, so the array deserializes
/// straight into this struct. Callers cut any params past `clean_jobs` first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobBroadcast {
    /// Session-unique job identifier from the pool
    pub job_id: String,

    /// Previous block hash (hex)
    pub prev_hash: String,

    /// Coinbase transaction before the extranonce (hex)
    pub coinb1: String,

    /// Coinbase transaction after the extranonce (hex)
    pub coinb2: String,

    /// Merkle branch hashes (hex, 32 bytes each), order is the proof path
    pub merkle_branch: Vec<String>,

    /// Block version (8 hex chars)
    pub version: String,

    /// Compact difficulty bits (8 hex chars)
    pub nbits: String,

    /// Pool time (hex)
    pub ntime: String,

    /// Drop all previous jobs when set
    #[serde(default)]
    pub clean_jobs: bool,
}

/// One upstream work template and the merkle resolutions issued against it
#[derive(Debug)]
pub struct Job {
    pub job_id: String,
    pub prev_hash: String,
    pub coinbase_part1: Vec<u8>,
    pub coinbase_part2: Vec<u8>,
    pub merkle_branch: Vec<[u8; 32]>,
    pub version: u32,
    pub nbits: u32,
    /// Pool time minus local time at receipt, in seconds
    pub ntime_offset: i64,
    pub difficulty: f64,
    extranonce2: AtomicU32,
    resolutions: Mutex<HashMap<MerkleHash, u32>>,
}

impl Job {
    /// Build a job from a pool broadcast using the local clock
    pub fn build_from_broadcast(broadcast: &JobBroadcast, difficulty: f64) -> Result<Self, RegistryError> {
        Self::build_from_broadcast_at(broadcast, difficulty, unix_now())
    }

    /// Build a job from a pool broadcast received at `now` (unix seconds)
    pub fn build_from_broadcast_at(
        broadcast: &JobBroadcast,
        difficulty: f64,
        now: i64,
    ) -> Result<Self, RegistryError> {
        // prev_hash stays as text but may end up in the blocknotify command line
        decode_hex("prev_hash", &broadcast.prev_hash)?;

        let coinbase_part1 = decode_hex("coinb1", &broadcast.coinb1)?;
        let coinbase_part2 = decode_hex("coinb2", &broadcast.coinb2)?;
        let merkle_branch = broadcast
            .merkle_branch
            .iter()
            .map(|hash| decode_hash("merkle_branch", hash))
            .collect::<Result<Vec<_>, _>>()?;
        let version = parse_u32_hex("version", &broadcast.version)?;
        let nbits = parse_u32_hex("nbits", &broadcast.nbits)?;
        let ntime = parse_ntime(&broadcast.ntime)?;

        Ok(Self {
            job_id: broadcast.job_id.clone(),
            prev_hash: broadcast.prev_hash.clone(),
            coinbase_part1,
            coinbase_part2,
            merkle_branch,
            version,
            nbits,
            ntime_offset: ntime - now,
            difficulty,
            extranonce2: AtomicU32::new(0),
            resolutions: Mutex::new(HashMap::new()),
        })
    }

    /// Pool time corresponding to the local time `now`
    pub fn ntime_at(&self, now: i64) -> u32 {
        (now + self.ntime_offset).clamp(0, u32::MAX as i64) as u32
    }

    /// Live pool time
    pub fn current_ntime(&self) -> u32 {
        self.ntime_at(unix_now())
    }

    pub fn ntime_hex_at(&self, now: i64) -> String {
        format!("{:08x}", self.ntime_at(now))
    }

    pub fn version_hex(&self) -> String {
        format!("{:08x}", self.version)
    }

    pub fn nbits_hex(&self) -> String {
        format!("{:08x}", self.nbits)
    }

    /// Next extranonce2 for work generated directly from this job
    pub fn increase_extranonce2(&self) -> u32 {
        self.extranonce2.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Extranonce2 that produced `merkle_hash` on this job
    pub fn resolution(&self, merkle_hash: &MerkleHash) -> Option<u32> {
        self.lock_resolutions().get(merkle_hash).copied()
    }

    pub fn resolution_count(&self) -> usize {
        self.lock_resolutions().len()
    }

    pub(crate) fn record_resolution(&self, merkle_hash: MerkleHash, extranonce2: u32) {
        self.lock_resolutions().insert(merkle_hash, extranonce2);
    }

    pub(crate) fn resolution_hashes(&self) -> Vec<MerkleHash> {
        self.lock_resolutions().keys().copied().collect()
    }

    fn lock_resolutions(&self) -> std::sync::MutexGuard<'_, HashMap<MerkleHash, u32>> {
        self.resolutions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Current unix time in seconds
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, RegistryError> {
    hex::decode(value).map_err(|source| RegistryError::InvalidHex { field, source })
}

fn decode_hash(field: &'static str, value: &str) -> Result<[u8; 32], RegistryError> {
    let bytes = decode_hex(field, value)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| RegistryError::InvalidHashLength { field, len: bytes.len() })
}

fn parse_u32_hex(field: &'static str, value: &str) -> Result<u32, RegistryError> {
    if value.len() != 8 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RegistryError::InvalidNumber { field, value: value.to_string() });
    }
    u32::from_str_radix(value, 16)
        .map_err(|_| RegistryError::InvalidNumber { field, value: value.to_string() })
}

fn parse_ntime(value: &str) -> Result<i64, RegistryError> {
    if value.is_empty() || value.len() > 15 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RegistryError::InvalidNumber { field: "ntime", value: value.to_string() });
    }
    i64::from_str_radix(value, 16)
        .map_err(|_| RegistryError::InvalidNumber { field: "ntime", value: value.to_string() })
}


// Changelog:
// - v1.0.0 (2026-10-16): Initial job template.
//   - JobBroadcast deserializes directly from mining.notify params.
//   - build_from_broadcast decodes every hex field and fails before creating a job.
//   - Jobs keep their merkle resolutions so the registry can prune them on eviction.
