// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/tail.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the extranonce tail allocator, located in the jobs
// subdirectory. A tail is a 1 or 2 byte prefix of the upstream extranonce2
// that gives each downstream miner its own slice of the nonce space, which
// limits the proxy to 65535 connected miners per upstream session.
//
// Tree Location:
// - src/jobs/tail.rs (tail allocator)
// - Depends on: hex, log

use crate::jobs::error::RegistryError;
use log::{debug, warn};
use std::collections::HashSet;
use std::fmt;

const LOG_TARGET: &str = "graxil::proxy::tail";

/// Number of distinct tails (zero is reserved for non-multiplexed connections)
pub const TAIL_SLOTS: usize = 0xFFFF;

/// Non-zero downstream tail identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tail(u16);

impl Tail {
    pub fn new(value: u16) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Encoded width in bytes: 1 for 1..=255, 2 above
    pub fn width(&self) -> usize {
        if self.0 <= 0xFF { 1 } else { 2 }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        if self.width() == 1 {
            vec![self.0 as u8]
        } else {
            self.0.to_be_bytes().to_vec()
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decode a tail, rejecting zero and non-canonical widths
    pub fn from_hex(tail_hex: &str) -> Result<Self, RegistryError> {
        let invalid = || RegistryError::InvalidTail(tail_hex.to_string());
        let bytes = hex::decode(tail_hex).map_err(|_| invalid())?;
        let value = match bytes.as_slice() {
            [b] => *b as u16,
            [hi, lo] if *hi != 0 => u16::from_be_bytes([*hi, *lo]),
            _ => return Err(invalid()),
        };
        Self::new(value).ok_or_else(invalid)
    }
}

impl fmt::Display for Tail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Round-robin allocator over the 65535 tail slots
#[derive(Debug, Default)]
pub struct TailAllocator {
    issued: HashSet<Tail>,
    cursor: u16,
}

impl TailAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next free tail no wider than `max_width` bytes.
    ///
    /// Probing continues from where the previous call stopped and visits every
    /// slot at most once.
    pub fn acquire(&mut self, max_width: usize) -> Result<Tail, RegistryError> {
        if max_width == 0 {
            return Err(RegistryError::Extranonce2TooSmall { size: 0, tail_width: 1 });
        }

        for _ in 0..TAIL_SLOTS {
            self.cursor = self.cursor.wrapping_add(1);
            if self.cursor == 0 {
                self.cursor = 1;
            }

            let tail = Tail(self.cursor);
            if tail.width() > max_width {
                continue;
            }
            if self.issued.insert(tail) {
                debug!(target: LOG_TARGET, "Issued tail {} ({} in use)", tail, self.issued.len());
                return Ok(tail);
            }
        }

        Err(RegistryError::TailsExhausted)
    }

    /// Return a tail to the pool; returns false if it was not issued
    pub fn release(&mut self, tail: Tail) -> bool {
        if self.issued.remove(&tail) {
            debug!(target: LOG_TARGET, "Released tail {} ({} in use)", tail, self.issued.len());
            true
        } else {
            warn!(target: LOG_TARGET, "Given extranonce tail {} is not registered", tail);
            false
        }
    }

    pub fn is_issued(&self, tail: Tail) -> bool {
        self.issued.contains(&tail)
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}


// Changelog:
// - v1.0.0 (2026-10-16): Initial tail allocator.
//   - Round-robin cursor over 1..=65535, zero reserved.
//   - Releasing an unknown tail only logs a warning.
