// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/difficulty.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file converts pool share difficulty into a 256-bit share target,
// located in the core subdirectory of the Graxil proxy source tree. It
// supports the SHA-256 and scrypt difficulty-1 bases with exact integer
// arithmetic for fractional difficulties.

use crate::core::types::Algorithm;
use crate::jobs::error::RegistryError;
use log::{debug, warn};
use uint::construct_uint;

const LOG_TARGET: &str = "graxil::proxy::difficulty";

construct_uint! {
    pub struct U256(4);
}

construct_uint! {
    /// Wide intermediate for dividing by fractional difficulties
    pub struct U512(8);
}

/// SHA-256 difficulty 1 target (0x00000000ffff0000...)
const SHA256_DIFF1: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Scrypt difficulty 1 target (0x0000ffff0000...)
const SCRYPT_DIFF1: [u8; 32] = [
    0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Difficulty 1 target for the given algorithm
pub fn diff1_target(algo: Algorithm) -> U256 {
    match algo {
        Algorithm::Sha256 => U256::from_big_endian(&SHA256_DIFF1),
        Algorithm::Scrypt => U256::from_big_endian(&SCRYPT_DIFF1),
    }
}

/// Convert a share difficulty into the target `floor(diff1 / difficulty)`.
///
/// The float is expanded into `mantissa * 2^exponent` so the division is done
/// on integers and is exact for every finite positive difficulty. Targets that
/// do not fit in 256 bits saturate to `U256::MAX`.
pub fn difficulty_to_target(difficulty: f64, algo: Algorithm) -> Result<U256, RegistryError> {
    if !difficulty.is_finite() || difficulty <= 0.0 {
        return Err(RegistryError::InvalidDifficulty(difficulty));
    }

    let base = widen(diff1_target(algo));
    let (mantissa, exponent) = decompose(difficulty);

    let quotient = if exponent >= 0 {
        let shift = exponent as u32;
        if shift >= 256 {
            U512::zero()
        } else {
            base / (U512::from(mantissa) << shift)
        }
    } else {
        let shift = exponent.unsigned_abs();
        if shift > 256 {
            U512::MAX
        } else {
            (base << shift) / U512::from(mantissa)
        }
    };

    let target = match narrow(quotient) {
        Some(target) => target,
        None => {
            warn!(target: LOG_TARGET,
                "Difficulty {} gives a target wider than 256 bits, saturating",
                difficulty
            );
            U256::MAX
        }
    };
    debug!(target: LOG_TARGET, "Difficulty {} -> target: {}", difficulty, target_to_hex(&target));
    Ok(target)
}

/// Render a target as 64 lowercase hex characters, big-endian
pub fn target_to_hex(target: &U256) -> String {
    hex::encode(target.to_big_endian())
}

/// Split a positive finite f64 into (mantissa, exponent) with value = mantissa * 2^exponent
fn decompose(value: f64) -> (u64, i32) {
    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7FF) as i32;
    let fraction = bits & 0x000F_FFFF_FFFF_FFFF;
    if exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exponent - 1075)
    }
}

fn widen(value: U256) -> U512 {
    let U256(limbs) = value;
    U512([limbs[0], limbs[1], limbs[2], limbs[3], 0, 0, 0, 0])
}

fn narrow(value: U512) -> Option<U256> {
    if value.bits() > 256 {
        return None;
    }
    let U512(limbs) = value;
    Some(U256([limbs[0], limbs[1], limbs[2], limbs[3]]))
}


// Changelog:
// - v1.0.0 (2026-10-16): Share target conversion for the proxy.
//   - difficulty_to_target now returns floor(diff1 / difficulty) exactly using a
//     512-bit intermediate instead of scaling the difficulty by 1e6.
//   - Added the scrypt difficulty-1 base next to the SHA-256 one.
//   - Zero, negative and non-finite difficulties are rejected instead of clamped.
//   - Removed hash difficulty helpers; share validation lives upstream.
