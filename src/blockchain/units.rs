//! Denomination helpers.
//!
//! Amounts are scaled with `U256` arithmetic; no floating point is involved.

use alloy::primitives::U256;

/// Exponent of the base unit (wei).
pub const WEI: u8 = 0;
/// Babbage.
pub const KWEI: u8 = 3;
/// Lovelace.
pub const MWEI: u8 = 6;
/// Shannon.
pub const GWEI: u8 = 9;
/// Szabo.
pub const MICRO_ETHER: u8 = 12;
/// Finney.
pub const MILLI_ETHER: u8 = 15;
/// One whole coin.
pub const ETHER: u8 = 18;

/// `amount * 10^exponent`, or `None` when the result does not fit in 256 bits.
pub fn to_smallest_unit(amount: u64, exponent: u8) -> Option<U256> {
    let scale = U256::from(10u8).checked_pow(U256::from(exponent))?;
    U256::from(amount).checked_mul(scale)
}

// Named exponents are at most 18: 10^18 fits in a u64 and the product in 128 bits.
fn scaled(amount: u64, exponent: u8) -> U256 {
    U256::from(amount) * U256::from(10u64.pow(u32::from(exponent)))
}

pub fn wei(amount: u64) -> U256 {
    scaled(amount, WEI)
}

pub fn kwei(amount: u64) -> U256 {
    scaled(amount, KWEI)
}

pub fn mwei(amount: u64) -> U256 {
    scaled(amount, MWEI)
}

pub fn gwei(amount: u64) -> U256 {
    scaled(amount, GWEI)
}

pub fn micro_ether(amount: u64) -> U256 {
    scaled(amount, MICRO_ETHER)
}

pub fn milli_ether(amount: u64) -> U256 {
    scaled(amount, MILLI_ETHER)
}

pub fn ether(amount: u64) -> U256 {
    scaled(amount, ETHER)
}
