//! Limb-based unsigned integers.

use crate::error::KeyError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use tracing::debug;

/// Width of one limb in bytes.
pub const LIMB_BYTES: usize = 4;

/// Width of one limb in bits.
pub const LIMB_BITS: u64 = 32;

/// Unsigned integer stored as 32-bit limbs, least significant limb first.
///
/// The limb count always equals the length of the backing sequence. High
/// zero limbs are kept as given; use [`BigNumber::significant_limbs`] to
/// find how many carry value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BigNumber {
    limbs: Cow<'static, [u32]>,
}

impl BigNumber {
    /// Wrap a compiled-in limb array. The limb count is the array length.
    pub const fn from_static(limbs: &'static [u32]) -> Self {
        Self {
            limbs: Cow::Borrowed(limbs),
        }
    }

    /// Build from an owned limb sequence.
    pub fn from_limbs(limbs: Vec<u32>) -> Self {
        Self {
            limbs: Cow::Owned(limbs),
        }
    }

    /// Single-limb value.
    pub fn from_u32(value: u32) -> Self {
        Self::from_limbs(vec![value])
    }

    /// Limbs, least significant first.
    pub fn limbs(&self) -> &[u32] {
        &self.limbs
    }

    /// Number of limbs in use.
    pub fn top(&self) -> usize {
        self.limbs.len()
    }

    /// Limb at `index`, counting from the least significant.
    pub fn limb(&self, index: usize) -> Option<u32> {
        self.limbs.get(index).copied()
    }

    /// Number of limbs left after dropping zero high limbs.
    pub fn significant_limbs(&self) -> usize {
        self.limbs
            .iter()
            .rposition(|&limb| limb != 0)
            .map_or(0, |i| i + 1)
    }

    /// Position of the highest set bit, or 0 for zero.
    pub fn bits(&self) -> u64 {
        match self.significant_limbs() {
            0 => 0,
            n => {
                let high = self.limbs[n - 1];
                (n as u64 - 1) * LIMB_BITS + u64::from(u32::BITS - high.leading_zeros())
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.significant_limbs() == 0
    }

    /// Value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        match self.significant_limbs() {
            0 => Some(0),
            1 => Some(u64::from(self.limbs[0])),
            2 => Some(u64::from(self.limbs[0]) | (u64::from(self.limbs[1]) << LIMB_BITS)),
            _ => None,
        }
    }

    /// Encode in the fixed little-limb layout: each limb as four
    /// little-endian bytes, limb 0 first.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.limbs.iter().flat_map(|limb| limb.to_le_bytes()).collect()
    }

    /// Decode the layout produced by [`BigNumber::to_le_bytes`].
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() % LIMB_BYTES != 0 {
            debug!(len = bytes.len(), "rejecting misaligned limb data");
            return Err(KeyError::MisalignedLength(bytes.len()));
        }

        let limbs = bytes
            .chunks_exact(LIMB_BYTES)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self::from_limbs(limbs))
    }

    /// Big-endian magnitude over the full limb width (`4 * top()` bytes).
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.limbs
            .iter()
            .rev()
            .flat_map(|limb| limb.to_be_bytes())
            .collect()
    }
}

impl From<Vec<u32>> for BigNumber {
    fn from(limbs: Vec<u32>) -> Self {
        Self::from_limbs(limbs)
    }
}

impl From<u32> for BigNumber {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

/// Honours width, fill and the `#` (`0x`) flag.
///
/// A value with no limbs prints as `0` even though
/// [`BigNumber::to_be_bytes`] returns no bytes for it.
impl fmt::LowerHex for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.limbs.is_empty() {
            return f.pad_integral(true, "0x", "0");
        }
        f.pad_integral(true, "0x", &hex::encode(self.to_be_bytes()))
    }
}

/// Big-endian hex over the full limb width.
impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}
