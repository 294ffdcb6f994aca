//! RSA public key type.

use crate::bignum::BigNumber;
use serde::{Deserialize, Serialize};

/// RSA public key as an exponent/modulus pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    /// Public exponent `e`
    exponent: BigNumber,

    /// Modulus `n`
    modulus: BigNumber,
}

impl PublicKey {
    pub const fn new(exponent: BigNumber, modulus: BigNumber) -> Self {
        Self { exponent, modulus }
    }

    pub fn exponent(&self) -> &BigNumber {
        &self.exponent
    }

    pub fn modulus(&self) -> &BigNumber {
        &self.modulus
    }

    /// Key size in bits, taken from the modulus.
    pub fn modulus_bits(&self) -> u64 {
        self.modulus.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let key = PublicKey::new(
            BigNumber::from_u32(3),
            BigNumber::from_limbs(vec![0, 0x8000_0000]),
        );

        assert_eq!(key.exponent().to_u64(), Some(3));
        assert_eq!(key.modulus().top(), 2);
        assert_eq!(key.modulus_bits(), 64);
    }

    #[test]
    fn test_public_key_serialization() {
        let key = PublicKey::new(BigNumber::from_u32(3), BigNumber::from_u32(33));

        let json = serde_json::to_string(&key).unwrap();
        assert!(json.contains("\"exponent\":{\"limbs\":[3]}"));
        assert!(json.contains("\"modulus\":{\"limbs\":[33]}"));
    }

    #[test]
    fn test_public_key_deserialization() {
        let json = r#"{
            "exponent": {"limbs": [65537]},
            "modulus": {"limbs": [1, 2, 3]}
        }"#;

        let key: PublicKey = serde_json::from_str(json).unwrap();
        assert_eq!(key.exponent().to_u64(), Some(65537));
        assert_eq!(key.modulus().limbs(), &[1, 2, 3]);
    }
}
