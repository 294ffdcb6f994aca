//! Read-only registry of trusted public keys.

use crate::error::KeyError;
use crate::key::PublicKey;
use crate::keys;
use std::fmt;
use std::slice;
use tracing::debug;

/// The compiled-in trusted keys.
pub static TRUSTED_KEYS: KeyRegistry = KeyRegistry::new(&keys::TRUSTED);

/// Get the compiled-in registry.
pub fn trusted_keys() -> &'static KeyRegistry {
    &TRUSTED_KEYS
}

/// Fixed, ordered set of trusted keys.
///
/// Built from constant data and never mutated, so it can be shared across
/// threads without locking.
#[derive(Debug, Clone, Copy)]
pub struct KeyRegistry {
    keys: &'static [PublicKey],
}

impl KeyRegistry {
    pub const fn new(keys: &'static [PublicKey]) -> Self {
        Self { keys }
    }

    /// Number of keys in the registry.
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Get the key at `index` in insertion order.
    ///
    /// Any integer type is accepted; negative or out-of-range indices
    /// return [`KeyError::NotFound`].
    pub fn get<I>(&self, index: I) -> Result<&'static PublicKey, KeyError>
    where
        I: TryInto<usize> + fmt::Display + Copy,
    {
        let keys = self.keys;
        index
            .try_into()
            .ok()
            .and_then(|i| keys.get(i))
            .ok_or_else(|| {
                debug!(index = %index, count = keys.len(), "trusted key lookup out of range");
                KeyError::NotFound(index.to_string())
            })
    }

    /// Iterate over all keys in insertion order.
    ///
    /// Each call starts again from the first key.
    pub fn all(&self) -> slice::Iter<'static, PublicKey> {
        self.keys.iter()
    }
}

impl IntoIterator for &KeyRegistry {
    type Item = &'static PublicKey;
    type IntoIter = slice::Iter<'static, PublicKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bignum::BigNumber;

    static SMALL: [u32; 1] = [3];
    static MOD_A: [u32; 2] = [0x0000_0021, 0x8000_0000];
    static MOD_B: [u32; 2] = [0x0000_0023, 0xc000_0000];

    static NO_KEYS: [PublicKey; 0] = [];

    static TWO_KEYS: [PublicKey; 2] = [
        PublicKey::new(BigNumber::from_static(&SMALL), BigNumber::from_static(&MOD_A)),
        PublicKey::new(BigNumber::from_static(&SMALL), BigNumber::from_static(&MOD_B)),
    ];

    #[test]
    fn test_count_and_order() {
        let registry = KeyRegistry::new(&TWO_KEYS);

        assert_eq!(registry.count(), 2);
        assert!(!registry.is_empty());
        assert_eq!(registry.get(0).unwrap().modulus().limbs(), &MOD_A);
        assert_eq!(registry.get(1usize).unwrap().modulus().limbs(), &MOD_B);
    }

    #[test]
    fn test_get_out_of_range() {
        let registry = KeyRegistry::new(&TWO_KEYS);

        assert_eq!(registry.get(2), Err(KeyError::NotFound("2".into())));
        assert_eq!(registry.get(-1), Err(KeyError::NotFound("-1".into())));
        assert!(matches!(registry.get(i64::MIN), Err(KeyError::NotFound(_))));
        assert!(matches!(registry.get(usize::MAX), Err(KeyError::NotFound(_))));
    }

    #[test]
    fn test_empty_registry() {
        let registry = KeyRegistry::new(&NO_KEYS);

        assert_eq!(registry.count(), 0);
        assert!(registry.is_empty());
        assert!(registry.get(0).is_err());
        assert_eq!(registry.all().count(), 0);
    }

    #[test]
    fn test_all_is_restartable() {
        let registry = KeyRegistry::new(&TWO_KEYS);

        let first: Vec<_> = registry.all().collect();
        let second: Vec<_> = registry.all().collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_into_iterator() {
        let registry = KeyRegistry::new(&TWO_KEYS);

        let mut seen = 0;
        for key in &registry {
            assert_eq!(key.exponent().to_u64(), Some(3));
            seen += 1;
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_trusted_keys_is_the_static() {
        assert!(std::ptr::eq(trusted_keys(), &TRUSTED_KEYS));
        assert_eq!(trusted_keys().count(), 1);
    }

    #[test]
    fn test_error_message() {
        let err = trusted_keys().get(5).unwrap_err();
        assert_eq!(err.to_string(), "Trusted key not found: index 5");
    }
}
