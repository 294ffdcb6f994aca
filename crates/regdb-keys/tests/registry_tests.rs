//! Integration tests for the trusted key registry.

use regdb_keys::{trusted_keys, BigNumber, KeyError, PublicKey, TRUSTED_KEYS};
use std::thread;

/// Lookup helper for the only compiled-in key.
fn first_key() -> &'static PublicKey {
    trusted_keys().get(0).expect("registry holds one key")
}

#[test]
fn test_count() {
    assert_eq!(TRUSTED_KEYS.count(), 1);
    assert!(!TRUSTED_KEYS.is_empty());
}

#[test]
fn test_exponent_is_f4() {
    let e = first_key().exponent();

    assert_eq!(e.top(), 1);
    assert_eq!(e.limbs(), &[0x00010001]);
}

#[test]
fn test_modulus_limbs() {
    let n = first_key().modulus();

    assert_eq!(n.top(), 64);
    assert_eq!(n.limbs().first(), Some(&0x16a0d8e1));
    assert_eq!(n.limbs().last(), Some(&0xd6579971));
}

#[test]
fn test_get_out_of_range() {
    assert!(matches!(TRUSTED_KEYS.get(1), Err(KeyError::NotFound(_))));
    assert!(matches!(TRUSTED_KEYS.get(-1), Err(KeyError::NotFound(_))));
    assert!(matches!(TRUSTED_KEYS.get(u64::MAX), Err(KeyError::NotFound(_))));
}

#[test]
fn test_all_twice_yields_same_keys() {
    let first: Vec<&PublicKey> = TRUSTED_KEYS.all().collect();
    let second: Vec<&PublicKey> = TRUSTED_KEYS.all().collect();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    assert!(std::ptr::eq(first[0], first_key()));
}

#[test]
fn test_exponent_byte_round_trip() {
    let e = first_key().exponent();

    let bytes = e.to_le_bytes();
    assert_eq!(bytes, vec![0x01, 0x00, 0x01, 0x00]);

    let parsed = BigNumber::from_le_bytes(&bytes).unwrap();
    assert_eq!(parsed.top(), e.top());
    assert_eq!(parsed.limbs(), e.limbs());
}

#[test]
fn test_modulus_byte_round_trip() {
    let n = first_key().modulus();

    let bytes = n.to_le_bytes();
    assert_eq!(bytes.len(), 256);
    assert_eq!(&bytes[..4], &[0xe1, 0xd8, 0xa0, 0x16]);

    let parsed = BigNumber::from_le_bytes(&bytes).unwrap();
    assert_eq!(parsed.top(), 64);
    assert_eq!(&parsed, n);
}

#[test]
fn test_truncated_modulus_bytes_rejected() {
    let bytes = first_key().modulus().to_le_bytes();

    let result = BigNumber::from_le_bytes(&bytes[..bytes.len() - 1]);
    assert_eq!(result, Err(KeyError::MisalignedLength(255)));
}

#[test]
fn test_concurrent_readers() {
    let expected = first_key().modulus().to_be_bytes();

    thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    let key = trusted_keys().get(0).unwrap();
                    (key.exponent().to_u64(), key.modulus().to_be_bytes())
                })
            })
            .collect();

        for handle in handles {
            let (e, n) = handle.join().unwrap();
            assert_eq!(e, Some(65537));
            assert_eq!(n, expected);
        }
    });
}
