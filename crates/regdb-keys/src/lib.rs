//! Trusted RSA public keys and the regulatory database they sign.
//!
//! The keys are compiled in and exposed through a read-only registry.
//! Signature checking is left to the consumer; this crate only hands out
//! exponent and modulus limbs. The [`db`] module reads the db.txt source
//! format into a typed model.

mod bignum;
pub mod db;
mod error;
mod key;
mod keys;
mod registry;

pub use bignum::{BigNumber, LIMB_BITS, LIMB_BYTES};
pub use db::{Database, DbParser};
pub use error::{DbError, KeyError};
pub use key::PublicKey;
pub use registry::{trusted_keys, KeyRegistry, TRUSTED_KEYS};
