//! Signing related implementations.
//!

pub use self::digest::{Digest, DigestAlgorithm};
pub use self::signer::{SignatureAlgorithm, Signer};
pub use self::softsigner::KeyPair;

pub mod digest;
pub mod signer;
pub mod softsigner;
