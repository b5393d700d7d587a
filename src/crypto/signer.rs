//! A generic interface to a signer.

use std::{error, fmt};
use bcder::{decode, encode, Oid};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::oid;


//------------ SignatureAlgorithm --------------------------------------------

/// The signature algorithms a signer can produce.
///
/// Both use SHA-256 as their digest. For CMS, [RFC 3370] asks for the RSA
/// algorithm to be identified as plain `rsaEncryption` while ECDSA uses
/// `ecdsa-with-SHA256` from [RFC 5758] with absent parameters.
///
/// [RFC 3370]: https://tools.ietf.org/html/rfc3370
/// [RFC 5758]: https://tools.ietf.org/html/rfc5758
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SignatureAlgorithm {
    /// RSA PKCS #1 v1.5 with SHA-256.
    RsaSha256,

    /// ECDSA with SHA-256.
    EcdsaSha256,
}

impl SignatureAlgorithm {
    /// Takes a signature algorithm identifier for CMS objects.
    ///
    /// Both `rsaEncryption` and `sha256WithRSAEncryption` are accepted for
    /// RSA since agents in the wild use both.
    pub fn cms_take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let oid = Oid::take_from(cons)?;
            let res = if
                oid == oid::RSA_ENCRYPTION
                || oid == oid::SHA256_WITH_RSA_ENCRYPTION
            {
                SignatureAlgorithm::RsaSha256
            }
            else if oid == oid::ECDSA_WITH_SHA256 {
                SignatureAlgorithm::EcdsaSha256
            }
            else {
                return Err(cons.content_err("invalid signature algorithm"))
            };
            cons.take_opt_null()?;
            Ok(res)
        })
    }

    /// Provides an encoder for CMS objects.
    pub fn cms_encode(self) -> impl encode::Values {
        match self {
            SignatureAlgorithm::RsaSha256 => {
                encode::Choice2::One(encode::sequence((
                    oid::RSA_ENCRYPTION.encode(),
                    ().encode(),
                )))
            }
            SignatureAlgorithm::EcdsaSha256 => {
                encode::Choice2::Two(encode::sequence(
                    oid::ECDSA_WITH_SHA256.encode(),
                ))
            }
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SignatureAlgorithm::RsaSha256 => f.write_str("RSA with SHA-256"),
            SignatureAlgorithm::EcdsaSha256 => {
                f.write_str("ECDSA with SHA-256")
            }
        }
    }
}


//------------ Signer --------------------------------------------------------

/// A type that allows creating signatures with a single private key.
///
/// This is the seam between the CMS encoder and whatever holds the key. The
/// crate provides [`KeyPair`][super::softsigner::KeyPair] which keeps an
/// OpenSSL key in memory.
pub trait Signer {
    /// An operational error happened in the signer.
    type Error: error::Error + Send + Sync + 'static;

    /// Returns the algorithm signatures will be created with.
    fn algorithm(&self) -> Result<SignatureAlgorithm, Self::Error>;

    /// Returns the DER encoded subject public key info of the key.
    ///
    /// This is compared against the certificate before signing.
    fn public_key_info(&self) -> Result<Bytes, Self::Error>;

    /// Signs data.
    ///
    /// The signer hashes the data with SHA-256 itself.
    fn sign(&self, data: &[u8]) -> Result<Bytes, Self::Error>;
}

impl<'a, T: Signer + ?Sized> Signer for &'a T {
    type Error = T::Error;

    fn algorithm(&self) -> Result<SignatureAlgorithm, Self::Error> {
        (*self).algorithm()
    }

    fn public_key_info(&self) -> Result<Bytes, Self::Error> {
        (*self).public_key_info()
    }

    fn sign(&self, data: &[u8]) -> Result<Bytes, Self::Error> {
        (*self).sign(data)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bcder::Mode;
    use bcder::encode::Values;
    use super::*;

    #[test]
    fn cms_identifiers() {
        for alg in [
            SignatureAlgorithm::RsaSha256, SignatureAlgorithm::EcdsaSha256
        ] {
            let encoded = alg.cms_encode().to_captured(Mode::Der);
            assert_eq!(
                Mode::Der.decode(
                    encoded.as_slice(), SignatureAlgorithm::cms_take_from
                ).unwrap(),
                alg
            );
        }
    }

    #[test]
    fn rsa_alias_accepted() {
        let encoded = encode::sequence((
            oid::SHA256_WITH_RSA_ENCRYPTION.encode(),
            ().encode(),
        )).to_captured(Mode::Der);
        assert_eq!(
            Mode::Der.decode(
                encoded.as_slice(), SignatureAlgorithm::cms_take_from
            ).unwrap(),
            SignatureAlgorithm::RsaSha256
        );
    }

    #[test]
    fn unknown_algorithm_rejected() {
        let encoded = encode::sequence(
            oid::SHA256.encode()
        ).to_captured(Mode::Der);
        assert!(
            Mode::Der.decode(
                encoded.as_slice(), SignatureAlgorithm::cms_take_from
            ).is_err()
        );
    }
}
