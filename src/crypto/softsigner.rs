//! A signer atop the OpenSSL library.
//!
//! The key is kept in memory for as long as the key pair lives. Keys are
//! typically loaded from PEM or DER encoded private key files by the
//! caller and handed over as bytes.

use std::{fmt, io};
use bytes::Bytes;
use openssl::hash::MessageDigest;
use openssl::pkey::{Id, PKey, Private};
use super::signer::{SignatureAlgorithm, Signer};


//------------ KeyPair -------------------------------------------------------

/// A private key kept by OpenSSL.
///
/// RSA keys of any size and EC keys are supported. Other key types can be
/// loaded but will fail when asked for their signature algorithm.
#[derive(Clone)]
pub struct KeyPair(PKey<Private>);

impl KeyPair {
    pub fn from_pkey(pkey: PKey<Private>) -> Self {
        KeyPair(pkey)
    }

    /// Loads a PKCS #8 or traditional private key from DER.
    pub fn from_der(der: &[u8]) -> Result<Self, io::Error> {
        Ok(KeyPair(PKey::private_key_from_der(der)?))
    }

    /// Loads a private key from PEM.
    pub fn from_pem(pem: &[u8]) -> Result<Self, io::Error> {
        Ok(KeyPair(PKey::private_key_from_pem(pem)?))
    }
}

impl Signer for KeyPair {
    type Error = io::Error;

    fn algorithm(&self) -> Result<SignatureAlgorithm, Self::Error> {
        match self.0.id() {
            Id::RSA => Ok(SignatureAlgorithm::RsaSha256),
            Id::EC => Ok(SignatureAlgorithm::EcdsaSha256),
            _ => {
                Err(io::Error::new(
                    io::ErrorKind::Other, "unsupported key type"
                ))
            }
        }
    }

    fn public_key_info(&self) -> Result<Bytes, Self::Error> {
        Ok(self.0.public_key_to_der()?.into())
    }

    fn sign(&self, data: &[u8]) -> Result<Bytes, Self::Error> {
        let mut signer = openssl::sign::Signer::new(
            MessageDigest::sha256(), &self.0
        )?;
        signer.update(data)?;
        Ok(signer.sign_to_vec()?.into())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("KeyPair").field(&self.0.id()).finish()
    }
}


//============ Tests =========================================================
