//! X.509 certificates as far as S/MIME signing needs them.
//!
//! A signer doesn’t need to understand much of its certificate: it embeds
//! it verbatim in the signature, identifies it via its issuer name and
//! serial number, checks that it is currently valid, and compares its
//! public key with the signing key. [`Certificate`] keeps the complete
//! encoded certificate and parses exactly these parts.

use std::{error, fmt, io};
use bcder::{decode, encode};
use bcder::{Captured, Mode, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use openssl::x509::X509;
use crate::time::Time;
use crate::util::hex;


//------------ Certificate ---------------------------------------------------

/// An X.509 certificate.
///
/// ```txt
/// Certificate  ::=  SEQUENCE  {
///      tbsCertificate       TBSCertificate,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
///
/// TBSCertificate  ::=  SEQUENCE  {
///      version         [0]  EXPLICIT Version DEFAULT v1,
///      serialNumber         CertificateSerialNumber,
///      signature            AlgorithmIdentifier,
///      issuer               Name,
///      validity             Validity,
///      subject              Name,
///      subjectPublicKeyInfo SubjectPublicKeyInfo,
///      ... }
/// ```
#[derive(Clone, Debug)]
pub struct Certificate {
    /// The complete encoded certificate.
    raw: Captured,

    serial: Serial,
    issuer: Captured,
    validity: Validity,
    subject_public_key_info: Captured,
}

/// # Decoding and Encoding
///
impl Certificate {
    /// Decodes a DER encoded certificate.
    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source.into_source(), Self::take_from)
    }

    /// Decodes a PEM encoded certificate.
    ///
    /// Only the first certificate in the data is used.
    pub fn from_pem(pem: &[u8]) -> Result<Self, CertificateError> {
        let der = X509::from_pem(pem)?.to_der()?;
        Self::decode(Bytes::from(der)).map_err(Into::into)
    }

    /// Decodes a DER encoded certificate from a slice.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        Self::decode(Bytes::copy_from_slice(der)).map_err(Into::into)
    }

    /// Takes a certificate from the beginning of a constructed value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut parts = None;
        let raw = cons.capture(|cons| {
            parts = Some(cons.take_sequence(|cons| {
                let res = cons.take_sequence(Self::take_tbs)?;
                cons.skip_all()?; // signatureAlgorithm, signatureValue
                Ok(res)
            })?);
            Ok(())
        })?;
        let (serial, issuer, validity, spki) = match parts {
            Some(parts) => parts,
            None => return Err(cons.content_err("missing certificate"))
        };
        Ok(Certificate {
            raw,
            serial,
            issuer,
            validity,
            subject_public_key_info: spki,
        })
    }

    /// Takes an optional certificate from a constructed value.
    ///
    /// This is used when reading the certificate set of a signed data
    /// object. Anything but a plain certificate ends the set.
    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        let mut parts = None;
        let raw = cons.capture(|cons| {
            parts = cons.take_opt_sequence(|cons| {
                let res = cons.take_sequence(Self::take_tbs)?;
                cons.skip_all()?;
                Ok(res)
            })?;
            Ok(())
        })?;
        Ok(parts.map(|(serial, issuer, validity, spki)| {
            Certificate {
                raw,
                serial,
                issuer,
                validity,
                subject_public_key_info: spki,
            }
        }))
    }

    #[allow(clippy::type_complexity)]
    fn take_tbs<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<(Serial, Captured, Validity, Captured), DecodeError<S::Error>> {
        cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
            cons.skip_all()
        })?;
        let serial = Serial::take_from(cons)?;
        cons.capture_one()?; // signature
        let issuer = cons.capture_one()?;
        let validity = Validity::take_from(cons)?;
        cons.capture_one()?; // subject
        let spki = cons.capture_one()?;
        cons.skip_all()?; // unique identifiers, extensions
        Ok((serial, issuer, validity, spki))
    }

    /// Returns a value encoder for a reference to the certificate.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        &self.raw
    }
}

/// # Data Access
///
impl Certificate {
    /// Returns the complete DER encoded certificate.
    pub fn as_slice(&self) -> &[u8] {
        self.raw.as_slice()
    }

    pub fn serial(&self) -> &Serial {
        &self.serial
    }

    /// Returns the encoded issuer name.
    pub fn issuer(&self) -> &Captured {
        &self.issuer
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// Returns the encoded subject public key info.
    pub fn subject_public_key_info(&self) -> &[u8] {
        self.subject_public_key_info.as_slice()
    }

    /// Returns whether this certificate has the given issuer and serial.
    pub fn is_issuer_and_serial(
        &self, issuer: &[u8], serial: &Serial
    ) -> bool {
        self.issuer.as_slice() == issuer && &self.serial == serial
    }

    /// Returns an encoder for the certificate’s _IssuerAndSerialNumber_.
    ///
    /// ```txt
    /// IssuerAndSerialNumber ::= SEQUENCE {
    ///     issuer Name,
    ///     serialNumber CertificateSerialNumber }
    /// ```
    pub fn encode_issuer_and_serial(&self) -> impl encode::Values + '_ {
        encode::sequence((
            &self.issuer,
            self.serial.encode_ref(),
        ))
    }
}


//------------ Serial --------------------------------------------------------

/// A certificate serial number.
///
/// Kept as the content octets of the INTEGER exactly as they were encoded
/// so that they can be compared and reproduced verbatim.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Serial(Bytes);

impl Serial {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::INTEGER, |prim| {
            let res = prim.take_all()?;
            if res.is_empty() {
                return Err(prim.content_err("empty serial number"))
            }
            Ok(Serial(res))
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        self.encode()
    }
}

impl<'a> PrimitiveContent for &'a Serial {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(&self, _mode: Mode) -> usize {
        self.0.len()
    }

    fn write_encoded<W: io::Write>(
        &self,
        _mode: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(self.0.as_ref())
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut buf = vec![0u8; self.0.len() * 2];
        f.write_str(hex::encode(self.0.as_ref(), &mut buf))
    }
}

impl fmt::Debug for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Serial({self})")
    }
}


//------------ Validity ------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Validity {
    not_before: Time,
    not_after: Time,
}

impl Validity {
    pub fn new(not_before: Time, not_after: Time) -> Self {
        Validity { not_before, not_after }
    }

    pub fn not_before(self) -> Time {
        self.not_before
    }

    pub fn not_after(self) -> Time {
        self.not_after
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(Validity::new(
                Time::take_from(cons)?,
                Time::take_from(cons)?,
            ))
        })
    }

    pub fn verify(self) -> Result<(), ValidityError> {
        self.verify_at(Time::now())
    }

    pub fn verify_at(self, now: Time) -> Result<(), ValidityError> {
        if now < self.not_before {
            Err(ValidityError::NotYetValid(self.not_before))
        }
        else if now > self.not_after {
            Err(ValidityError::Expired(self.not_after))
        }
        else {
            Ok(())
        }
    }
}


//============ Error Types ===================================================

//------------ CertificateError ----------------------------------------------

/// A certificate could not be loaded.
#[derive(Debug)]
pub enum CertificateError {
    /// The certificate is not correctly encoded.
    Decode(DecodeError<std::convert::Infallible>),

    /// OpenSSL could not read the PEM data.
    Openssl(openssl::error::ErrorStack),
}

impl From<DecodeError<std::convert::Infallible>> for CertificateError {
    fn from(err: DecodeError<std::convert::Infallible>) -> Self {
        CertificateError::Decode(err)
    }
}

impl From<openssl::error::ErrorStack> for CertificateError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        CertificateError::Openssl(err)
    }
}

impl fmt::Display for CertificateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CertificateError::Decode(ref err) => {
                write!(f, "malformed certificate: {}", err)
            }
            CertificateError::Openssl(ref err) => {
                write!(f, "cannot read certificate: {}", err)
            }
        }
    }
}

impl error::Error for CertificateError { }


//------------ ValidityError -------------------------------------------------

/// A certificate is used outside its validity period.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidityError {
    NotYetValid(Time),
    Expired(Time),
}

impl fmt::Display for ValidityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ValidityError::NotYetValid(time) => {
                write!(f, "certificate not valid before {}", time)
            }
            ValidityError::Expired(time) => {
                write!(f, "certificate expired at {}", time)
            }
        }
    }
}

impl error::Error for ValidityError { }


//============ Tests =========================================================
