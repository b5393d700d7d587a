//! Detached CMS signatures.
//!
//! S/MIME signatures are CMS _SignedData_ objects as defined in [RFC 5652].
//! The signed content travels next to the signature as the first part of
//! a `multipart/signed` entity, so the signature itself must not contain
//! it. It is _detached_.
//!
//! The [`SignedDataBuilder`] creates a complete signed data object with
//! the content embedded. [`detach`] then removes the embedded content,
//! leaving all the other octets untouched. [`sign_detached`] combines the
//! two. Finally, [`SignedData`] decodes such an object and verifies it
//! against content provided separately.
//!
//! The objects produced here look like this:
//!
//! ```txt
//! ContentInfo ::= SEQUENCE {
//!     contentType     id-signedData,
//!     content         [0] EXPLICIT SignedData }
//!
//! SignedData ::= SEQUENCE {
//!     version         CMSVersion,                       -- 1
//!     digestAlgorithms DigestAlgorithmIdentifiers,      -- SHA-256
//!     encapContentInfo EncapsulatedContentInfo,
//!     certificates    [0] IMPLICIT CertificateSet OPTIONAL,
//!     crls            [1] IMPLICIT RevocationInfoChoices OPTIONAL,
//!     signerInfos     SignerInfos }
//!
//! EncapsulatedContentInfo ::= SEQUENCE {
//!     eContentType    id-data,
//!     eContent        [0] EXPLICIT OCTET STRING OPTIONAL } -- removed
//!
//! SignerInfo ::= SEQUENCE {
//!     version         CMSVersion,                       -- 1
//!     sid             IssuerAndSerialNumber,
//!     digestAlgorithm DigestAlgorithmIdentifier,
//!     signedAttrs     [0] IMPLICIT SignedAttributes,
//!     signatureAlgorithm SignatureAlgorithmIdentifier,
//!     signature       SignatureValue,
//!     unsignedAttrs   [1] IMPLICIT UnsignedAttributes OPTIONAL }
//! ```
//!
//! [RFC 5652]: https://tools.ietf.org/html/rfc5652

use bcder::{decode, encode};
use bcder::{Captured, Mode, OctetString, Oid, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use log::debug;
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::sign::Verifier;
use crate::oid;
use crate::asn1::{self, Value};
use crate::cert::{Certificate, Serial};
use crate::crypto::{Digest, DigestAlgorithm, SignatureAlgorithm, Signer};
use crate::error::{
    Error, SigningError, StructuralEditError, VerificationError
};
use crate::identity::SigningIdentity;
use crate::time::Time;


//------------ sign_detached -------------------------------------------------

/// Creates a detached signature for `content`.
///
/// Returns the DER encoded _ContentInfo_ carrying the signed data. The
/// content is not included. Nothing is returned unless every step
/// succeeded.
pub fn sign_detached<S: Signer>(
    content: &[u8],
    identity: &SigningIdentity<S>,
) -> Result<Bytes, Error> {
    let attached = SignedDataBuilder::new().finalize(content, identity)?;
    detach(attached.as_slice()).map_err(Into::into)
}


//------------ detach --------------------------------------------------------

/// Removes the embedded content from an encoded signed data object.
///
/// The object is located by tags rather than positions wherever the
/// syntax allows optional values. If anything doesn’t look like a signed
/// data object with embedded content, an error is returned.
pub fn detach(der: &[u8]) -> Result<Bytes, StructuralEditError> {
    let mut info = Value::decode(der)?;
    if !info.is_constructed_as(Tag::SEQUENCE) {
        return Err(StructuralEditError::new("ContentInfo is not a SEQUENCE"))
    }
    match info.get(0) {
        Some(Value::Primitive { tag: Tag::OID, content })
            if content.as_ref() == oid::SIGNED_DATA.0 => { }
        _ => {
            return Err(StructuralEditError::new(
                "content type is not id-signedData"
            ))
        }
    }
    let signed_data = match info.get_mut(1) {
        Some(wrapper) if wrapper.is_constructed_as(Tag::CTX_0) => {
            match wrapper.get_mut(0) {
                Some(value) if value.is_constructed_as(Tag::SEQUENCE) => {
                    value
                }
                _ => {
                    return Err(StructuralEditError::new(
                        "missing SignedData"
                    ))
                }
            }
        }
        _ => return Err(StructuralEditError::new("missing content")),
    };

    // encapContentInfo is the first SEQUENCE: version is an INTEGER and
    // digestAlgorithms a SET.
    let encap = signed_data.values_mut().and_then(|values| {
        values.iter_mut().find(|value| value.is_constructed_as(Tag::SEQUENCE))
    });
    let encap = match encap {
        Some(encap) => encap,
        None => {
            return Err(StructuralEditError::new(
                "missing encapContentInfo"
            ))
        }
    };
    let pos = encap.values().and_then(|values| {
        values.iter().position(|value| value.is_constructed_as(Tag::CTX_0))
    });
    let removed = match pos.and_then(|pos| encap.remove(pos)) {
        Some(removed) => removed,
        None => return Err(StructuralEditError::new("missing eContent")),
    };
    debug!(
        "Detached {} octets of embedded content from signature",
        removed.encoded_len(Mode::Der)
    );
    Ok(info.to_captured(Mode::Der).into_bytes())
}


//------------ SignedDataBuilder ---------------------------------------------

/// Creates signed data objects with embedded content.
#[derive(Clone, Debug)]
pub struct SignedDataBuilder {
    /// The digest algorithm to be used for the message digest attribute.
    digest_algorithm: DigestAlgorithm,

    /// The signing time attribute.
    ///
    /// Defaults to the current time.
    signing_time: Time,
}

impl SignedDataBuilder {
    pub fn new() -> Self {
        SignedDataBuilder {
            digest_algorithm: DigestAlgorithm::default(),
            signing_time: Time::now(),
        }
    }

    pub fn signing_time(&self) -> Time {
        self.signing_time
    }

    pub fn set_signing_time(&mut self, signing_time: Time) {
        self.signing_time = signing_time
    }

    /// Signs `content` and encodes the complete signed data object.
    ///
    /// The identity is checked first. The signer isn’t asked to sign
    /// anything for an identity that can’t be used.
    pub fn finalize<S: Signer>(
        self,
        content: &[u8],
        identity: &SigningIdentity<S>,
    ) -> Result<Captured, SigningError> {
        let algorithm = identity.check()?;
        debug!(
            "Signing {} octets of content using {}",
            content.len(), algorithm
        );

        // Produce signed attributes.
        let message_digest = self.digest_algorithm.digest(content);
        let signed_attrs = SignedAttrs::new(
            &message_digest, self.signing_time
        );

        // Sign signed attributes.
        let signature = identity.signer().sign(
            &signed_attrs.encode_verify()
        ).map_err(SigningError::signer)?;

        let res = encode::sequence((
            oid::SIGNED_DATA.encode(), // contentType
            encode::sequence_as(Tag::CTX_0, // content
                encode::sequence((
                    1u8.encode(), // version
                    self.digest_algorithm.encode_set(), // digestAlgorithms
                    encode::sequence(( // encapContentInfo
                        oid::DATA.encode(),
                        encode::sequence_as(Tag::CTX_0,
                            OctetString::encode_slice(content)
                        ),
                    )),
                    encode::sequence_as(Tag::CTX_0, // certificates
                        encode::iter(
                            identity.certificates().map(|cert| {
                                cert.encode_ref()
                            })
                        )
                    ),
                    // crl -- omitted
                    encode::set( // signerInfos
                        encode::sequence(( // SignerInfo
                            1u8.encode(), // version
                            identity.cert().encode_issuer_and_serial(),
                            self.digest_algorithm.encode(),
                            signed_attrs.encode_ref(),
                            algorithm.cms_encode(),
                            OctetString::encode_slice(signature.as_ref()),
                            // unsignedAttrs omitted
                        ))
                    )
                ))
            )
        )).to_captured(Mode::Der);
        Ok(res)
    }
}

impl Default for SignedDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}


//------------ SignedData ----------------------------------------------------

/// A decoded signed data object.
///
/// Only objects with a single signer and the attributes written by
/// [`SignedDataBuilder`] are supported.
#[derive(Clone, Debug)]
pub struct SignedData {
    //--- From SignedData
    //
    digest_algorithm: DigestAlgorithm,
    content_type: Oid<Bytes>,
    content: Option<OctetString>,
    certificates: Vec<Certificate>,

    //--- From SignerInfo
    //
    sid_issuer: Captured,
    sid_serial: Serial,
    signed_attrs: SignedAttrs,
    signature_algorithm: SignatureAlgorithm,
    signature: Bytes,

    //--- SignedAttributes
    //
    message_digest: Bytes,
    signing_time: Time,
}

/// # Data Access
///
impl SignedData {
    pub fn content_type(&self) -> &Oid<Bytes> {
        &self.content_type
    }

    /// Returns the embedded content if there is any.
    pub fn content(&self) -> Option<&OctetString> {
        self.content.as_ref()
    }

    /// Returns whether the content is absent.
    pub fn is_detached(&self) -> bool {
        self.content.is_none()
    }

    /// Returns the certificates in the order they appear in the object.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Returns the serial number the signer is identified by.
    pub fn signer_serial(&self) -> &Serial {
        &self.sid_serial
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature_algorithm
    }

    pub fn signing_time(&self) -> Time {
        self.signing_time
    }

    pub fn message_digest(&self) -> &[u8] {
        self.message_digest.as_ref()
    }

    pub fn signed_attrs(&self) -> &SignedAttrs {
        &self.signed_attrs
    }
}

/// # Decoding and Verification
///
impl SignedData {
    /// Decodes a DER encoded _ContentInfo_ with signed data.
    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source.into_source(), Self::take_from)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| { // ContentInfo
            oid::SIGNED_DATA.skip_if(cons)?; // contentType
            cons.take_constructed_if(Tag::CTX_0, |cons| { // content
                cons.take_sequence(|cons| { // SignedData
                    cons.skip_u8_if(1)?; // version
                    let digest_algorithm =
                        DigestAlgorithm::take_set_from(cons)?;
                    let (content_type, content) = {
                        cons.take_sequence(|cons| { // encapContentInfo
                            Ok((
                                Oid::take_from(cons)?,
                                cons.take_opt_constructed_if(
                                    Tag::CTX_0,
                                    OctetString::take_from
                                )?
                            ))
                        })?
                    };
                    let certificates = cons.take_opt_constructed_if(
                        Tag::CTX_0, |cons| {
                            let mut res = Vec::new();
                            while let Some(cert) =
                                Certificate::take_opt_from(cons)?
                            {
                                res.push(cert)
                            }
                            Ok(res)
                        }
                    )?.unwrap_or_default();
                    cons.take_opt_constructed_if(Tag::CTX_1, |cons| {
                        cons.skip_all()
                    })?; // crls
                    let signer_info = cons.take_set(|cons| {
                        cons.take_sequence(|cons| {
                            cons.skip_u8_if(1)?;
                            let (issuer, serial) = cons.take_sequence(
                                |cons| {
                                    Ok((
                                        cons.capture_one()?,
                                        Serial::take_from(cons)?,
                                    ))
                                }
                            )?;
                            let alg = DigestAlgorithm::take_from(cons)?;
                            if alg != digest_algorithm {
                                return Err(cons.content_err(
                                    "digest algorithm mismatch"
                                ))
                            }
                            let attrs = SignedAttrs::take_from(cons)?;
                            if attrs.2 != content_type {
                                return Err(cons.content_err(
                                    "content type in signed attributes \
                                    differs"
                                ))
                            }
                            let signature_algorithm =
                                SignatureAlgorithm::cms_take_from(cons)?;
                            let signature =
                                OctetString::take_from(cons)?.into_bytes();
                            cons.take_opt_constructed_if(
                                Tag::CTX_1, |cons| cons.skip_all()
                            )?; // unsignedAttrs
                            Ok((
                                issuer, serial, attrs,
                                signature_algorithm, signature
                            ))
                        })
                    })?;
                    let (
                        sid_issuer, sid_serial, attrs,
                        signature_algorithm, signature
                    ) = signer_info;
                    Ok(SignedData {
                        digest_algorithm,
                        content_type,
                        content,
                        certificates,
                        sid_issuer,
                        sid_serial,
                        signed_attrs: attrs.0,
                        signature_algorithm,
                        signature,
                        message_digest: attrs.1,
                        signing_time: attrs.3,
                    })
                })
            })
        })
    }

    /// Returns the certificate of the signer if it is included.
    pub fn signer_cert(&self) -> Option<&Certificate> {
        self.certificates.iter().find(|cert| {
            cert.is_issuer_and_serial(
                self.sid_issuer.as_slice(), &self.sid_serial
            )
        })
    }

    /// Verifies the signature over content provided separately.
    ///
    /// The signer certificate has to be included in the object. Only the
    /// signature is verified, the certificate itself is not validated.
    pub fn verify_detached(
        &self, content: &[u8]
    ) -> Result<(), VerificationError> {
        let digest = self.digest_algorithm.digest(content);
        if digest.as_ref() != self.message_digest.as_ref() {
            return Err(VerificationError::new(
                "message digest mismatch in signed data"
            ))
        }
        let cert = match self.signer_cert() {
            Some(cert) => cert,
            None => {
                return Err(VerificationError::new(
                    "signer certificate not included"
                ))
            }
        };
        let key = PKey::public_key_from_der(cert.subject_public_key_info())?;
        let mut verifier = Verifier::new(MessageDigest::sha256(), &key)?;
        verifier.update(&self.signed_attrs.encode_verify())?;
        if verifier.verify(self.signature.as_ref())? {
            Ok(())
        }
        else {
            Err(VerificationError::new("signature verification failed"))
        }
    }
}


//------------ SignedAttrs ---------------------------------------------------

/// The signed attributes of a signer info.
///
/// ```txt
/// SignedAttributes ::= SET SIZE (1..MAX) OF Attribute
///
/// Attribute ::= SEQUENCE {
///     attrType OBJECT IDENTIFIER,
///     attrValues SET OF AttributeValue }
/// ```
///
/// We produce exactly three attributes: _content-type_ which is always
/// `id-data`, _message-digest_ with the SHA-256 digest of the content, and
/// _signing-time_.
///
/// A `SignedAttrs` value contains the captured content of the SET, that is
/// the encoded attributes without the tag and length octets. The signature
/// is calculated over the attributes encoded with the SET tag while the
/// signer info carries them with the implicit context tag 0. DER requires
/// the elements of a SET OF to be ordered by their encoding.
#[derive(Clone, Debug)]
pub struct SignedAttrs(Captured);

impl SignedAttrs {
    pub fn new(message_digest: &Digest, signing_time: Time) -> Self {
        let mut attrs = [
            encode::sequence((
                oid::CONTENT_TYPE.encode(),
                encode::set(
                    oid::DATA.encode(),
                )
            )).to_captured(Mode::Der),
            encode::sequence((
                oid::SIGNING_TIME.encode(),
                encode::set(
                    signing_time.encode_varied(),
                )
            )).to_captured(Mode::Der),
            encode::sequence((
                oid::MESSAGE_DIGEST.encode(),
                encode::set(
                    OctetString::encode_slice(message_digest.as_ref()),
                )
            )).to_captured(Mode::Der),
        ];
        attrs.sort_by(|left, right| left.as_slice().cmp(right.as_slice()));

        let mut res = Captured::builder(Mode::Der);
        for attr in &attrs {
            res.extend(attr)
        }
        SignedAttrs(res.freeze())
    }

    /// Takes the signed attributes from the beginning of a constructed value.
    ///
    /// Returns the raw signed attrs, the message digest, the content type
    /// object identifier, and the signing time. Unknown attributes are
    /// ignored.
    #[allow(clippy::type_complexity)]
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<
        (Self, Bytes, Oid<Bytes>, Time),
        DecodeError<S::Error>
    > {
        let mut message_digest = None;
        let mut content_type = None;
        let mut signing_time = None;
        let raw = cons.take_constructed_if(Tag::CTX_0, |cons| {
            cons.capture(|cons| {
                while let Some(()) = cons.take_opt_sequence(|cons| {
                    let oid = Oid::take_from(cons)?;
                    if oid == oid::CONTENT_TYPE {
                        if content_type.is_some() {
                            return Err(cons.content_err(
                                "duplicate Content Type attribute"
                            ))
                        }
                        content_type = Some(cons.take_set(Oid::take_from)?);
                    }
                    else if oid == oid::MESSAGE_DIGEST {
                        if message_digest.is_some() {
                            return Err(cons.content_err(
                                "duplicate Message Digest attribute"
                            ))
                        }
                        message_digest = Some(
                            cons.take_set(OctetString::take_from)?
                        );
                    }
                    else if oid == oid::SIGNING_TIME {
                        if signing_time.is_some() {
                            return Err(cons.content_err(
                                "duplicate Signing Time attribute"
                            ))
                        }
                        signing_time = Some(cons.take_set(Time::take_from)?);
                    }
                    else {
                        cons.skip_all()?;
                    }
                    Ok(())
                })? { }
                Ok(())
            })
        })?;
        let Some(message_digest) = message_digest else {
            return Err(cons.content_err(
                "missing message digest in signed attributes"
            ))
        };
        let Some(content_type) = content_type else {
            return Err(cons.content_err(
                "missing content type in signed attributes"
            ))
        };
        let Some(signing_time) = signing_time else {
            return Err(cons.content_err(
                "missing signing time in signed attributes"
            ))
        };
        Ok((
            Self(raw), message_digest.into_bytes(), content_type,
            signing_time
        ))
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence_as(Tag::CTX_0, &self.0)
    }

    /// Creates the message for signing and verification.
    pub fn encode_verify(&self) -> Vec<u8> {
        let len = self.0.len();
        let mut res = Vec::with_capacity(len + 6);
        res.push(0x31); // SET
        // Writing into a vec can’t fail.
        let _ = asn1::write_length(len, &mut res);
        res.extend_from_slice(self.0.as_ref());
        res
    }
}

impl AsRef<[u8]> for SignedAttrs {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::crypto::KeyPair;
    use crate::test;
    use super::*;

    const CONTENT: &[u8] =
        b"Content-Type: text/plain\r\n\
          Content-Transfer-Encoding: 7bit\r\n\
          \r\n\
          Hello\r\n";

    #[test]
    fn sign_and_verify() {
        let identity = test::identity();
        let der = sign_detached(CONTENT, &identity).unwrap();
        let signed = SignedData::decode(der.as_ref()).unwrap();
        assert!(signed.is_detached());
        assert_eq!(signed.content_type(), &oid::DATA);
        assert_eq!(
            signed.signature_algorithm(), SignatureAlgorithm::RsaSha256
        );
        assert_eq!(signed.signer_serial(), identity.cert().serial());
        assert_eq!(
            signed.message_digest(),
            DigestAlgorithm::default().digest(CONTENT).as_ref()
        );
        signed.verify_detached(CONTENT).unwrap();
        assert!(signed.verify_detached(b"Hello\r\n").is_err());
    }

    #[test]
    fn sign_with_ec_key() {
        let key = test::ec_key();
        let cert = test::self_signed(&key, "Example Signer", 7);
        let identity = SigningIdentity::new(
            test::to_cert(&cert), KeyPair::from_pkey(key), Vec::new()
        );
        let der = sign_detached(CONTENT, &identity).unwrap();
        let signed = SignedData::decode(der.as_ref()).unwrap();
        assert_eq!(
            signed.signature_algorithm(), SignatureAlgorithm::EcdsaSha256
        );
        signed.verify_detached(CONTENT).unwrap();
    }

    #[test]
    fn chain_follows_signer() {
        let key = test::rsa_key();
        let ca_key = test::ec_key();
        let ca = test::self_signed(&ca_key, "Example CA", 1);
        let cert = test::certificate(
            &key, "Example Signer", &ca_key, "Example CA", 2,
            test::current()
        );
        let identity = SigningIdentity::new(
            test::to_cert(&cert), KeyPair::from_pkey(key),
            vec![test::to_cert(&ca)]
        );
        let der = sign_detached(CONTENT, &identity).unwrap();
        let signed = SignedData::decode(der.as_ref()).unwrap();
        let certs: Vec<_> = signed.certificates().iter().map(|cert| {
            cert.as_slice().to_vec()
        }).collect();
        assert_eq!(
            certs, vec![cert.to_der().unwrap(), ca.to_der().unwrap()]
        );
        assert_eq!(
            signed.signer_cert().unwrap().as_slice(),
            cert.to_der().unwrap().as_slice()
        );
        signed.verify_detached(CONTENT).unwrap();
    }

    #[test]
    fn attached_then_detached() {
        let identity = test::identity();
        let mut builder = SignedDataBuilder::new();
        let time = Time::utc(2024, 5, 1, 12, 0, 0).unwrap();
        builder.set_signing_time(time);
        let attached = builder.finalize(CONTENT, &identity).unwrap();

        let signed = SignedData::decode(attached.as_slice()).unwrap();
        assert!(!signed.is_detached());
        assert_eq!(signed.content().unwrap().to_bytes().as_ref(), CONTENT);
        assert_eq!(signed.signing_time(), time);

        let detached = detach(attached.as_slice()).unwrap();
        assert!(detached.len() < attached.len());
        let signed = SignedData::decode(detached.as_ref()).unwrap();
        assert!(signed.is_detached());
        assert_eq!(signed.signing_time(), time);
        signed.verify_detached(CONTENT).unwrap();

        // There is nothing left to remove.
        assert!(detach(detached.as_ref()).is_err());
    }

    #[test]
    fn detach_checks_shape() {
        let not_signed_data = encode::sequence((
            oid::DATA.encode(),
            encode::sequence_as(Tag::CTX_0,
                OctetString::encode_slice(CONTENT)
            ),
        )).to_captured(Mode::Der);
        assert!(detach(not_signed_data.as_slice()).is_err());

        let no_encap = encode::sequence((
            oid::SIGNED_DATA.encode(),
            encode::sequence_as(Tag::CTX_0,
                encode::sequence((
                    1u8.encode(),
                    DigestAlgorithm::default().encode_set(),
                ))
            ),
        )).to_captured(Mode::Der);
        assert!(detach(no_encap.as_slice()).is_err());

        assert!(detach(b"\x04\x01\x00").is_err());
        assert!(detach(b"garbage").is_err());
    }

    #[test]
    fn detach_rejects_deep_nesting() {
        // 100,000 SEQUENCEs around a NULL.
        let mut headers = Vec::new();
        let mut len = 2;
        for _ in 0..100_000 {
            let mut header = vec![0x30];
            crate::asn1::write_length(len, &mut header).unwrap();
            len += header.len();
            headers.push(header);
        }
        let mut der: Vec<u8> = headers.into_iter().rev().flatten().collect();
        der.extend_from_slice(b"\x05\x00");
        assert!(detach(&der).is_err());
    }

    #[test]
    fn signed_attrs_are_ordered() {
        let digest = DigestAlgorithm::default().digest(CONTENT);
        let attrs = SignedAttrs::new(
            &digest, Time::utc(2024, 5, 1, 12, 0, 0).unwrap()
        );
        let mut values = Vec::new();
        Mode::Der.decode(attrs.as_ref(), |cons| {
            for _ in 0..3 {
                values.push(cons.capture_one()?.as_slice().to_vec());
            }
            Ok(())
        }).unwrap();
        assert_eq!(values.len(), 3);
        let mut sorted = values.clone();
        sorted.sort();
        assert_eq!(values, sorted);

        let verify = attrs.encode_verify();
        assert_eq!(verify[0], 0x31);
        assert_eq!(&verify[verify.len() - attrs.as_ref().len()..], attrs.as_ref());
    }

    #[test]
    fn expired_identity_is_not_used() {
        let key = test::rsa_key();
        let cert = test::certificate(
            &key, "Example Signer", &key, "Example Signer", 1,
            (1_500_000_000, 1_550_000_000)
        );
        let identity = SigningIdentity::new(
            test::to_cert(&cert), KeyPair::from_pkey(key), Vec::new()
        );
        assert!(matches!(
            sign_detached(CONTENT, &identity),
            Err(Error::Signing(SigningError::Validity(_)))
        ));
    }
}
