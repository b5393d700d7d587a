//! Error handling.
//!
//! Each stage of the signing pipeline has its own error type. The
//! top-level [`Error`] returned by
//! [`sign_message`][crate::smime::sign_message] tells the stages apart.

use std::{error, fmt, io};
use std::convert::Infallible;
use bcder::decode::{ContentError, DecodeError};
use crate::cert::{CertificateError, ValidityError};


//------------ Error ---------------------------------------------------------

/// Signing a message failed.
///
/// No partially signed message is ever produced. Whatever stage failed,
/// the message handed to the signer has been consumed.
#[derive(Debug)]
pub enum Error {
    /// The content to be signed could not be serialized.
    Serialization(BuildError),

    /// The signature could not be created.
    Signing(SigningError),

    /// The signature could not be turned into a detached signature.
    StructuralEdit(StructuralEditError),
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Error::Serialization(err)
    }
}

impl From<SigningError> for Error {
    fn from(err: SigningError) -> Self {
        Error::Signing(err)
    }
}

impl From<StructuralEditError> for Error {
    fn from(err: StructuralEditError) -> Self {
        Error::StructuralEdit(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Serialization(ref err) => {
                write!(f, "cannot serialize content: {}", err)
            }
            Error::Signing(ref err) => {
                write!(f, "cannot sign content: {}", err)
            }
            Error::StructuralEdit(ref err) => {
                write!(f, "cannot detach signature: {}", err)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Serialization(ref err) => Some(err),
            Error::Signing(ref err) => Some(err),
            Error::StructuralEdit(ref err) => Some(err),
        }
    }
}


//------------ BuildError ----------------------------------------------------

/// A MIME node could not be serialized.
#[derive(Debug)]
pub enum BuildError {
    /// Reading the content from its source failed.
    Source(io::Error),

    /// The node tree cannot be serialized.
    Malformed(&'static str),
}

impl From<io::Error> for BuildError {
    fn from(err: io::Error) -> Self {
        BuildError::Source(err)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BuildError::Source(ref err) => {
                write!(f, "failed to read content: {}", err)
            }
            BuildError::Malformed(msg) => {
                write!(f, "malformed MIME node: {}", msg)
            }
        }
    }
}

impl error::Error for BuildError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            BuildError::Source(ref err) => Some(err),
            BuildError::Malformed(_) => None,
        }
    }
}


//------------ SigningError --------------------------------------------------

/// Creating a signature failed.
#[derive(Debug)]
pub enum SigningError {
    /// The certificate isn’t valid at signing time.
    Validity(ValidityError),

    /// The private key doesn’t belong to the certificate.
    KeyMismatch,

    /// The signer failed.
    Signer(Box<dyn error::Error + Send + Sync>),
}

impl SigningError {
    pub fn signer(err: impl error::Error + Send + Sync + 'static) -> Self {
        SigningError::Signer(Box::new(err))
    }
}

impl From<ValidityError> for SigningError {
    fn from(err: ValidityError) -> Self {
        SigningError::Validity(err)
    }
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SigningError::Validity(ref err) => err.fmt(f),
            SigningError::KeyMismatch => {
                f.write_str("private key does not match certificate")
            }
            SigningError::Signer(ref err) => err.fmt(f),
        }
    }
}

impl error::Error for SigningError { }


//------------ StructuralEditError -------------------------------------------

/// The signature did not have the shape needed to detach its content.
#[derive(Debug)]
pub struct StructuralEditError {
    inner: StructuralEditErrorKind,
}

#[derive(Debug)]
enum StructuralEditErrorKind {
    Decoding(DecodeError<Infallible>),
    Shape(&'static str),
}

impl StructuralEditError {
    pub fn new(msg: &'static str) -> Self {
        StructuralEditError { inner: StructuralEditErrorKind::Shape(msg) }
    }
}

impl From<DecodeError<Infallible>> for StructuralEditError {
    fn from(err: DecodeError<Infallible>) -> Self {
        StructuralEditError {
            inner: StructuralEditErrorKind::Decoding(err)
        }
    }
}

impl fmt::Display for StructuralEditError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            StructuralEditErrorKind::Decoding(ref inner) => inner.fmt(f),
            StructuralEditErrorKind::Shape(msg) => f.write_str(msg),
        }
    }
}

impl error::Error for StructuralEditError { }


//------------ IdentityError -------------------------------------------------

/// A signing identity could not be loaded.
#[derive(Debug)]
pub enum IdentityError {
    /// The signing certificate is broken.
    Certificate(CertificateError),

    /// A chain certificate is broken.
    ///
    /// Contains the index of the certificate in the chain.
    Chain(usize, CertificateError),

    /// The private key is broken.
    Key(io::Error),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IdentityError::Certificate(ref err) => {
                write!(f, "signing certificate: {}", err)
            }
            IdentityError::Chain(idx, ref err) => {
                write!(f, "chain certificate {}: {}", idx, err)
            }
            IdentityError::Key(ref err) => {
                write!(f, "private key: {}", err)
            }
        }
    }
}

impl error::Error for IdentityError { }


//------------ VerificationError ---------------------------------------------

/// A detached signature did not verify.
#[derive(Debug)]
pub struct VerificationError {
    inner: ContentError,
}

impl VerificationError {
    pub fn new(err: impl Into<ContentError>) -> Self {
        VerificationError { inner: err.into() }
    }
}

impl From<ContentError> for VerificationError {
    fn from(err: ContentError) -> Self {
        VerificationError { inner: err }
    }
}

impl From<openssl::error::ErrorStack> for VerificationError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        VerificationError::new(ContentError::from_boxed(Box::new(err)))
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl error::Error for VerificationError { }


//============ Tests =========================================================
