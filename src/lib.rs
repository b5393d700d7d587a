//! Signing MIME messages with S/MIME.
//!
//! _S/MIME_ protects email messages with the _Cryptographic Message
//! Syntax_ (CMS). A signed message is a `multipart/signed` entity whose
//! first part is the signed content and whose second part is a detached
//! CMS signature over it, created with the sender’s certificate and key.
//!
//! This crate takes a message already assembled as a tree of
//! [`MimeNode`][mime::MimeNode]s and turns it into such a signed message
//! through [`smime::sign_message`]. The pieces it is made of are available
//! separately:
//!
//! * [`mime`] contains the MIME tree, its serialization, and the
//!   canonicalization of line endings,
//! * [`sigdata`] creates, detaches, and verifies CMS signed data,
//! * [`identity`] and [`cert`] deal with the signing certificate and key,
//! * [`crypto`] provides digests and the [`Signer`][crypto::Signer] trait
//!   abstracting over the private key.
//!
//! Errors of the whole process are collected in [`error`].

pub use self::error::Error;
pub use self::identity::SigningIdentity;
pub use self::smime::sign_message;

pub mod asn1;
pub mod cert;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod mime;
pub mod oid;
pub mod sigdata;
pub mod smime;
pub mod time;

mod util;
