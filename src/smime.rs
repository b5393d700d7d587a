//! Signing MIME messages.
//!
//! An S/MIME signed message as described in [RFC 5751] is a
//! `multipart/signed` entity as defined by [RFC 1847] with two parts: the
//! content that was signed and a detached CMS signature over it.
//!
//! [`sign_message`] turns a message into such an entity. All the headers of
//! the message except its content type move to the new top-level node. The
//! original top-level node, now only describing its content, becomes the
//! first part.
//!
//! [RFC 1847]: https://tools.ietf.org/html/rfc1847
//! [RFC 5751]: https://tools.ietf.org/html/rfc5751

use bytes::Bytes;
use log::{debug, info};
use crate::crypto::Signer;
use crate::error::Error;
use crate::identity::SigningIdentity;
use crate::mime::{canonicalize, Content, Header, MimeNode};
use crate::sigdata::sign_detached;


//------------ Constants -----------------------------------------------------

/// The content type of the signed message.
pub const SIGNED_CONTENT_TYPE: &str =
    "multipart/signed; protocol=\"application/pkcs7-signature\"; \
     micalg=sha256;";

/// The content type of the signature part.
pub const SIGNATURE_CONTENT_TYPE: &str =
    "application/pkcs7-signature; name=\"smime.p7s\"";

/// The content disposition of the signature part.
pub const SIGNATURE_DISPOSITION: &str = "attachment; filename=\"smime.p7s\"";


//------------ sign_message --------------------------------------------------

/// Signs a message.
///
/// Returns the new top-level node of the message. Its first child is the
/// original message, canonicalized and with only its content type left as
/// a header. Its second child is the detached signature.
///
/// The message is consumed. If signing fails, there is no message left to
/// be sent by accident.
pub async fn sign_message<S: Signer>(
    message: MimeNode,
    identity: &SigningIdentity<S>,
) -> Result<MimeNode, Error> {
    let (mut root, mut content) = split(message);
    debug!(
        "Moved {} headers to the signed message envelope",
        root.headers().len() - 1
    );

    canonicalize(&mut content);
    let data = content.build().await?;
    debug!("Serialized {} octets of content for signing", data.len());

    let signature = sign_detached(&data, identity)?;
    root.append_child(content);
    root.append_child(signature_node(signature));
    info!(
        "Signed message with certificate serial {}",
        identity.cert().serial()
    );
    Ok(root)
}


//------------ wrap ----------------------------------------------------------

/// Wraps a message into a `multipart/signed` node.
///
/// All headers of `message` except _Content-Type_ are moved to the new
/// node in their original order. The message becomes the first child of
/// the new node.
pub fn wrap(message: MimeNode) -> MimeNode {
    let (mut root, content) = split(message);
    root.append_child(content);
    root
}

/// Splits a message into the signed envelope and the content to be signed.
fn split(mut message: MimeNode) -> (MimeNode, MimeNode) {
    let (content_type, envelope): (Vec<Header>, Vec<Header>) =
        message.take_headers().into_iter().partition(|header| {
            header.is("Content-Type")
        });
    message.extend_headers(content_type);
    let mut root = MimeNode::new(SIGNED_CONTENT_TYPE);
    root.extend_headers(envelope);
    (root, message)
}

/// Creates the node carrying the signature.
fn signature_node(signature: Bytes) -> MimeNode {
    let mut node = MimeNode::new(SIGNATURE_CONTENT_TYPE);
    node.add_header("Content-Disposition", SIGNATURE_DISPOSITION);
    node.set_content(Content::Binary(signature));
    node
}


//============ Tests =========================================================
