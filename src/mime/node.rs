//! MIME nodes and their serialization.

use std::{fmt, io, mem};
use std::sync::Arc;
use bytes::Bytes;
use futures_util::future::{BoxFuture, FutureExt};
use uuid::Uuid;
use crate::error::BuildError;
use crate::util::base64;


//------------ Header --------------------------------------------------------

/// A single header field.
///
/// The name is kept as given but compared ignoring ASCII case. The value
/// is used verbatim, so it must already be encoded as needed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    key: String,
    value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Header { key: key.into(), value: value.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns whether the header has the given name.
    pub fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}


//------------ ContentSource -------------------------------------------------

/// A producer of content that isn’t available in memory.
///
/// This could be a file, a network resource, or anything else that
/// provides octets asynchronously. The source is read every time a node
/// containing it is serialized. Its octets are used as they are, so for
/// textual content they should already have CRLF line endings.
pub trait ContentSource: Send + Sync {
    /// Reads the complete content.
    fn read(&self) -> BoxFuture<'_, Result<Bytes, io::Error>>;
}


//------------ Content -------------------------------------------------------

/// The content of a leaf node.
#[derive(Clone)]
pub enum Content {
    /// Text kept as a string.
    Text(String),

    /// Arbitrary octets.
    Binary(Bytes),

    /// Content to be read from a source when serializing.
    Source(Arc<dyn ContentSource>),
}

impl Content {
    pub fn source(source: impl ContentSource + 'static) -> Self {
        Content::Source(Arc::new(source))
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl<'a> From<&'a str> for Content {
    fn from(text: &'a str) -> Self {
        Content::Text(text.into())
    }
}

impl From<Bytes> for Content {
    fn from(data: Bytes) -> Self {
        Content::Binary(data)
    }
}

impl From<Vec<u8>> for Content {
    fn from(data: Vec<u8>) -> Self {
        Content::Binary(data.into())
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Content::Text(ref text) => {
                f.debug_tuple("Text").field(text).finish()
            }
            Content::Binary(ref data) => {
                f.debug_tuple("Binary").field(&data.len()).finish()
            }
            Content::Source(_) => f.write_str("Source"),
        }
    }
}


//------------ MimeNode ------------------------------------------------------

/// One part of a MIME message.
///
/// A node with children is a multipart node. A node without children is
/// a leaf whose body is its content. A node can’t have both.
///
/// The content type is kept as the `Content-Type` header. Multipart nodes
/// get their boundary when they are created, so serializing a node twice
/// produces identical output.
#[derive(Clone, Debug)]
pub struct MimeNode {
    headers: Vec<Header>,
    content: Option<Content>,
    children: Vec<MimeNode>,
    boundary: String,
}

/// # Creation and Headers
///
impl MimeNode {
    /// Creates a new node with the given content type.
    pub fn new(content_type: impl Into<String>) -> Self {
        MimeNode {
            headers: vec![Header::new(CONTENT_TYPE, content_type)],
            content: None,
            children: Vec::new(),
            boundary: format!("----_=_smime_{}", Uuid::new_v4().simple()),
        }
    }

    /// Returns the value of the first header with the given name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.iter().find(|header| header.is(key)).map(Header::value)
    }

    /// Returns all headers in order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Sets the header with the given name.
    ///
    /// The first header with this name keeps its position and gets the new
    /// value. All other headers with the name are dropped. If there was no
    /// such header, it is added to the end.
    pub fn set_header(
        &mut self, key: impl Into<String>, value: impl Into<String>
    ) {
        let header = Header::new(key, value);
        match self.headers.iter().position(|item| item.is(&header.key)) {
            Some(pos) => {
                let key = header.key.clone();
                self.headers[pos] = header;
                let mut idx = 0;
                self.headers.retain(|item| {
                    let keep = idx <= pos || !item.is(&key);
                    idx += 1;
                    keep
                });
            }
            None => self.headers.push(header),
        }
    }

    /// Adds a header to the end, keeping existing ones with the same name.
    pub fn add_header(
        &mut self, key: impl Into<String>, value: impl Into<String>
    ) {
        self.headers.push(Header::new(key, value))
    }

    /// Removes all headers with the given name and returns them.
    pub fn remove_header(&mut self, key: &str) -> Vec<Header> {
        let (removed, kept) = mem::take(&mut self.headers).into_iter()
            .partition(|header| header.is(key));
        self.headers = kept;
        removed
    }

    /// Removes and returns all headers.
    pub fn take_headers(&mut self) -> Vec<Header> {
        mem::take(&mut self.headers)
    }

    /// Appends headers in order.
    pub fn extend_headers(&mut self, headers: impl IntoIterator<Item = Header>) {
        self.headers.extend(headers)
    }

    /// Returns the content type if the node has one.
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// Returns whether the content type is a `text/*` type.
    pub fn is_text(&self) -> bool {
        self.content_type().map(|value| {
            value.get(..5).map(|prefix| {
                prefix.eq_ignore_ascii_case("text/")
            }).unwrap_or(false)
        }).unwrap_or(false)
    }
}

/// # Content and Children
///
impl MimeNode {
    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> Option<&mut Content> {
        self.content.as_mut()
    }

    pub fn set_content(&mut self, content: impl Into<Content>) {
        self.content = Some(content.into())
    }

    pub fn children(&self) -> &[MimeNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [MimeNode] {
        &mut self.children
    }

    /// Returns whether the node has children.
    pub fn is_multipart(&self) -> bool {
        !self.children.is_empty()
    }

    /// Appends an existing node as the last child.
    pub fn append_child(&mut self, child: MimeNode) -> &mut MimeNode {
        self.children.push(child);
        let idx = self.children.len() - 1;
        &mut self.children[idx]
    }

    /// Creates a new node and appends it as the last child.
    pub fn create_child(
        &mut self, content_type: impl Into<String>
    ) -> &mut MimeNode {
        self.append_child(MimeNode::new(content_type))
    }

    /// Returns the multipart boundary of the node.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }
}

/// # Serialization
///
impl MimeNode {
    /// Serializes the node as a body part.
    ///
    /// The result starts with the node’s headers and ends with the last
    /// octet of its body.
    pub async fn build(&self) -> Result<Bytes, BuildError> {
        let mut res = Vec::new();
        self.write_into(&mut res).await?;
        Ok(res.into())
    }

    /// Serializes the node as a complete message.
    ///
    /// This is the same as [`build`][Self::build] but a `MIME-Version`
    /// header is added in front if the node doesn’t have one already.
    pub async fn build_message(&self) -> Result<Bytes, BuildError> {
        let mut res = Vec::new();
        if self.header(MIME_VERSION).is_none() {
            res.extend_from_slice(b"MIME-Version: 1.0\r\n");
        }
        self.write_into(&mut res).await?;
        Ok(res.into())
    }

    fn write_into<'a>(
        &'a self, target: &'a mut Vec<u8>
    ) -> BoxFuture<'a, Result<(), BuildError>> {
        async move {
            if self.is_multipart() {
                if self.content.is_some() {
                    return Err(BuildError::Malformed(
                        "node has both content and children"
                    ))
                }
                self.write_multipart(target).await
            }
            else {
                self.write_leaf(target).await
            }
        }.boxed()
    }

    async fn write_multipart(
        &self, target: &mut Vec<u8>
    ) -> Result<(), BuildError> {
        if self.content_type().is_none() {
            return Err(BuildError::Malformed(
                "multipart node without content type"
            ))
        }
        for header in &self.headers {
            if header.is(CONTENT_TYPE) {
                let value = header.value.trim_end().trim_end_matches(';');
                write_header(
                    target, &header.key,
                    &format!("{}; boundary=\"{}\"", value, self.boundary)
                );
            }
            else {
                write_header(target, &header.key, &header.value);
            }
        }
        target.extend_from_slice(b"\r\n");
        for child in &self.children {
            target.extend_from_slice(b"--");
            target.extend_from_slice(self.boundary.as_bytes());
            target.extend_from_slice(b"\r\n");
            child.write_into(target).await?;
            target.extend_from_slice(b"\r\n");
        }
        target.extend_from_slice(b"--");
        target.extend_from_slice(self.boundary.as_bytes());
        target.extend_from_slice(b"--");
        Ok(())
    }

    async fn write_leaf(
        &self, target: &mut Vec<u8>
    ) -> Result<(), BuildError> {
        let (body, encoding) = match self.content {
            Some(Content::Text(ref text)) => {
                let body = Bytes::copy_from_slice(text.as_bytes());
                let encoding = TransferEncoding::for_text(&body);
                (body, encoding)
            }
            Some(Content::Binary(ref data)) => {
                (data.clone(), TransferEncoding::Base64)
            }
            Some(Content::Source(ref source)) => {
                (source.read().await?, TransferEncoding::Base64)
            }
            None => (Bytes::new(), TransferEncoding::SevenBit)
        };
        for header in &self.headers {
            if !header.is(CONTENT_TRANSFER_ENCODING) {
                write_header(target, &header.key, &header.value);
            }
        }
        write_header(target, CONTENT_TRANSFER_ENCODING, encoding.as_str());
        target.extend_from_slice(b"\r\n");
        match encoding {
            TransferEncoding::SevenBit => {
                target.extend_from_slice(body.as_ref())
            }
            TransferEncoding::Base64 => {
                target.extend_from_slice(
                    base64::Mime.encode(body.as_ref()).as_bytes()
                )
            }
        }
        Ok(())
    }
}


//------------ TransferEncoding ----------------------------------------------

/// The content transfer encodings we produce.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TransferEncoding {
    SevenBit,
    Base64,
}

impl TransferEncoding {
    /// The maximum length of a line without the CRLF.
    const MAX_LINE_LEN: usize = 998;

    /// Picks the encoding for text.
    ///
    /// Text can be sent as it is if it is ASCII without NULs, all line
    /// breaks are CRLF, and no line is too long.
    fn for_text(data: &[u8]) -> Self {
        let mut line_len = 0;
        let mut iter = data.iter();
        while let Some(&ch) = iter.next() {
            match ch {
                b'\r' => {
                    if iter.next() != Some(&b'\n') {
                        return TransferEncoding::Base64
                    }
                    line_len = 0;
                }
                b'\n' | 0 | 0x80..=0xFF => return TransferEncoding::Base64,
                _ => {
                    line_len += 1;
                    if line_len > Self::MAX_LINE_LEN {
                        return TransferEncoding::Base64
                    }
                }
            }
        }
        TransferEncoding::SevenBit
    }

    fn as_str(self) -> &'static str {
        match self {
            TransferEncoding::SevenBit => "7bit",
            TransferEncoding::Base64 => "base64",
        }
    }
}


//------------ Helpers -------------------------------------------------------

const CONTENT_TYPE: &str = "Content-Type";
const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";
const MIME_VERSION: &str = "MIME-Version";

fn write_header(target: &mut Vec<u8>, key: &str, value: &str) {
    target.extend_from_slice(key.as_bytes());
    target.extend_from_slice(b": ");
    target.extend_from_slice(value.as_bytes());
    target.extend_from_slice(b"\r\n");
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    struct FailingSource;

    impl ContentSource for FailingSource {
        fn read(&self) -> BoxFuture<'_, Result<Bytes, io::Error>> {
            async {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
            }.boxed()
        }
    }

    struct StaticSource(&'static [u8]);

    impl ContentSource for StaticSource {
        fn read(&self) -> BoxFuture<'_, Result<Bytes, io::Error>> {
            async move { Ok(Bytes::from_static(self.0)) }.boxed()
        }
    }

    #[test]
    fn headers() {
        let mut node = MimeNode::new("text/plain");
        node.add_header("Received", "one");
        node.add_header("received", "two");
        node.add_header("Subject", "Hello");
        assert_eq!(node.header("RECEIVED"), Some("one"));
        assert_eq!(node.content_type(), Some("text/plain"));
        assert!(node.is_text());

        node.set_header("Received", "three");
        let keys: Vec<_> = node.headers().iter().map(|h| {
            (h.key(), h.value())
        }).collect();
        assert_eq!(keys, [
            ("Content-Type", "text/plain"),
            ("Received", "three"),
            ("Subject", "Hello"),
        ]);

        let removed = node.remove_header("subject");
        assert_eq!(removed, [Header::new("Subject", "Hello")]);
        assert_eq!(node.headers().len(), 2);

        node.set_header("Content-Type", "IMAGE/png");
        assert!(!node.is_text());
        node.set_header("Content-Type", "Text/HTML");
        assert!(node.is_text());
    }

    #[tokio::test]
    async fn text_leaf() {
        let mut node = MimeNode::new("text/plain; charset=utf-8");
        node.set_header("Content-Transfer-Encoding", "quoted-printable");
        node.set_content("Hello\r\nWorld\r\n");
        assert_eq!(
            node.build().await.unwrap().as_ref(),
            b"Content-Type: text/plain; charset=utf-8\r\n\
              Content-Transfer-Encoding: 7bit\r\n\
              \r\n\
              Hello\r\nWorld\r\n"
        );
    }

    #[tokio::test]
    async fn text_needing_base64() {
        for text in [
            "Gr\u{fc}\u{df}e\r\n".to_string(),
            "x".repeat(999),
            "bare\nnewline".to_string(),
        ] {
            let mut node = MimeNode::new("text/plain");
            node.set_content(text.clone());
            let built = node.build().await.unwrap();
            let expected = format!(
                "Content-Type: text/plain\r\n\
                 Content-Transfer-Encoding: base64\r\n\
                 \r\n\
                 {}",
                base64::Mime.encode(text.as_bytes())
            );
            assert_eq!(built.as_ref(), expected.as_bytes());
        }

        let mut node = MimeNode::new("text/plain");
        node.set_content("x".repeat(998));
        assert!(
            node.build().await.unwrap().as_ref().ends_with(
                "x".repeat(998).as_bytes()
            )
        );
    }

    #[tokio::test]
    async fn binary_leaf() {
        let mut node = MimeNode::new("application/octet-stream");
        node.set_content(vec![0u8, 1, 2, 3]);
        assert_eq!(
            node.build().await.unwrap().as_ref(),
            b"Content-Type: application/octet-stream\r\n\
              Content-Transfer-Encoding: base64\r\n\
              \r\n\
              AAECAw=="
        );
    }

    #[tokio::test]
    async fn multipart() {
        let mut node = MimeNode::new("multipart/mixed;");
        node.add_header("Subject", "Hello");
        node.create_child("text/plain").set_content("Hi\r\n");
        node.create_child("application/octet-stream")
            .set_content(Content::source(StaticSource(b"\x00\x01")));
        let boundary = node.boundary().to_string();
        let expected = format!(
            "Content-Type: multipart/mixed; boundary=\"{b}\"\r\n\
             Subject: Hello\r\n\
             \r\n\
             --{b}\r\n\
             Content-Type: text/plain\r\n\
             Content-Transfer-Encoding: 7bit\r\n\
             \r\n\
             Hi\r\n\
             \r\n\
             --{b}\r\n\
             Content-Type: application/octet-stream\r\n\
             Content-Transfer-Encoding: base64\r\n\
             \r\n\
             AAE=\r\n\
             --{b}--",
            b = boundary
        );
        let built = node.build().await.unwrap();
        assert_eq!(String::from_utf8_lossy(&built), expected);

        // Building again gives the same result.
        assert_eq!(node.build().await.unwrap(), built);
    }

    #[tokio::test]
    async fn message() {
        let mut node = MimeNode::new("text/plain");
        node.set_content("Hi\r\n");
        assert!(node.build_message().await.unwrap().starts_with(
            b"MIME-Version: 1.0\r\nContent-Type: text/plain\r\n"
        ));
        node.add_header("Mime-Version", "1.0");
        assert!(node.build_message().await.unwrap().starts_with(
            b"Content-Type: text/plain\r\nMime-Version: 1.0\r\n"
        ));
    }

    #[tokio::test]
    async fn failures() {
        let mut node = MimeNode::new("multipart/mixed");
        node.create_child("text/plain")
            .set_content(Content::source(FailingSource));
        assert!(matches!(
            node.build().await, Err(BuildError::Source(_))
        ));

        let mut node = MimeNode::new("multipart/mixed");
        node.create_child("text/plain");
        node.set_content("both");
        assert!(matches!(
            node.build().await, Err(BuildError::Malformed(_))
        ));
    }
}
