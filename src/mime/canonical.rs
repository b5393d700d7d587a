//! Canonical line endings.
//!
//! Before content can be signed, its line endings have to be in the same
//! form the recipient will see: CRLF everywhere. [`canonicalize`] rewrites
//! the text content of a whole node tree.

use bytes::Bytes;
use super::node::{Content, MimeNode};


/// Rewrites the line endings of all text content in a node tree to CRLF.
///
/// Only leaves with a `text/*` content type and content kept in memory
/// are changed. Any of CRLF, a lone CR, or a lone LF counts as one line
/// ending. All children are visited whatever the type of their parent.
pub fn canonicalize(node: &mut MimeNode) {
    if node.is_text() {
        match node.content_mut() {
            Some(Content::Text(text)) => {
                if needs_rewrite(text.as_bytes()) {
                    *text = canonical_text(text)
                }
            }
            Some(Content::Binary(data)) => {
                if needs_rewrite(data) {
                    *data = canonical_octets(data)
                }
            }
            _ => { }
        }
    }
    for child in node.children_mut() {
        canonicalize(child)
    }
}

/// Returns whether there is a line ending other than CRLF.
fn needs_rewrite(data: &[u8]) -> bool {
    let mut iter = data.iter().peekable();
    while let Some(&ch) = iter.next() {
        match ch {
            b'\r' => {
                if iter.next_if_eq(&&b'\n').is_none() {
                    return true
                }
            }
            b'\n' => return true,
            _ => { }
        }
    }
    false
}

fn canonical_text(text: &str) -> String {
    let mut res = String::with_capacity(text.len() + text.len() / 32);
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                chars.next_if_eq(&'\n');
                res.push_str("\r\n");
            }
            '\n' => res.push_str("\r\n"),
            _ => res.push(ch)
        }
    }
    res
}

fn canonical_octets(data: &[u8]) -> Bytes {
    let mut res = Vec::with_capacity(data.len() + data.len() / 32);
    let mut iter = data.iter().copied().peekable();
    while let Some(ch) = iter.next() {
        match ch {
            b'\r' => {
                iter.next_if_eq(&b'\n');
                res.extend_from_slice(b"\r\n");
            }
            b'\n' => res.extend_from_slice(b"\r\n"),
            _ => res.push(ch)
        }
    }
    res.into()
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn text_of(node: &MimeNode) -> &str {
        match node.content() {
            Some(Content::Text(text)) => text,
            _ => panic!("not text")
        }
    }

    #[test]
    fn mixed_line_endings() {
        let mut node = MimeNode::new("text/plain");
        node.set_content("a\nb\rc\r\nd\n\re\r\r\n");
        canonicalize(&mut node);
        assert_eq!(text_of(&node), "a\r\nb\r\nc\r\nd\r\n\r\ne\r\n\r\n");

        // Already canonical text stays as it is.
        canonicalize(&mut node);
        assert_eq!(text_of(&node), "a\r\nb\r\nc\r\nd\r\n\r\ne\r\n\r\n");
    }

    #[test]
    fn non_ascii_text() {
        let mut node = MimeNode::new("TEXT/plain; charset=utf-8");
        node.set_content("Gr\u{fc}\u{df}e\n\u{2603}\n");
        canonicalize(&mut node);
        assert_eq!(text_of(&node), "Gr\u{fc}\u{df}e\r\n\u{2603}\r\n");
    }

    #[test]
    fn nested_tree() {
        let mut root = MimeNode::new("multipart/mixed");
        root.create_child("text/plain").set_content("one\ntwo");
        root.create_child("image/png").set_content(vec![b'\n', 0x89, b'\r']);
        let alt = root.create_child("multipart/alternative");
        alt.create_child("text/html").set_content(b"<p>\n".to_vec());

        canonicalize(&mut root);
        assert_eq!(text_of(&root.children()[0]), "one\r\ntwo");
        match root.children()[1].content() {
            Some(Content::Binary(data)) => {
                assert_eq!(data.as_ref(), b"\n\x89\r")
            }
            _ => panic!("not binary")
        }
        match root.children()[2].children()[0].content() {
            Some(Content::Binary(data)) => {
                assert_eq!(data.as_ref(), b"<p>\r\n")
            }
            _ => panic!("not binary")
        }
    }

    #[test]
    fn rewrite_detection() {
        assert!(!needs_rewrite(b"a\r\nb"));
        assert!(needs_rewrite(b"a\nb"));
        assert!(needs_rewrite(b"a\r"));
        assert!(!needs_rewrite(b""));
    }
}
