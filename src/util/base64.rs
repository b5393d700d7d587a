//! Handling of Base 64-encoded data.
//!
//! This module provides flavors of Base 64 used within a certain context.
//! That is, you don’t have to remember how an application uses Base 64
//! exactly but just pick your application.

use std::str;
use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, STANDARD};


//------------ Mime ----------------------------------------------------------

/// The flavor used for the `base64` content transfer encoding of MIME.
///
/// This uses the standard alphabet with padding. When encoding, the output
/// is broken into lines of at most 76 characters separated by CRLF as
/// required by [RFC 2045]. There is no line break after the last line.
///
/// [RFC 2045]: https://tools.ietf.org/html/rfc2045
pub struct Mime;

impl Mime {
    const ENGINE: GeneralPurpose = STANDARD;

    /// The maximum number of characters in an encoded line.
    pub const LINE_LEN: usize = 76;

    pub fn encode(self, data: &[u8]) -> String {
        let encoded = Self::ENGINE.encode(data);
        let mut res = String::with_capacity(
            encoded.len() + (encoded.len() / Self::LINE_LEN) * 2
        );
        for (i, line) in encoded.as_bytes().chunks(Self::LINE_LEN).enumerate() {
            if i > 0 {
                res.push_str("\r\n");
            }
            // The engine only produces ASCII, so chunks are valid UTF-8.
            res.push_str(str::from_utf8(line).unwrap_or_default());
        }
        res
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_data_is_one_line() {
        assert_eq!(Mime.encode(b"foobar"), "Zm9vYmFy");
        assert_eq!(Mime.encode(b""), "");
    }

    #[test]
    fn long_data_is_wrapped() {
        let data = vec![0xA5u8; 200];
        let encoded = Mime.encode(&data);
        let lines: Vec<_> = encoded.split("\r\n").collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[..3].iter().all(|line| line.len() == Mime::LINE_LEN));
        assert!(lines[3].len() <= Mime::LINE_LEN);
        assert!(!encoded.ends_with("\r\n"));
        assert_eq!(
            STANDARD.decode(encoded.replace("\r\n", "")).unwrap(), data
        );
    }

    #[test]
    fn exact_line_length() {
        // 57 octets encode to exactly 76 characters.
        let encoded = Mime.encode(&[0u8; 57]);
        assert_eq!(encoded.len(), Mime::LINE_LEN);
        assert!(!encoded.contains('\r'));
    }
}
