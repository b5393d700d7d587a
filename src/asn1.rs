//! A generic tree of ASN.1 values.
//!
//! Most of the crate decodes and encodes ASN.1 through typed `bcder`
//! combinators. Sometimes, though, an already encoded structure needs to be
//! edited: a field dropped without touching anything around it. For that,
//! [`Value`] represents any DER encoded value as a tree of tagged primitive
//! and constructed values that can be edited and encoded again.
//!
//! Tags and content of untouched values are kept as they were, so encoding
//! an unchanged tree reproduces the original octets.

use std::io;
use bcder::{decode, encode};
use bcder::{Mode, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::Values;
use bytes::Bytes;


/// The maximum number of nested constructed values accepted when decoding.
pub const MAX_DEPTH: usize = 64;


//------------ Value ---------------------------------------------------------

/// A single ASN.1 value of any type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// A primitive value with its raw content octets.
    Primitive {
        tag: Tag,
        content: Bytes,
    },

    /// A constructed value with its nested values in order.
    Constructed {
        tag: Tag,
        values: Vec<Value>,
    },
}

/// # Decoding
///
impl Value {
    /// Decodes a single DER encoded value.
    ///
    /// The source must contain exactly one value.
    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source.into_source(), Self::take_from)
    }

    /// Takes a single value from the beginning of a constructed value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value(|tag, content| Self::from_content(tag, content, 0))
    }

    fn from_content<S: decode::Source>(
        tag: Tag,
        content: &mut decode::Content<S>,
        depth: usize,
    ) -> Result<Self, DecodeError<S::Error>> {
        match content {
            decode::Content::Primitive(prim) => {
                Ok(Value::Primitive { tag, content: prim.take_all()? })
            }
            decode::Content::Constructed(cons) => {
                if depth >= MAX_DEPTH {
                    return Err(cons.content_err("ASN.1 nesting too deep"))
                }
                let mut values = Vec::new();
                while let Some(value) = cons.take_opt_value(|tag, content| {
                    Self::from_content(tag, content, depth + 1)
                })? {
                    values.push(value)
                }
                Ok(Value::Constructed { tag, values })
            }
        }
    }
}

/// # Access
///
impl Value {
    pub fn tag(&self) -> Tag {
        match *self {
            Value::Primitive { tag, .. } => tag,
            Value::Constructed { tag, .. } => tag,
        }
    }

    pub fn is_constructed(&self) -> bool {
        matches!(*self, Value::Constructed { .. })
    }

    /// Returns whether this is a constructed value with the given tag.
    pub fn is_constructed_as(&self, expected: Tag) -> bool {
        match *self {
            Value::Constructed { tag, .. } => tag == expected,
            _ => false
        }
    }

    /// Returns the content of a primitive value.
    pub fn content(&self) -> Option<&Bytes> {
        match *self {
            Value::Primitive { ref content, .. } => Some(content),
            _ => None
        }
    }

    /// Returns the nested values of a constructed value.
    pub fn values(&self) -> Option<&[Value]> {
        match *self {
            Value::Constructed { ref values, .. } => Some(values),
            _ => None
        }
    }

    /// Returns the nested values of a constructed value for editing.
    pub fn values_mut(&mut self) -> Option<&mut Vec<Value>> {
        match *self {
            Value::Constructed { ref mut values, .. } => Some(values),
            _ => None
        }
    }

    /// Returns the nested value at the given position.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values().and_then(|values| values.get(idx))
    }

    /// Returns the nested value at the given position for editing.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Value> {
        self.values_mut().and_then(|values| values.get_mut(idx))
    }

    /// Removes and returns the nested value at the given position.
    ///
    /// Returns `None` if this isn’t a constructed value or there is no
    /// value at the position. The remaining values keep their order.
    pub fn remove(&mut self, idx: usize) -> Option<Value> {
        let values = self.values_mut()?;
        if idx < values.len() {
            Some(values.remove(idx))
        }
        else {
            None
        }
    }

    /// Returns the length of the content octets when encoded.
    fn content_len(&self) -> usize {
        match *self {
            Value::Primitive { ref content, .. } => content.len(),
            Value::Constructed { ref values, .. } => {
                values.iter().map(|value| {
                    value.encoded_len(Mode::Der)
                }).sum()
            }
        }
    }
}


//--- encode::Values

impl encode::Values for Value {
    fn encoded_len(&self, _mode: Mode) -> usize {
        let len = self.content_len();
        self.tag().encoded_len() + length_len(len) + len
    }

    fn write_encoded<W: io::Write>(
        &self,
        mode: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        self.tag().write_encoded(self.is_constructed(), target)?;
        write_length(self.content_len(), target)?;
        match *self {
            Value::Primitive { ref content, .. } => {
                target.write_all(content.as_ref())
            }
            Value::Constructed { ref values, .. } => {
                for value in values {
                    value.write_encoded(mode, target)?;
                }
                Ok(())
            }
        }
    }
}


//------------ Length Octets -------------------------------------------------

/// Returns the number of octets of the definite form length for `len`.
pub fn length_len(len: usize) -> usize {
    if len < 0x80 {
        1
    }
    else {
        1 + significant_octets(len).len()
    }
}

/// Writes the definite form length octets for `len`.
pub fn write_length<W: io::Write>(
    len: usize, target: &mut W
) -> Result<(), io::Error> {
    if len < 0x80 {
        target.write_all(&[len as u8])
    }
    else {
        let octets = significant_octets(len);
        target.write_all(&[0x80 | octets.len() as u8])?;
        target.write_all(&octets)
    }
}

fn significant_octets(len: usize) -> Vec<u8> {
    let octets = len.to_be_bytes();
    let start = octets.iter().take_while(|&&octet| octet == 0).count();
    octets[start..].to_vec()
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bcder::{OctetString, Oid};
    use bcder::encode::{PrimitiveContent, Values};
    use crate::oid;
    use super::*;

    fn sample() -> Bytes {
        encode::sequence((
            oid::DATA.encode(),
            encode::sequence_as(Tag::CTX_0,
                OctetString::encode_slice(vec![0x55u8; 300])
            ),
            encode::set(
                7u8.encode()
            ),
        )).to_captured(Mode::Der).into_bytes()
    }

    #[test]
    fn unchanged_tree_reencodes_identically() {
        let der = sample();
        let value = Value::decode(der.as_ref()).unwrap();
        assert!(value.is_constructed_as(Tag::SEQUENCE));
        assert_eq!(value.values().unwrap().len(), 3);
        assert_eq!(value.get(0).unwrap().tag(), Tag::OID);
        assert!(value.get(1).unwrap().is_constructed_as(Tag::CTX_0));
        assert_eq!(
            value.to_captured(Mode::Der).as_slice(), der.as_ref()
        );
    }

    #[test]
    fn remove_keeps_siblings() {
        let mut value = Value::decode(sample().as_ref()).unwrap();
        let removed = value.remove(1).unwrap();
        assert!(removed.is_constructed_as(Tag::CTX_0));
        assert!(value.remove(5).is_none());

        let expected = encode::sequence((
            oid::DATA.encode(),
            encode::set(
                7u8.encode()
            ),
        )).to_captured(Mode::Der);
        assert_eq!(
            value.to_captured(Mode::Der).as_slice(), expected.as_slice()
        );

        // The result still decodes as what it should be.
        Mode::Der.decode(expected.as_slice(), |cons| {
            cons.take_sequence(|cons| {
                let oid = Oid::take_from(cons)?;
                assert_eq!(oid, oid::DATA);
                cons.take_set(|cons| cons.take_u8())
            })
        }).unwrap();
    }

    #[test]
    fn primitive_has_no_children() {
        let mut value = Value::Primitive {
            tag: Tag::INTEGER, content: Bytes::from_static(b"\x01")
        };
        assert!(value.values().is_none());
        assert!(value.remove(0).is_none());
        assert_eq!(value.content().unwrap().as_ref(), b"\x01");
        assert_eq!(value.to_captured(Mode::Der).as_slice(), b"\x02\x01\x01");
    }

    #[test]
    fn length_octets() {
        fn encoded(len: usize) -> Vec<u8> {
            let mut res = Vec::new();
            write_length(len, &mut res).unwrap();
            assert_eq!(res.len(), length_len(len));
            res
        }

        assert_eq!(encoded(0), b"\x00");
        assert_eq!(encoded(0x7F), b"\x7F");
        assert_eq!(encoded(0x80), b"\x81\x80");
        assert_eq!(encoded(0x1234), b"\x82\x12\x34");
        assert_eq!(encoded(0x010000), b"\x83\x01\x00\x00");
    }

    fn nested(levels: usize) -> Vec<u8> {
        let mut headers = Vec::new();
        let mut len = 2;
        for _ in 0..levels {
            let mut header = vec![0x30];
            write_length(len, &mut header).unwrap();
            len += header.len();
            headers.push(header);
        }
        let mut res: Vec<u8> = headers.into_iter().rev().flatten().collect();
        res.extend_from_slice(b"\x05\x00");
        res
    }

    #[test]
    fn nesting_limit() {
        let value = Value::decode(nested(MAX_DEPTH).as_slice()).unwrap();
        assert_eq!(
            value.to_captured(Mode::Der).as_slice(),
            nested(MAX_DEPTH).as_slice()
        );
        assert!(Value::decode(nested(MAX_DEPTH + 1).as_slice()).is_err());
        assert!(Value::decode(nested(100_000).as_slice()).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Value::decode(b"\x30\x05\x02\x01".as_ref()).is_err());
        assert!(Value::decode(b"".as_ref()).is_err());
    }
}
