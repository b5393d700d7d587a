//! A minimal MIME tree.
//!
//! This module provides just enough MIME to sign a message: a tree of
//! [`MimeNode`]s with headers and content, a serializer producing the
//! exact octets that go on the wire, and the canonicalization of text
//! content. It doesn’t parse MIME and doesn’t encode header values.

pub use self::canonical::canonicalize;
pub use self::node::{Content, ContentSource, Header, MimeNode};

pub mod canonical;
pub mod node;
