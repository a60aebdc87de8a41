//! Order-preserving key encoding
//!
//! Every number is written as one length byte (count of significant bytes,
//! 0..=8) followed by those bytes, most significant first. Comparing two
//! encodings byte-wise gives the same answer as comparing the numbers, and
//! because the length comes first no encoding is a prefix of another one.
//! Posting keys concatenate the encodings of their components, so the
//! (term, document) key is a prefix of every (term, document, item) key
//! below it and a scan by term visits documents in ascending order, each
//! document entry directly followed by its item entries.

use super::types::TermId;
use crate::error::{QuarryError, Result};
use crate::models::{DocumentId, ItemId};

/// Append the order-preserving encoding of `value`
pub fn encode_ordered(value: u64, output: &mut Vec<u8>) {
    let len = 8 - (value.leading_zeros() / 8) as usize;
    output.push(len as u8);
    output.extend_from_slice(&value.to_be_bytes()[8 - len..]);
}

/// Decode one number at `*pos`, advancing `pos` past it
pub fn decode_ordered(input: &[u8], pos: &mut usize) -> Option<u64> {
    let len = *input.get(*pos)? as usize;
    if len > 8 {
        return None;
    }
    let bytes = input.get(*pos + 1..*pos + 1 + len)?;
    let mut buf = [0u8; 8];
    buf[8 - len..].copy_from_slice(bytes);
    *pos += 1 + len;
    Some(u64::from_be_bytes(buf))
}

/// Decode up to `N` leading components of a key
///
/// Returns the values and how many of them were present.
pub fn decode_components<const N: usize>(input: &[u8]) -> ([u64; N], usize) {
    let mut values = [0u64; N];
    let mut pos = 0;
    let mut count = 0;
    while count < N {
        match decode_ordered(input, &mut pos) {
            Some(value) => {
                values[count] = value;
                count += 1;
            }
            None => break,
        }
    }
    (values, count)
}

/// Builds composite keys from ordered components
#[derive(Clone, Debug, Default)]
pub struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, value: u64) -> Self {
        encode_ordered(value, &mut self.buf);
        self
    }

    pub fn term(self, term: TermId) -> Self {
        self.push(u64::from(term.as_u32()))
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Key of a posting entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostingKey {
    pub term: TermId,
    pub document: DocumentId,
    pub item: Option<ItemId>,
}

impl PostingKey {
    pub fn document(term: TermId, document: DocumentId) -> Self {
        Self {
            term,
            document,
            item: None,
        }
    }

    pub fn item(term: TermId, document: DocumentId, item: ItemId) -> Self {
        Self {
            term,
            document,
            item: Some(item),
        }
    }

    /// Prefix shared by all posting keys of `term`
    pub fn term_prefix(term: TermId) -> Vec<u8> {
        KeyBuilder::new().term(term).build()
    }

    pub fn encode(&self) -> Vec<u8> {
        let builder = KeyBuilder::new().term(self.term).push(self.document);
        match self.item {
            Some(item) => builder.push(item).build(),
            None => builder.build(),
        }
    }

    /// Decode a 2- or 3-component key; anything else is rejected
    pub fn decode(input: &[u8]) -> Option<Self> {
        let mut pos = 0;
        let term = u32::try_from(decode_ordered(input, &mut pos)?).ok()?;
        let term = TermId::new(term)?;
        let document = decode_ordered(input, &mut pos)?;
        let item = if pos < input.len() {
            Some(decode_ordered(input, &mut pos)?)
        } else {
            None
        };
        if pos != input.len() {
            return None;
        }
        Some(Self {
            term,
            document,
            item,
        })
    }

    /// Number of encoded components (2 = document entry, 3 = item entry)
    pub fn components(&self) -> usize {
        if self.item.is_some() {
            3
        } else {
            2
        }
    }
}

/// Encode a positive posting frequency
pub fn encode_frequency(frequency: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    encode_ordered(frequency.max(0) as u64, &mut out);
    out
}

/// Decode a posting frequency; a missing cell counts as 0
pub fn decode_frequency(input: Option<&[u8]>) -> Result<i32> {
    let Some(input) = input else {
        return Ok(0);
    };
    let mut pos = 0;
    let value = decode_ordered(input, &mut pos)
        .ok_or_else(|| QuarryError::CorruptValue(format!("bad frequency encoding {:?}", input)))?;
    i32::try_from(value)
        .map_err(|_| QuarryError::CorruptValue(format!("frequency {} out of range", value)))
}

/// Encode a term id as dictionary value
pub fn encode_term_id(term: TermId) -> Vec<u8> {
    KeyBuilder::new().term(term).build()
}

/// Decode a dictionary value
pub fn decode_term_id(input: &[u8]) -> Result<TermId> {
    let mut pos = 0;
    decode_ordered(input, &mut pos)
        .and_then(|raw| u32::try_from(raw).ok())
        .and_then(TermId::new)
        .ok_or_else(|| QuarryError::CorruptValue(format!("bad term id encoding {:?}", input)))
}
