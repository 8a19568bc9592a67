//! A positional RLP decoder with strict canonicality checks.
//!
//! Decoding never materializes payload bytes: [`decode_header`] and
//! [`decode_list`] return [`RlpHeader`]s — `(offset, length, kind)` windows
//! into the backing [`Fragment`] — and consumers slice the fragment through
//! them. The typed `expect_*` helpers compare a decoded item against an
//! expected value and fail with a caller-supplied stable label, which is the
//! only diagnostic a failed verification yields.
//!
//! Non-canonical encodings are rejected outright: a single byte below `0x80`
//! wrapped in a string prefix, a long-form length below 56, or a leading zero
//! in the length-of-length all abort the decode. Proof material is
//! adversarial; two different encodings of the same item must never both
//! verify.

use std::fmt::{self, Display};

use ethereum_types::{H160, H256, U256};
use log::trace;
use thiserror::Error;

use crate::fragment::Fragment;
use crate::utils::strip_leading_zeros;

/// Stores the result of RLP operations. Returns an [`RlpError`] upon failure.
pub type RlpResult<T> = Result<T, RlpError>;

/// An error type for RLP decoding and item checks.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum RlpError {
    /// The input ended inside an item.
    #[error("RLP input ended inside an item (offset: {offset}, wanted: {wanted})")]
    UnexpectedEnd {
        /// Position at which decoding started.
        offset: usize,
        /// Total bytes the item required from that position.
        wanted: usize,
    },

    /// A single byte below `0x80` was wrapped in a string prefix.
    #[error("Non-canonical RLP: single byte below 0x80 must encode itself")]
    NonCanonicalSingleByte,

    /// The long form was used for a payload short enough for the short form.
    #[error("Non-canonical RLP: long form used for a payload of {0} bytes")]
    NonCanonicalLongLength(usize),

    /// The length-of-length field starts with a zero byte.
    #[error("Non-canonical RLP: leading zero in length-of-length")]
    LeadingZeroLength,

    /// A declared payload length does not fit in the address space.
    #[error("RLP payload length of {0} bytes overflows the decoder")]
    LengthOverflow(u64),

    /// An item had the wrong kind for the requested operation.
    #[error("{label} is not an RLP {expected} (found: {found})")]
    UnexpectedKind {
        /// The kind required by the caller.
        expected: RlpKind,
        /// The kind actually decoded.
        found: RlpKind,
        /// Stable label of the item being checked.
        label: &'static str,
    },

    /// A list carried more children than the output capacity.
    #[error("RLP list has more than {max} items")]
    TooManyItems {
        /// Capacity of the output list.
        max: usize,
    },

    /// An outer item did not cover its entire fragment.
    #[error("Trailing bytes after RLP item")]
    TrailingBytes,

    /// A decoded item did not equal the expected value.
    #[error("{label} does not match")]
    Mismatch {
        /// Stable label of the item being checked.
        label: &'static str,
    },

    /// A decoded item had an unexpected byte length.
    #[error("{label} has unexpected length {length}")]
    UnexpectedLength {
        /// Stable label of the item being checked.
        label: &'static str,
        /// Payload length actually decoded.
        length: usize,
    },

    /// A decoded integer did not fit the expected width.
    #[error("{label} overflows its integer width")]
    IntegerOverflow {
        /// Stable label of the item being checked.
        label: &'static str,
    },

    /// Tried to merge two headers of different kinds.
    #[error("Merged RLP headers must share a kind")]
    MergeKindMismatch,

    /// Tried to merge two headers that are not adjacent.
    #[error("Merged RLP headers must be adjacent (end: {end}, next offset: {next_offset})")]
    MergeNotAdjacent {
        /// End of the left header's payload.
        end: usize,
        /// Offset of the right header's payload.
        next_offset: usize,
    },
}

/// The kind of one RLP item.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum RlpKind {
    /// A byte string.
    #[default]
    String,
    /// A list of items.
    List,
}

impl Display for RlpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RlpKind::String => "string",
            RlpKind::List => "list",
        };

        write!(f, "{}", s)
    }
}

/// Describes the payload of one decoded RLP item: a window relative to the
/// enclosing fragment, plus the item kind. The prefix bytes consumed to parse
/// the length are not part of the window; [`encoded_span`] recovers them.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct RlpHeader {
    /// Start of the payload, relative to the enclosing fragment.
    pub offset: usize,
    /// Payload length in bytes.
    pub length: usize,
    /// Item kind.
    pub kind: RlpKind,
}

impl RlpHeader {
    /// One past the last payload byte.
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Concatenates two adjacent payload spans into one header.
    ///
    /// Both headers must carry the same kind; a decoder that ends up merging
    /// a string span with a list span is broken, and silently keeping one of
    /// the two kinds would hide that.
    pub fn merge(self, other: RlpHeader) -> RlpResult<RlpHeader> {
        if self.kind != other.kind {
            return Err(RlpError::MergeKindMismatch);
        }
        if other.offset != self.end() {
            return Err(RlpError::MergeNotAdjacent {
                end: self.end(),
                next_offset: other.offset,
            });
        }

        Ok(RlpHeader {
            offset: self.offset,
            length: self.length + other.length,
            kind: self.kind,
        })
    }
}

/// A bounded sequence of up to `N` child headers decoded from one list,
/// together with the outer payload span (needed when the list encoding is
/// re-hashed or re-sliced).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RlpList<const N: usize> {
    headers: Fragment<RlpHeader, N>,
    payload: RlpHeader,
}

impl<const N: usize> RlpList<N> {
    /// Number of children.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the list has no children.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// The header of child `i`.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn at(&self, i: usize) -> RlpHeader {
        self.headers.at(i)
    }

    /// The outer payload span of the list.
    pub const fn payload(&self) -> RlpHeader {
        self.payload
    }

    /// Iterates over the child headers.
    pub fn iter(&self) -> impl Iterator<Item = &RlpHeader> {
        self.headers.iter()
    }
}

/// Decodes the header of the item starting at `position` within `frag`.
///
/// Returns the header and the total number of bytes the item occupies
/// (prefix plus payload); a caller walking a list advances by that amount.
pub fn decode_header<const M: usize>(
    frag: &Fragment<u8, M>,
    position: usize,
) -> RlpResult<(RlpHeader, usize)> {
    if position >= frag.len() {
        return Err(RlpError::UnexpectedEnd {
            offset: position,
            wanted: 1,
        });
    }

    let prefix = frag.at(position);
    let (header, consumed) = match prefix {
        // The byte is its own payload.
        0x00..=0x7f => (
            RlpHeader {
                offset: position,
                length: 1,
                kind: RlpKind::String,
            },
            1,
        ),

        // Short string, length in the prefix.
        0x80..=0xb7 => {
            let length = (prefix - 0x80) as usize;
            check_available(frag, position, 1 + length)?;

            if length == 1 && frag.at(position + 1) < 0x80 {
                return Err(RlpError::NonCanonicalSingleByte);
            }

            (
                RlpHeader {
                    offset: position + 1,
                    length,
                    kind: RlpKind::String,
                },
                1 + length,
            )
        }

        // Long string, length in the next `prefix - 0xb7` bytes.
        0xb8..=0xbf => {
            let length_of_length = (prefix - 0xb7) as usize;
            let length = decode_long_length(frag, position, length_of_length)?;

            (
                RlpHeader {
                    offset: position + 1 + length_of_length,
                    length,
                    kind: RlpKind::String,
                },
                1 + length_of_length + length,
            )
        }

        // Short list, payload length in the prefix.
        0xc0..=0xf7 => {
            let length = (prefix - 0xc0) as usize;
            check_available(frag, position, 1 + length)?;

            (
                RlpHeader {
                    offset: position + 1,
                    length,
                    kind: RlpKind::List,
                },
                1 + length,
            )
        }

        // Long list, payload length in the next `prefix - 0xf7` bytes.
        0xf8..=0xff => {
            let length_of_length = (prefix - 0xf7) as usize;
            let length = decode_long_length(frag, position, length_of_length)?;

            (
                RlpHeader {
                    offset: position + 1 + length_of_length,
                    length,
                    kind: RlpKind::List,
                },
                1 + length_of_length + length,
            )
        }
    };

    Ok((header, consumed))
}

/// Reads and validates a long-form payload length starting right after the
/// prefix byte at `position`.
fn decode_long_length<const M: usize>(
    frag: &Fragment<u8, M>,
    position: usize,
    length_of_length: usize,
) -> RlpResult<usize> {
    check_available(frag, position, 1 + length_of_length)?;

    if frag.at(position + 1) == 0 {
        return Err(RlpError::LeadingZeroLength);
    }

    let mut length: u64 = 0;
    for i in 0..length_of_length {
        length = (length << 8) | frag.at(position + 1 + i) as u64;
    }

    let length = usize::try_from(length).map_err(|_| RlpError::LengthOverflow(length))?;
    if length < 56 {
        return Err(RlpError::NonCanonicalLongLength(length));
    }

    let total = length
        .checked_add(1 + length_of_length)
        .ok_or(RlpError::LengthOverflow(length as u64))?;
    check_available(frag, position, total)?;

    Ok(length)
}

fn check_available<const M: usize>(
    frag: &Fragment<u8, M>,
    position: usize,
    wanted: usize,
) -> RlpResult<()> {
    if position + wanted > frag.len() {
        return Err(RlpError::UnexpectedEnd {
            offset: position,
            wanted,
        });
    }

    Ok(())
}

/// Decodes a fragment holding exactly one RLP list into its child headers.
///
/// The outer item must be a list and must cover the entire fragment; the
/// children must exactly fill the declared payload. More than `N` children
/// is an error.
pub fn decode_list<const M: usize, const N: usize>(
    frag: &Fragment<u8, M>,
) -> RlpResult<RlpList<N>> {
    let (outer, consumed) = decode_header(frag, 0)?;

    if outer.kind != RlpKind::List {
        return Err(RlpError::UnexpectedKind {
            expected: RlpKind::List,
            found: outer.kind,
            label: "List",
        });
    }
    if consumed != frag.len() {
        return Err(RlpError::TrailingBytes);
    }

    let mut headers: Fragment<RlpHeader, N> = Fragment::empty();
    let mut position = outer.offset;

    while position < outer.end() {
        let (child, used) = decode_header(frag, position)?;

        if headers.len() == N {
            return Err(RlpError::TooManyItems { max: N });
        }

        headers.push_back(child);
        position += used;
    }

    trace!(
        "decoded list of {} items over {} payload bytes",
        headers.len(),
        outer.length
    );

    Ok(RlpList {
        headers,
        payload: outer,
    })
}

/// The payload bytes a header describes.
///
/// # Panics
/// Panics if the header lies outside the fragment's window (headers must
/// come from decoding that same fragment).
pub fn item_slice<'a, const M: usize>(frag: &'a Fragment<u8, M>, header: &RlpHeader) -> &'a [u8] {
    assert!(
        header.end() <= frag.len(),
        "RLP header lies outside its fragment!"
    );

    &frag.as_slice()[header.offset..header.end()]
}

/// The full encoding span `(start, length)` of an item — prefix bytes plus
/// payload — reconstructed from its header. Canonical RLP makes the prefix
/// width a function of the payload alone.
pub fn encoded_span<const M: usize>(frag: &Fragment<u8, M>, header: &RlpHeader) -> (usize, usize) {
    let prefix_len = match header.kind {
        RlpKind::String if header.length == 1 && frag.at(header.offset) < 0x80 => 0,
        _ if header.length < 56 => 1,
        _ => 1 + be_length_width(header.length),
    };

    (header.offset - prefix_len, prefix_len + header.length)
}

/// Number of bytes in the minimal big-endian encoding of `length`.
const fn be_length_width(length: usize) -> usize {
    let mut width = 0;
    let mut rest = length;
    while rest > 0 {
        width += 1;
        rest >>= 8;
    }

    width
}

fn require_string(header: &RlpHeader, label: &'static str) -> RlpResult<()> {
    if header.kind != RlpKind::String {
        return Err(RlpError::UnexpectedKind {
            expected: RlpKind::String,
            found: header.kind,
            label,
        });
    }

    Ok(())
}

/// Reads a string item as a big-endian `u64`, stripping leading zeros.
/// An empty payload reads as zero.
pub fn read_u64<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    label: &'static str,
) -> RlpResult<u64> {
    require_string(header, label)?;

    let stripped = strip_leading_zeros(item_slice(frag, header));
    if stripped.len() > 8 {
        return Err(RlpError::IntegerOverflow { label });
    }

    Ok(stripped.iter().fold(0, |acc, b| (acc << 8) | *b as u64))
}

/// Checks that a string item equals the expected `u8`.
pub fn expect_u8<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    expected: u8,
    label: &'static str,
) -> RlpResult<()> {
    require_string(header, label)?;

    let stripped = strip_leading_zeros(item_slice(frag, header));
    if stripped.len() > 1 {
        return Err(RlpError::IntegerOverflow { label });
    }

    let value = stripped.first().copied().unwrap_or(0);
    if value != expected {
        return Err(RlpError::Mismatch { label });
    }

    Ok(())
}

/// Checks that a string item equals the expected `u64`.
pub fn expect_u64<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    expected: u64,
    label: &'static str,
) -> RlpResult<()> {
    if read_u64(frag, header, label)? != expected {
        return Err(RlpError::Mismatch { label });
    }

    Ok(())
}

/// Reads a string item as a big-endian `U256`, stripping leading zeros.
/// An empty payload reads as zero.
pub fn read_u256<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    label: &'static str,
) -> RlpResult<U256> {
    require_string(header, label)?;

    let stripped = strip_leading_zeros(item_slice(frag, header));
    if stripped.len() > 32 {
        return Err(RlpError::IntegerOverflow { label });
    }

    Ok(U256::from_big_endian(stripped))
}

/// Checks that a string item equals the expected `U256`.
pub fn expect_u256<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    expected: U256,
    label: &'static str,
) -> RlpResult<()> {
    if read_u256(frag, header, label)? != expected {
        return Err(RlpError::Mismatch { label });
    }

    Ok(())
}

/// Checks that a string item is exactly the expected 32 bytes. Roots and
/// hashes never shrink; use [`expect_bytes32_value`] for numeric storage
/// semantics.
pub fn expect_bytes32_exact<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    expected: H256,
    label: &'static str,
) -> RlpResult<()> {
    require_string(header, label)?;

    if header.length != 32 {
        return Err(RlpError::UnexpectedLength {
            label,
            length: header.length,
        });
    }
    if item_slice(frag, header) != expected.as_bytes() {
        return Err(RlpError::Mismatch { label });
    }

    Ok(())
}

/// Checks that a string item value-equals the expected 32-byte word under
/// left-zero-trimmed big-endian semantics. Storage values are stored
/// trimmed, so a shorter payload may still match.
pub fn expect_bytes32_value<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    expected: H256,
    label: &'static str,
) -> RlpResult<()> {
    require_string(header, label)?;

    if header.length > 32 {
        return Err(RlpError::UnexpectedLength {
            label,
            length: header.length,
        });
    }

    let stripped = strip_leading_zeros(item_slice(frag, header));
    if stripped != strip_leading_zeros(expected.as_bytes()) {
        return Err(RlpError::Mismatch { label });
    }

    Ok(())
}

/// Checks that a string item's payload equals the expected bytes.
pub fn expect_bytes<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    expected: &[u8],
    label: &'static str,
) -> RlpResult<()> {
    require_string(header, label)?;

    if item_slice(frag, header) != expected {
        return Err(RlpError::Mismatch { label });
    }

    Ok(())
}

/// Checks that a string item is exactly the expected 20-byte address.
pub fn expect_address<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    expected: H160,
    label: &'static str,
) -> RlpResult<()> {
    require_string(header, label)?;

    if header.length != 20 {
        return Err(RlpError::UnexpectedLength {
            label,
            length: header.length,
        });
    }
    if item_slice(frag, header) != expected.as_bytes() {
        return Err(RlpError::Mismatch { label });
    }

    Ok(())
}

/// Reads a string item as a 32-byte word.
pub fn read_bytes32<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    label: &'static str,
) -> RlpResult<H256> {
    require_string(header, label)?;

    if header.length != 32 {
        return Err(RlpError::UnexpectedLength {
            label,
            length: header.length,
        });
    }

    Ok(H256::from_slice(item_slice(frag, header)))
}

/// Reads a string item as a 20-byte address.
pub fn read_address<const M: usize>(
    frag: &Fragment<u8, M>,
    header: &RlpHeader,
    label: &'static str,
) -> RlpResult<H160> {
    require_string(header, label)?;

    if header.length != 20 {
        return Err(RlpError::UnexpectedLength {
            label,
            length: header.length,
        });
    }

    Ok(H160::from_slice(item_slice(frag, header)))
}

#[cfg(test)]
mod tests {
    use ethereum_types::{H256, U256};
    use hex_literal::hex;

    use super::*;

    type Frag = Fragment<u8, 128>;

    fn frag(bytes: &[u8]) -> Frag {
        Fragment::from_slice(bytes).unwrap()
    }

    #[test]
    fn single_byte_decodes_in_place() {
        let (header, consumed) = decode_header(&frag(&[0x42]), 0).unwrap();

        assert_eq!(
            header,
            RlpHeader {
                offset: 0,
                length: 1,
                kind: RlpKind::String
            }
        );
        assert_eq!(consumed, 1);
    }

    #[test]
    fn empty_string_decodes_to_zero_length() {
        let (header, consumed) = decode_header(&frag(&[0x80]), 0).unwrap();

        assert_eq!(header.length, 0);
        assert_eq!(header.kind, RlpKind::String);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn short_string_dog() {
        let buf = frag(&hex!("83646f67"));
        let (header, consumed) = decode_header(&buf, 0).unwrap();

        assert_eq!(header.kind, RlpKind::String);
        assert_eq!(item_slice(&buf, &header), b"dog");
        assert_eq!(consumed, 4);
    }

    #[test]
    fn list_of_one_string() {
        let buf = frag(&hex!("c3826162"));
        let list: RlpList<4> = decode_list(&buf).unwrap();

        assert_eq!(list.len(), 1);
        let child = list.at(0);
        assert_eq!(child.kind, RlpKind::String);
        assert_eq!(item_slice(&buf, &child), b"ab");
    }

    #[test]
    fn long_string_needs_56_bytes() {
        let mut encoded = vec![0xb8, 56];
        encoded.extend(std::iter::repeat(0xaa).take(56));
        let (header, consumed) = decode_header(&frag(&encoded), 0).unwrap();

        assert_eq!(header.length, 56);
        assert_eq!(header.offset, 2);
        assert_eq!(consumed, 58);
    }

    #[test]
    fn long_form_below_56_is_rejected() {
        let mut encoded = vec![0xb8, 55];
        encoded.extend(std::iter::repeat(0xaa).take(55));

        assert_eq!(
            decode_header(&frag(&encoded), 0),
            Err(RlpError::NonCanonicalLongLength(55))
        );
    }

    #[test]
    fn wrapped_single_byte_is_rejected() {
        assert_eq!(
            decode_header(&frag(&[0x81, 0x7f]), 0),
            Err(RlpError::NonCanonicalSingleByte)
        );
        // 0x80 itself genuinely needs the wrapper.
        assert!(decode_header(&frag(&[0x81, 0x80]), 0).is_ok());
    }

    #[test]
    fn leading_zero_length_of_length_is_rejected() {
        let mut encoded = vec![0xb9, 0x00, 0x38];
        encoded.extend(std::iter::repeat(0xaa).take(56));

        assert_eq!(
            decode_header(&frag(&encoded), 0),
            Err(RlpError::LeadingZeroLength)
        );
    }

    #[test]
    fn truncated_items_are_rejected() {
        assert!(matches!(
            decode_header(&frag(&[0x83, 0x64, 0x6f]), 0),
            Err(RlpError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            decode_header(&frag(&[]), 0),
            Err(RlpError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn decode_list_rejects_non_lists_and_trailing_bytes() {
        assert!(matches!(
            decode_list::<128, 4>(&frag(&[0x83, 0x64, 0x6f, 0x67])),
            Err(RlpError::UnexpectedKind { .. })
        ));
        assert_eq!(
            decode_list::<128, 4>(&frag(&[0xc1, 0x01, 0xff])),
            Err(RlpError::TrailingBytes)
        );
    }

    #[test]
    fn decode_list_rejects_overfull_lists() {
        let buf = frag(&[0xc3, 0x01, 0x02, 0x03]);

        assert_eq!(
            decode_list::<128, 2>(&buf),
            Err(RlpError::TooManyItems { max: 2 })
        );
        assert_eq!(decode_list::<128, 3>(&buf).unwrap().len(), 3);
    }

    #[test]
    fn merge_requires_same_kind_and_adjacency() {
        let a = RlpHeader {
            offset: 1,
            length: 3,
            kind: RlpKind::String,
        };
        let b = RlpHeader {
            offset: 4,
            length: 2,
            kind: RlpKind::String,
        };

        assert_eq!(
            a.merge(b).unwrap(),
            RlpHeader {
                offset: 1,
                length: 5,
                kind: RlpKind::String
            }
        );

        let list_b = RlpHeader {
            kind: RlpKind::List,
            ..b
        };
        assert_eq!(a.merge(list_b), Err(RlpError::MergeKindMismatch));

        let gapped = RlpHeader {
            offset: 5,
            length: 2,
            kind: RlpKind::String,
        };
        assert!(matches!(
            a.merge(gapped),
            Err(RlpError::MergeNotAdjacent { .. })
        ));
    }

    #[test]
    fn encoded_span_recovers_the_prefix() {
        let buf = frag(&[0xc3, 0x82, 0x61, 0x62]);
        let list: RlpList<4> = decode_list(&buf).unwrap();

        assert_eq!(encoded_span(&buf, &list.at(0)), (1, 3));

        // An in-place single byte has no prefix.
        let buf = frag(&[0xc1, 0x42]);
        let list: RlpList<4> = decode_list(&buf).unwrap();
        assert_eq!(encoded_span(&buf, &list.at(0)), (1, 1));
    }

    #[test]
    fn read_u64_strips_leading_zeros_and_rejects_overflow() {
        let buf = frag(&[0xc5, 0x83, 0x00, 0x12, 0x34]);
        let list: RlpList<4> = decode_list(&buf).unwrap();

        assert_eq!(read_u64(&buf, &list.at(0), "Value").unwrap(), 0x1234);

        let mut wide = vec![0xca, 0x89];
        wide.extend([0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
        let buf = frag(&wide);
        let list: RlpList<4> = decode_list(&buf).unwrap();
        assert_eq!(
            read_u64(&buf, &list.at(0), "Value"),
            Err(RlpError::IntegerOverflow { label: "Value" })
        );
    }

    #[test]
    fn expect_u64_empty_payload_is_zero() {
        let buf = frag(&[0xc1, 0x80]);
        let list: RlpList<4> = decode_list(&buf).unwrap();

        assert!(expect_u64(&buf, &list.at(0), 0, "Nonce").is_ok());
        assert_eq!(
            expect_u64(&buf, &list.at(0), 1, "Nonce"),
            Err(RlpError::Mismatch { label: "Nonce" })
        );
    }

    #[test]
    fn expect_u256_compares_numerically() {
        let buf = frag(&[0xc3, 0x82, 0x01, 0x00]);
        let list: RlpList<4> = decode_list(&buf).unwrap();

        assert!(expect_u256(&buf, &list.at(0), U256::from(256), "Balance").is_ok());
        assert_eq!(
            expect_u256(&buf, &list.at(0), U256::from(255), "Balance"),
            Err(RlpError::Mismatch { label: "Balance" })
        );
    }

    #[test]
    fn expect_bytes32_exact_requires_full_width() {
        let word = H256::repeat_byte(0xab);
        let mut encoded = vec![0xe1, 0xa0];
        encoded.extend_from_slice(word.as_bytes());
        let buf = frag(&encoded);
        let list: RlpList<4> = decode_list(&buf).unwrap();

        assert!(expect_bytes32_exact(&buf, &list.at(0), word, "Storage Hash").is_ok());
        assert_eq!(
            expect_bytes32_exact(&buf, &list.at(0), H256::zero(), "Storage Hash"),
            Err(RlpError::Mismatch {
                label: "Storage Hash"
            })
        );

        let short = frag(&[0xc2, 0x81, 0xab]);
        let list: RlpList<4> = decode_list(&short).unwrap();
        assert_eq!(
            expect_bytes32_exact(&short, &list.at(0), word, "Storage Hash"),
            Err(RlpError::UnexpectedLength {
                label: "Storage Hash",
                length: 1
            })
        );
    }

    #[test]
    fn expect_bytes32_value_accepts_trimmed_forms() {
        let buf = frag(&[0xc2, 0x81, 0xab]);
        let list: RlpList<4> = decode_list(&buf).unwrap();

        let mut expected = H256::zero();
        expected.0[31] = 0xab;
        assert!(expect_bytes32_value(&buf, &list.at(0), expected, "Storage Value").is_ok());
        assert_eq!(
            expect_bytes32_value(&buf, &list.at(0), H256::zero(), "Storage Value"),
            Err(RlpError::Mismatch {
                label: "Storage Value"
            })
        );
    }

    #[test]
    fn expect_helpers_reject_lists() {
        let buf = frag(&[0xc2, 0xc1, 0x01]);
        let list: RlpList<4> = decode_list(&buf).unwrap();

        assert_eq!(
            expect_u64(&buf, &list.at(0), 1, "Nonce"),
            Err(RlpError::UnexpectedKind {
                expected: RlpKind::String,
                found: RlpKind::List,
                label: "Nonce"
            })
        );
    }
}
