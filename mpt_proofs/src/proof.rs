//! Merkle Patricia Trie proof verification.
//!
//! [`verify_merkle_proof`] walks a chain of RLP-encoded trie nodes from a
//! trusted root hash down to a terminal node, consuming the key's nibble
//! stream through branch and extension nodes and finally comparing the
//! proven value. Every link is authenticated: a 32-byte child is the keccak
//! hash of the next node, while a child shorter than 32 bytes embeds the
//! next node's bytes directly (an inline node) and is byte-compared instead
//! of hashed.
//!
//! Verification either succeeds completely or fails with the first broken
//! link; nothing is learned from a failed proof beyond its error.

use ethereum_types::H256;
use keccak_hash::keccak;
use log::trace;
use thiserror::Error;
use verifier_common::MAX_NODE_LENGTH;

use crate::fragment::{Fragment, FragmentError};
use crate::nibbles::{
    bytes_to_nibbles, from_hex_prefix_encoding, FromHexPrefixError, Nibble, NibblesError,
};
use crate::rlp::{decode_list, encoded_span, item_slice, RlpError, RlpHeader, RlpKind, RlpList};

/// Upper bound on a key's nibble expansion: trie keys are at most 32 bytes
/// (keccak digests), so 64 nibbles.
pub const MAX_KEY_NIBBLES: usize = 64;

/// Number of children in a branch node, including the value slot.
const BRANCH_ARITY: usize = 17;

/// One RLP-encoded trie node in a fixed-capacity buffer.
pub type ProofNode = Fragment<u8, MAX_NODE_LENGTH>;

/// An error type for Merkle proof verification.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ProofError {
    /// The proof carries no nodes at all.
    #[error("Proof carries no nodes")]
    EmptyProof,

    /// The proof is deeper than the declared maximum.
    #[error("Proof depth {depth} exceeds the maximum of {max}")]
    DepthOverflow {
        /// Number of intermediate nodes supplied.
        depth: usize,
        /// Maximum number of intermediate nodes accepted.
        max: usize,
    },

    /// A node or value buffer exceeded its capacity bound.
    #[error(transparent)]
    Fragment(#[from] FragmentError),

    /// A node failed to decode as canonical RLP.
    #[error(transparent)]
    Rlp(#[from] RlpError),

    /// The key failed to expand into nibbles.
    #[error(transparent)]
    Nibbles(#[from] NibblesError),

    /// An encoded path failed to decode.
    #[error(transparent)]
    HexPrefix(#[from] FromHexPrefixError),

    /// A node's hash does not equal the link that referenced it.
    #[error("Node hash does not match its parent link (depth: {depth})")]
    HashMismatch {
        /// Number of nodes consumed when the mismatch was found.
        depth: usize,
    },

    /// A branch child was empty while key nibbles remained.
    #[error("Branch child for nibble {nibble:#x} is empty with key nibbles remaining (depth: {depth})")]
    EmptyChild {
        /// The nibble that selected the child.
        nibble: Nibble,
        /// Number of nodes consumed at the branch.
        depth: usize,
    },

    /// A child reference was neither empty, a hash, nor an embedded node.
    #[error("Child reference has an invalid length of {length} bytes (depth: {depth})")]
    InvalidChildLength {
        /// Payload length of the child item.
        length: usize,
        /// Number of nodes consumed at the parent.
        depth: usize,
    },

    /// An embedded child was long enough that it must be hash-referenced.
    #[error("Inline node of {length} bytes should be hash-referenced (depth: {depth})")]
    InlineNodeTooLong {
        /// Encoded length of the embedded child.
        length: usize,
        /// Number of nodes consumed at the parent.
        depth: usize,
    },

    /// A path nibble disagreed with the key.
    #[error("Path nibble does not match the key (key position: {position})")]
    PathMismatch {
        /// Key nibble position at which the disagreement was found.
        position: usize,
    },

    /// A decoded node was neither a branch nor a two-item node.
    #[error("Trie node has an invalid arity of {arity} (depth: {depth})")]
    InvalidNodeArity {
        /// Number of children decoded.
        arity: usize,
        /// Number of nodes consumed at the node.
        depth: usize,
    },

    /// The key was exhausted before reaching the terminal node.
    #[error("Key exhausted before the terminal node (depth: {depth})")]
    KeyOverConsumed {
        /// Number of nodes consumed when the key ran out.
        depth: usize,
    },

    /// The terminal node left key nibbles unconsumed.
    #[error("Terminal node reached with {remaining} key nibbles unconsumed")]
    KeyUnderConsumed {
        /// Number of key nibbles left over.
        remaining: usize,
    },

    /// A leaf-flagged path appeared in an intermediate node.
    #[error("Terminal node found among intermediate proof nodes (depth: {depth})")]
    UnexpectedTerminal {
        /// Number of nodes consumed at the offending node.
        depth: usize,
    },

    /// An extension-flagged path appeared in the terminal node.
    #[error("Extension path found in the terminal node")]
    TerminalExtension,

    /// The terminal node carries a different value than claimed.
    #[error("Value does not match the proven leaf value")]
    ValueMismatch,
}

/// A trie proof: up to `DEPTH` intermediate nodes walked root-first, plus
/// the terminal node. The terminal is stored separately because its length
/// bound is key-dependent and differs from intermediate nodes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MptProof<const DEPTH: usize, const LEAF_LEN: usize> {
    nodes: [ProofNode; DEPTH],
    leaf: Fragment<u8, LEAF_LEN>,
    depth: usize,
}

impl<const DEPTH: usize, const LEAF_LEN: usize> MptProof<DEPTH, LEAF_LEN> {
    /// Splits a root-to-leaf list of RLP-encoded nodes into intermediate
    /// nodes and the terminal node.
    ///
    /// Rejects empty input, more than `DEPTH` intermediate nodes, and any
    /// node exceeding its capacity bound.
    pub fn from_rlp_nodes<T: AsRef<[u8]>>(rlp_nodes: &[T]) -> Result<Self, ProofError> {
        let (leaf_bytes, intermediate) = rlp_nodes.split_last().ok_or(ProofError::EmptyProof)?;

        if intermediate.len() > DEPTH {
            return Err(ProofError::DepthOverflow {
                depth: intermediate.len(),
                max: DEPTH,
            });
        }

        let mut nodes = [ProofNode::empty(); DEPTH];
        for (i, node) in intermediate.iter().enumerate() {
            nodes[i] = Fragment::from_slice(node.as_ref())?;
        }

        Ok(Self {
            nodes,
            leaf: Fragment::from_slice(leaf_bytes.as_ref())?,
            depth: intermediate.len(),
        })
    }

    /// Number of intermediate nodes.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The intermediate node at `d`.
    ///
    /// # Panics
    /// Panics if `d >= depth()`.
    pub fn node(&self, d: usize) -> &ProofNode {
        assert!(d < self.depth, "Proof node index out of range!");
        &self.nodes[d]
    }

    /// The terminal node.
    pub const fn leaf(&self) -> &Fragment<u8, LEAF_LEN> {
        &self.leaf
    }
}

/// A key/value claim together with the proof backing it. `KEY_LEN` bounds
/// the key bytes (whose nibble expansion is the trie path), `VALUE_LEN` the
/// claimed value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProofInput<
    const KEY_LEN: usize,
    const VALUE_LEN: usize,
    const DEPTH: usize,
    const LEAF_LEN: usize,
> {
    /// Key bytes; the trie path is their nibble expansion.
    pub key: Fragment<u8, KEY_LEN>,
    /// The claimed value bytes.
    pub value: Fragment<u8, VALUE_LEN>,
    /// The proof chain.
    pub proof: MptProof<DEPTH, LEAF_LEN>,
}

impl<const KEY_LEN: usize, const VALUE_LEN: usize, const DEPTH: usize, const LEAF_LEN: usize>
    ProofInput<KEY_LEN, VALUE_LEN, DEPTH, LEAF_LEN>
{
    /// Builds a proof input, bounds-validating the key and value.
    pub fn new(
        key: &[u8],
        value: &[u8],
        proof: MptProof<DEPTH, LEAF_LEN>,
    ) -> Result<Self, ProofError> {
        Ok(Self {
            key: Fragment::from_slice(key)?,
            value: Fragment::from_slice(value)?,
            proof,
        })
    }
}

/// The authenticated link to the next node in the walk: either the keccak
/// hash of its encoding, or — for nodes shorter than 32 bytes — the encoding
/// itself, embedded in the parent.
#[derive(Clone, Debug)]
enum Link {
    Hash(H256),
    Inline(ProofNode),
}

/// Verifies that `input.key` maps to `input.value` in the trie whose root
/// hash is `root`.
///
/// Walks `input.proof` from the root: each hash link consumes the next
/// intermediate node, each inline link descends into bytes embedded in the
/// parent, and the terminal node must consume the remaining key exactly and
/// carry the claimed value.
pub fn verify_merkle_proof<
    const KEY_LEN: usize,
    const VALUE_LEN: usize,
    const DEPTH: usize,
    const LEAF_LEN: usize,
>(
    input: &ProofInput<KEY_LEN, VALUE_LEN, DEPTH, LEAF_LEN>,
    root: H256,
) -> Result<(), ProofError> {
    let key_nibbles: Fragment<Nibble, MAX_KEY_NIBBLES> = bytes_to_nibbles(&input.key)?;
    let mut cursor = 0_usize;
    let mut depth = 0_usize;
    let mut link = Link::Hash(root);

    loop {
        let node = match &link {
            Link::Hash(expected) => {
                if depth == input.proof.depth() {
                    break;
                }

                let node = input.proof.node(depth);
                if keccak(node.as_slice()) != *expected {
                    return Err(ProofError::HashMismatch { depth });
                }
                depth += 1;

                *node
            }
            Link::Inline(embedded) => {
                // Once the intermediate nodes are exhausted, an embedded
                // link matching the terminal node ends the walk.
                if depth == input.proof.depth()
                    && embedded.as_slice() == input.proof.leaf().as_slice()
                {
                    break;
                }

                *embedded
            }
        };

        trace!(
            "descending trie node (depth: {}, key position: {})",
            depth,
            cursor
        );
        link = descend_node(&node, &key_nibbles, &mut cursor, depth)?;
    }

    if let Link::Hash(expected) = link {
        if keccak(input.proof.leaf().as_slice()) != expected {
            return Err(ProofError::HashMismatch { depth });
        }
    }

    verify_terminal(
        input.proof.leaf(),
        &key_nibbles,
        cursor,
        &input.value,
        depth,
    )
}

/// Processes one intermediate node, advancing the key cursor and returning
/// the link to the next node.
fn descend_node(
    node: &ProofNode,
    key: &Fragment<Nibble, MAX_KEY_NIBBLES>,
    cursor: &mut usize,
    depth: usize,
) -> Result<Link, ProofError> {
    let list: RlpList<BRANCH_ARITY> = decode_list(node)?;

    match list.len() {
        BRANCH_ARITY => {
            if *cursor >= key.len() {
                return Err(ProofError::KeyOverConsumed { depth });
            }

            let nibble = key.at(*cursor);
            *cursor += 1;

            let child = list.at(nibble as usize);
            if child.kind == RlpKind::String && child.length == 0 {
                return Err(ProofError::EmptyChild { nibble, depth });
            }

            child_link(node, &child, depth)
        }
        2 => {
            let (path, is_leaf) = decode_path(node, &list.at(0))?;
            if is_leaf {
                return Err(ProofError::UnexpectedTerminal { depth });
            }

            consume_path(&path, key, cursor)?;
            child_link(node, &list.at(1), depth)
        }
        arity => Err(ProofError::InvalidNodeArity { arity, depth }),
    }
}

/// Checks the terminal node: it must consume the remaining key exactly and
/// carry the claimed value — either as a leaf's second item or, when the key
/// ends at a branch, in the branch's value slot.
fn verify_terminal<const LEAF_LEN: usize, const VALUE_LEN: usize>(
    leaf: &Fragment<u8, LEAF_LEN>,
    key: &Fragment<Nibble, MAX_KEY_NIBBLES>,
    mut cursor: usize,
    value: &Fragment<u8, VALUE_LEN>,
    depth: usize,
) -> Result<(), ProofError> {
    let list: RlpList<BRANCH_ARITY> = decode_list(leaf)?;

    let value_header = match list.len() {
        2 => {
            let (path, is_leaf) = decode_path(leaf, &list.at(0))?;
            if !is_leaf {
                return Err(ProofError::TerminalExtension);
            }

            consume_path(&path, key, &mut cursor)?;
            list.at(1)
        }
        BRANCH_ARITY => list.at(BRANCH_ARITY - 1),
        arity => return Err(ProofError::InvalidNodeArity { arity, depth }),
    };

    if cursor != key.len() {
        return Err(ProofError::KeyUnderConsumed {
            remaining: key.len() - cursor,
        });
    }

    if value_header.kind != RlpKind::String {
        return Err(ProofError::Rlp(RlpError::UnexpectedKind {
            expected: RlpKind::String,
            found: value_header.kind,
            label: "Leaf Value",
        }));
    }
    if item_slice(leaf, &value_header) != value.as_slice() {
        return Err(ProofError::ValueMismatch);
    }

    Ok(())
}

/// Decodes the hex prefix encoded path of a two-item node.
fn decode_path<const M: usize>(
    node: &Fragment<u8, M>,
    header: &RlpHeader,
) -> Result<(Fragment<Nibble, MAX_KEY_NIBBLES>, bool), ProofError> {
    if header.kind != RlpKind::String {
        return Err(ProofError::Rlp(RlpError::UnexpectedKind {
            expected: RlpKind::String,
            found: header.kind,
            label: "Encoded Path",
        }));
    }

    let encoded = node.sub_fragment(header.offset, header.length);
    Ok(from_hex_prefix_encoding(&encoded)?)
}

/// Matches a path against the key at the cursor, nibble by nibble.
fn consume_path(
    path: &Fragment<Nibble, MAX_KEY_NIBBLES>,
    key: &Fragment<Nibble, MAX_KEY_NIBBLES>,
    cursor: &mut usize,
) -> Result<(), ProofError> {
    for i in 0..path.len() {
        if *cursor >= key.len() || key.at(*cursor) != path.at(i) {
            return Err(ProofError::PathMismatch { position: *cursor });
        }
        *cursor += 1;
    }

    Ok(())
}

/// Interprets a child item as the link to the next node. A 32-byte string is
/// a hash link; an embedded list shorter than 32 bytes is an inline link.
fn child_link(node: &ProofNode, child: &RlpHeader, depth: usize) -> Result<Link, ProofError> {
    match child.kind {
        RlpKind::String => {
            if child.length != 32 {
                return Err(ProofError::InvalidChildLength {
                    length: child.length,
                    depth,
                });
            }

            Ok(Link::Hash(H256::from_slice(item_slice(node, child))))
        }
        RlpKind::List => {
            let (start, length) = encoded_span(node, child);
            if length >= 32 {
                return Err(ProofError::InlineNodeTooLong { length, depth });
            }

            Ok(Link::Inline(node.sub_fragment(start, length)))
        }
    }
}
