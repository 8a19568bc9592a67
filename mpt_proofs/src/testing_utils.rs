//! Builders for handmade trie fixtures. Roots are always computed with the
//! real hash function at test run time, never written down by hand.

use keccak_hash::keccak;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use rlp::RlpStream;

use crate::utils::is_even;

pub(crate) fn common_setup() {
    // Try init since multiple tests calling `init` will cause an error.
    let _ = pretty_env_logger::try_init();
}

/// How one node references a child: unset, by hash, or embedded raw.
#[derive(Clone, Debug, Default)]
pub(crate) enum ChildRef {
    #[default]
    Empty,
    Hash([u8; 32]),
    Inline(Vec<u8>),
}

/// The reference a parent stores for an encoded child node: hashed when the
/// encoding is 32 bytes or more, embedded otherwise.
pub(crate) fn node_ref(encoded: &[u8]) -> ChildRef {
    match encoded.len() >= 32 {
        true => ChildRef::Hash(keccak(encoded).0),
        false => ChildRef::Inline(encoded.to_vec()),
    }
}

fn append_child(stream: &mut RlpStream, child: &ChildRef) {
    match child {
        ChildRef::Empty => stream.append_empty_data(),
        ChildRef::Hash(h) => stream.append(&h.as_ref()),
        ChildRef::Inline(raw) => stream.append_raw(raw, 1),
    };
}

/// Packs a nibble path into its hex prefix encoding.
pub(crate) fn hex_prefix_encode(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
    let is_odd = !is_even(nibbles.len());
    let flags = (((is_leaf as u8) << 1) | is_odd as u8) << 4;

    let mut out = Vec::with_capacity(1 + nibbles.len() / 2);
    let rest = match is_odd {
        true => {
            out.push(flags | nibbles[0]);
            &nibbles[1..]
        }
        false => {
            out.push(flags);
            nibbles
        }
    };
    for pair in rest.chunks(2) {
        out.push((pair[0] << 4) | pair[1]);
    }

    out
}

/// RLP-encodes a leaf node carrying the given path nibbles and value.
pub(crate) fn leaf_node(path: &[u8], value: &[u8]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(2);
    stream.append(&hex_prefix_encode(path, true));
    stream.append(&value);

    stream.out().to_vec()
}

/// RLP-encodes an extension node compressing the given path nibbles.
pub(crate) fn extension_node(path: &[u8], child: &ChildRef) -> Vec<u8> {
    let mut stream = RlpStream::new_list(2);
    stream.append(&hex_prefix_encode(path, false));
    append_child(&mut stream, child);

    stream.out().to_vec()
}

/// RLP-encodes a branch node from 16 child references and an optional value.
pub(crate) fn branch_node(children: &[ChildRef; 16], value: Option<&[u8]>) -> Vec<u8> {
    let mut stream = RlpStream::new_list(17);
    for child in children {
        append_child(&mut stream, child);
    }
    match value {
        Some(v) => stream.append(&v),
        None => stream.append_empty_data(),
    };

    stream.out().to_vec()
}

/// Expands a key into its nibble stream.
pub(crate) fn key_nibbles(key: &[u8]) -> Vec<u8> {
    key.iter().flat_map(|b| [b >> 4, b & 0x0f]).collect()
}

/// Seeded random `(key, value)` entries for cross-validation against an
/// independent trie implementation.
pub(crate) fn generate_random_entries(
    n: usize,
    seed: u64,
) -> impl Iterator<Item = ([u8; 32], Vec<u8>)> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..n).map(move |_| {
        let mut key = [0_u8; 32];
        rng.fill_bytes(&mut key);

        let len = rng.gen_range(1..40);
        let value: Vec<u8> = (0..len).map(|_| rng.gen()).collect();

        (key, value)
    })
}
