//! Fixture builders for the entity verifiers. Every trie is assembled from
//! real node encodings and its root computed with keccak at test run time.

use ethereum_types::H256;
use keccak_hash::keccak;
use rlp::RlpStream;

pub(crate) fn common_setup() {
    // Try init since multiple tests calling `init` will cause an error.
    let _ = pretty_env_logger::try_init();
}

/// Expands a key into its nibble stream.
pub(crate) fn key_nibbles(key: &[u8]) -> Vec<u8> {
    key.iter().flat_map(|b| [b >> 4, b & 0x0f]).collect()
}

/// Packs a nibble path into its hex prefix encoding.
pub(crate) fn hex_prefix_encode(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
    let is_odd = nibbles.len() % 2 == 1;
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

/// A trie holding a single entry: one leaf node carrying the key's entire
/// nibble path. Returns the root and the proof node list.
pub(crate) fn single_leaf_trie(key: &[u8], value: &[u8]) -> (H256, Vec<Vec<u8>>) {
    let mut stream = RlpStream::new_list(2);
    stream.append(&hex_prefix_encode(&key_nibbles(key), true));
    stream.append(&value);
    let leaf = stream.out().to_vec();

    let root = keccak(&leaf);
    (root, vec![leaf])
}
