//! Derivation of trie keys from record identifiers.
//!
//! State and storage tries key by the keccak digest of the identifier;
//! transaction and receipt tries key by the RLP encoding of the index.

use keccak_hash::keccak;
use mpt_proofs::fragment::Fragment;
use verifier_common::MAX_TRIE_INDEX_KEY_LENGTH;

use crate::VerifierResult;

/// The state/storage trie key for an identifier: its keccak digest.
pub fn keccak_key(identifier: &[u8]) -> Fragment<u8, 32> {
    Fragment::from_array(keccak(identifier).0)
}

/// The transaction/receipt trie key for an index: its RLP encoding.
///
/// Indexes whose encoding exceeds the key bound (blocks never hold that
/// many transactions) are rejected.
pub fn index_key(index: u64) -> VerifierResult<Fragment<u8, MAX_TRIE_INDEX_KEY_LENGTH>> {
    Ok(Fragment::from_slice(&rlp::encode(&index))?)
}
