//! Constants shared by the proof verification crates: well-known hashes,
//! fork activation heights and the capacity limits that bound every
//! untrusted input buffer.

use ethereum_types::H256;

/// The hash value of an account empty EVM code.
/// 0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470
pub const EMPTY_CODE_HASH: H256 = H256([
    197, 210, 70, 1, 134, 247, 35, 60, 146, 126, 125, 178, 220, 199, 3, 192, 229, 0, 182, 83, 202,
    130, 39, 59, 123, 250, 216, 4, 93, 133, 164, 112,
]);

/// The hash of an empty Merkle Patricia trie.
/// 0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421
pub const EMPTY_TRIE_HASH: H256 = H256([
    86, 232, 31, 23, 27, 204, 85, 166, 255, 131, 69, 230, 146, 192, 248, 110, 91, 72, 224, 27, 153,
    108, 173, 192, 1, 98, 47, 181, 227, 99, 180, 33,
]);

/// Ethereum mainnet chain id.
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Sepolia testnet chain id.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// First mainnet block of the Byzantium fork. Receipts switch from a state
/// root to a status byte at this height.
pub const MAINNET_BYZANTIUM_BLOCK_NUMBER: u64 = 4_370_000;

/// First mainnet block of the London fork (adds `baseFeePerGas` to headers).
pub const MAINNET_LONDON_BLOCK_NUMBER: u64 = 12_965_000;

/// First mainnet block of the Shanghai fork (adds `withdrawalsRoot`).
pub const MAINNET_SHANGHAI_BLOCK_NUMBER: u64 = 17_034_870;

/// First mainnet block of the Cancun fork (adds `blobGasUsed`,
/// `excessBlobGas` and `parentBeaconBlockRoot`).
pub const MAINNET_CANCUN_BLOCK_NUMBER: u64 = 19_426_587;

/// First Sepolia block of the Shanghai fork.
pub const SEPOLIA_SHANGHAI_BLOCK_NUMBER: u64 = 2_990_908;

/// First Sepolia block of the Cancun fork.
pub const SEPOLIA_CANCUN_BLOCK_NUMBER: u64 = 4_776_000;

/// Upper bound on the RLP encoding of a block header (a Cancun mainnet
/// header with a maximal extra-data field).
pub const MAX_HEADER_RLP_LENGTH: usize = 709;

/// Number of fields in a Cancun block header, the largest layout supported.
pub const MAX_HEADER_FIELDS_COUNT: usize = 20;

/// Upper bound on one RLP-encoded trie node: a branch holds 17 child
/// strings of up to 33 bytes each plus the list prefix.
pub const MAX_NODE_LENGTH: usize = 532;

/// Maximum number of intermediate nodes in a state-trie account proof.
pub const MAX_ACCOUNT_PROOF_DEPTH: usize = 11;

/// Upper bound on the RLP list `(nonce, balance, storage_hash, code_hash)`.
pub const MAX_ACCOUNT_STATE_LENGTH: usize = 110;

/// Upper bound on the leaf node terminating an account proof.
pub const MAX_ACCOUNT_LEAF_LENGTH: usize = 148;

/// Maximum number of intermediate nodes in a storage-trie proof.
pub const MAX_STORAGE_PROOF_DEPTH: usize = 6;

/// Upper bound on an RLP-encoded storage value (32 bytes plus the string
/// prefix).
pub const MAX_STORAGE_VALUE_LENGTH: usize = 33;

/// Upper bound on the leaf node terminating a storage proof.
pub const MAX_STORAGE_LEAF_LENGTH: usize = 69;

/// Upper bound on an RLP-encoded transaction index, the key into the
/// transaction and receipt tries.
pub const MAX_TRIE_INDEX_KEY_LENGTH: usize = 3;

/// Maximum number of intermediate nodes in a transactions-trie proof.
pub const MAX_TX_PROOF_DEPTH: usize = 7;

/// Upper bound on an encoded transaction carried as a trie value.
pub const MAX_TX_ENCODED_LENGTH: usize = 4096;

/// Upper bound on the leaf node terminating a transaction proof.
pub const MAX_TX_LEAF_LENGTH: usize = 4112;

/// Maximum number of intermediate nodes in a receipts-trie proof.
pub const MAX_RECEIPT_PROOF_DEPTH: usize = 7;

/// Upper bound on an encoded receipt carried as a trie value.
pub const MAX_RECEIPT_ENCODED_LENGTH: usize = 4096;

/// Upper bound on the leaf node terminating a receipt proof.
pub const MAX_RECEIPT_LEAF_LENGTH: usize = 4112;

/// Byte length of the logs bloom filter.
pub const BLOOM_FILTER_LENGTH: usize = 256;

/// Number of fields in an RLP-encoded log: address, topics, data.
pub const LOG_FIELDS_COUNT: usize = 3;

/// Maximum number of logs a verified receipt may carry.
pub const MAX_LOGS_COUNT: usize = 64;

/// Maximum number of topics per log (one event signature plus three
/// indexed parameters).
pub const MAX_LOG_TOPICS_COUNT: usize = 4;

/// Number of fields in the largest transaction layout (EIP-4844).
pub const MAX_TX_FIELDS_COUNT: usize = 14;

/// Number of fields in an RLP-encoded receipt.
pub const RECEIPT_FIELDS_COUNT: usize = 4;

#[test]
fn test_empty_code_hash() {
    assert_eq!(EMPTY_CODE_HASH, keccak_hash::keccak([]));
}

#[test]
fn test_empty_trie_hash() {
    assert_eq!(EMPTY_TRIE_HASH, keccak_hash::keccak(rlp::NULL_RLP));
}
