//! Verification of Ethereum entities against trusted roots.
//!
//! Each entry point takes a typed record, the proof backing it and the root
//! it must anchor to: accounts and storage slots against a state root or
//! storage hash, transactions and receipts against their per-block tries,
//! and block headers against a block hash. Field checks run before the trie
//! walk, so a mismatched claim fails with the label of the offending field
//! rather than a generic proof error.

#![deny(rustdoc::broken_intra_doc_links)]

use mpt_proofs::fragment::FragmentError;
use mpt_proofs::proof::ProofError;
use mpt_proofs::rlp::RlpError;
use thiserror::Error;

pub mod account;
pub mod header;
pub mod keys;
pub mod receipt;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing_utils;

/// Stores the result of entity verification. Returns a [`VerifierError`]
/// upon failure.
pub type VerifierResult<T> = Result<T, VerifierError>;

/// An error type for entity verification. Verification yields nothing
/// beyond the failing label; there are no retryable variants.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum VerifierError {
    /// The trie walk failed against the given root.
    #[error("{label} proof does not verify: {source}")]
    Proof {
        /// Which root the proof was checked against.
        label: &'static str,
        /// The failing step of the walk.
        source: ProofError,
    },

    /// A field of the proven value failed to decode or match.
    #[error(transparent)]
    Rlp(#[from] RlpError),

    /// An input buffer exceeded its capacity bound.
    #[error(transparent)]
    Fragment(#[from] FragmentError),

    /// The proof's key is not derived from the record's identifier.
    #[error("Proof key is not derived from the {0}")]
    KeyMismatch(&'static str),

    /// A post-Byzantium receipt was supplied without a status.
    #[error("Status is missing")]
    StatusMissing,

    /// A pre-Byzantium receipt was supplied without a state root.
    #[error("State Root is missing")]
    StateRootMissing,

    /// A post-Shanghai header was supplied without a withdrawals root.
    #[error("Withdrawals Root is missing")]
    WithdrawalsRootMissing,

    /// A withdrawals root was supplied for a pre-Shanghai header, where it
    /// cannot be checked.
    #[error("Withdrawals Root is not part of a pre-Shanghai header")]
    UnexpectedWithdrawalsRoot,

    /// The account value is not a four-field list.
    #[error("Invalid number of fields in account RLP")]
    AccountFieldCount,

    /// The receipt value is not a four-field list.
    #[error("Invalid number of fields in receipt RLP")]
    ReceiptFieldCount,

    /// A log entry is not a three-field list.
    #[error("Invalid number of fields in log RLP")]
    LogFieldCount,

    /// The transaction list arity disagrees with its type's layout.
    #[error("Invalid number of fields in transaction RLP (expected {expected}, found {found})")]
    TransactionFieldCount {
        /// Field count the transaction type requires.
        expected: usize,
        /// Field count actually decoded.
        found: usize,
    },

    /// The header list arity disagrees with the chain's fork schedule.
    #[error("Invalid number of fields in header RLP (expected {expected}, found {found})")]
    HeaderFieldCount {
        /// Field count the fork schedule requires.
        expected: usize,
        /// Field count actually decoded.
        found: usize,
    },

    /// The header does not hash to the claimed block hash.
    #[error("Block Hash does not Match")]
    BlockHashMismatch,

    /// The chain id has no known fork schedule.
    #[error("Unsupported chain id: {0}")]
    UnsupportedChain(u64),

    /// The transaction type byte is not a known type.
    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(u8),

    /// A typed value's first byte disagrees with the claimed type.
    #[error("Type prefix does not match (expected {expected}, found {found})")]
    TypePrefixMismatch {
        /// The claimed transaction type byte.
        expected: u8,
        /// The first byte of the value.
        found: u8,
    },

    /// A typed value carries nothing after the type byte — or nothing at
    /// all.
    #[error("Typed payload is empty")]
    EmptyTypedPayload,

    /// Typed transactions cannot appear in pre-Byzantium blocks.
    #[error("Pre-Byzantium blocks cannot carry typed transactions")]
    TypedTransactionPreByzantium,

    /// The requested log does not exist in the receipt.
    #[error("Log index {index} is out of range ({count} logs)")]
    LogIndexOutOfRange {
        /// The requested log index.
        index: usize,
        /// Number of logs the receipt carries.
        count: usize,
    },

    /// A slot of an account without a storage trie can only be zero.
    #[error("Storage value of an empty storage trie must be zero")]
    NonZeroValueInEmptyTrie,
}
