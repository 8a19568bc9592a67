//! Block header verification against a block hash.
//!
//! Headers have grown with the forks: 15 fields originally, 16 with
//! London's base fee, 17 with Shanghai's withdrawals root, 20 with Cancun's
//! blob fields. The field count is therefore itself a consistency check —
//! the list arity must equal what the chain's fork schedule prescribes at
//! the claimed block number.

use ethereum_types::H256;
use keccak_hash::keccak;
use log::trace;
use mpt_proofs::fragment::Fragment;
use mpt_proofs::rlp::{decode_list, expect_bytes32_exact, expect_u64, RlpList};
use serde::{Deserialize, Serialize};
use verifier_common::{
    MAINNET_CANCUN_BLOCK_NUMBER, MAINNET_CHAIN_ID, MAINNET_LONDON_BLOCK_NUMBER,
    MAINNET_SHANGHAI_BLOCK_NUMBER, MAX_HEADER_FIELDS_COUNT, MAX_HEADER_RLP_LENGTH,
    SEPOLIA_CANCUN_BLOCK_NUMBER, SEPOLIA_CHAIN_ID, SEPOLIA_SHANGHAI_BLOCK_NUMBER,
};

use crate::{VerifierError, VerifierResult};

const STATE_ROOT_FIELD: usize = 3;
const TRANSACTIONS_ROOT_FIELD: usize = 4;
const RECEIPTS_ROOT_FIELD: usize = 5;
const NUMBER_FIELD: usize = 8;
const WITHDRAWALS_ROOT_FIELD: usize = 16;

/// Field counts per fork era.
const PRE_LONDON_FIELDS: usize = 15;
const LONDON_FIELDS: usize = 16;
const SHANGHAI_FIELDS: usize = 17;
const CANCUN_FIELDS: usize = 20;

/// The fragment type a header encoding lives in.
pub type HeaderRlp = Fragment<u8, MAX_HEADER_RLP_LENGTH>;

/// The header fields a caller claims, anchored by the block hash.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlockHeaderPartial {
    /// The block hash: keccak of the header encoding.
    pub hash: H256,
    /// The block number.
    pub number: u64,
    /// The post-block state root.
    pub state_root: H256,
    /// Root of the block's transactions trie.
    pub transactions_root: H256,
    /// Root of the block's receipts trie.
    pub receipts_root: H256,
    /// Root of the block's withdrawals (Shanghai onwards).
    pub withdrawals_root: Option<H256>,
}

/// The header field count prescribed by `chain_id`'s fork schedule at
/// `block_number`. Chains without a known schedule are rejected.
pub fn get_header_fields_count(chain_id: u64, block_number: u64) -> VerifierResult<usize> {
    match chain_id {
        MAINNET_CHAIN_ID => Ok(if block_number >= MAINNET_CANCUN_BLOCK_NUMBER {
            CANCUN_FIELDS
        } else if block_number >= MAINNET_SHANGHAI_BLOCK_NUMBER {
            SHANGHAI_FIELDS
        } else if block_number >= MAINNET_LONDON_BLOCK_NUMBER {
            LONDON_FIELDS
        } else {
            PRE_LONDON_FIELDS
        }),
        // Sepolia launched with London active.
        SEPOLIA_CHAIN_ID => Ok(if block_number >= SEPOLIA_CANCUN_BLOCK_NUMBER {
            CANCUN_FIELDS
        } else if block_number >= SEPOLIA_SHANGHAI_BLOCK_NUMBER {
            SHANGHAI_FIELDS
        } else {
            LONDON_FIELDS
        }),
        other => Err(VerifierError::UnsupportedChain(other)),
    }
}

/// Verifies a block header against its claimed hash.
///
/// The encoding must be a list with exactly the field count the chain's
/// fork schedule prescribes at the claimed number; the number, state root,
/// transactions root, receipts root and — from Shanghai on — withdrawals
/// root must match the claim; and the encoding must hash to the claimed
/// block hash.
pub fn verify_header(
    chain_id: u64,
    header: &BlockHeaderPartial,
    header_rlp: &HeaderRlp,
) -> VerifierResult<()> {
    trace!(
        "verifying header {} of chain {} against hash {:?}",
        header.number,
        chain_id,
        header.hash
    );

    let fields: RlpList<MAX_HEADER_FIELDS_COUNT> = decode_list(header_rlp)?;

    let expected = get_header_fields_count(chain_id, header.number)?;
    if fields.len() != expected {
        return Err(VerifierError::HeaderFieldCount {
            expected,
            found: fields.len(),
        });
    }

    expect_u64(header_rlp, &fields.at(NUMBER_FIELD), header.number, "Block Number")?;
    expect_bytes32_exact(
        header_rlp,
        &fields.at(STATE_ROOT_FIELD),
        header.state_root,
        "State Root",
    )?;
    expect_bytes32_exact(
        header_rlp,
        &fields.at(TRANSACTIONS_ROOT_FIELD),
        header.transactions_root,
        "Transactions Root",
    )?;
    expect_bytes32_exact(
        header_rlp,
        &fields.at(RECEIPTS_ROOT_FIELD),
        header.receipts_root,
        "Receipts Root",
    )?;

    if expected >= SHANGHAI_FIELDS {
        let withdrawals_root = header
            .withdrawals_root
            .ok_or(VerifierError::WithdrawalsRootMissing)?;
        expect_bytes32_exact(
            header_rlp,
            &fields.at(WITHDRAWALS_ROOT_FIELD),
            withdrawals_root,
            "Withdrawals Root",
        )?;
    } else if header.withdrawals_root.is_some() {
        return Err(VerifierError::UnexpectedWithdrawalsRoot);
    }

    if keccak(header_rlp.as_slice()) != header.hash {
        return Err(VerifierError::BlockHashMismatch);
    }

    Ok(())
}
