//! Receipt verification against a block's receipts root, and log
//! extraction from verified receipts.
//!
//! Receipts changed shape at Byzantium: the first field was the
//! post-transaction state root before, and is a 0/1 status byte since. The
//! caller states which one it claims via [`TransactionReceiptPartial`]; the
//! block number decides which one the encoding must carry.

use bytes::Bytes;
use ethereum_types::{Bloom, H160, H256};
use mpt_proofs::fragment::Fragment;
use mpt_proofs::proof::{verify_merkle_proof, ProofInput};
use mpt_proofs::rlp::{
    decode_list, encoded_span, expect_bytes, expect_bytes32_exact, expect_u8, expect_u64,
    item_slice, read_address, read_bytes32, RlpError, RlpHeader, RlpKind, RlpList,
};
use serde::{Deserialize, Serialize};
use verifier_common::{
    BLOOM_FILTER_LENGTH, LOG_FIELDS_COUNT, MAINNET_BYZANTIUM_BLOCK_NUMBER, MAX_LOGS_COUNT,
    MAX_LOG_TOPICS_COUNT, MAX_RECEIPT_ENCODED_LENGTH, MAX_RECEIPT_LEAF_LENGTH,
    MAX_RECEIPT_PROOF_DEPTH, MAX_TRIE_INDEX_KEY_LENGTH, RECEIPT_FIELDS_COUNT,
};

use crate::transaction::{typed_payload, TxType};
use crate::{keys, VerifierError, VerifierResult};

/// One log emitted by a transaction.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Log {
    /// Address of the emitting contract.
    pub address: H160,
    /// The event signature topic and up to three indexed parameters.
    pub topics: Vec<H256>,
    /// The unindexed payload.
    pub data: Bytes,
}

/// The receipt fields a caller claims. Exactly one of `status` and
/// `state_root` must be present, matching the block's fork era.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TransactionReceiptPartial {
    /// Execution status byte (Byzantium onwards).
    pub status: Option<u8>,
    /// Post-transaction state root (pre-Byzantium only).
    pub state_root: Option<H256>,
    /// Gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,
    /// Bloom filter over the receipt's logs.
    pub logs_bloom: Bloom,
}

/// The fragment type a verified receipt payload lives in.
pub type ReceiptRlp = Fragment<u8, MAX_RECEIPT_ENCODED_LENGTH>;

/// Proof input sized for receipts-trie proofs.
pub type ReceiptProofInput = ProofInput<
    MAX_TRIE_INDEX_KEY_LENGTH,
    MAX_RECEIPT_ENCODED_LENGTH,
    MAX_RECEIPT_PROOF_DEPTH,
    MAX_RECEIPT_LEAF_LENGTH,
>;

/// Verifies a receipt against a block's receipts root.
///
/// The proof's key must be the RLP encoding of `index`; typed receipts lead
/// with the transaction's type byte; the payload must be the four-field
/// list `(status_or_state_root, cumulative_gas_used, logs_bloom, logs)`.
/// Returns the receipt payload and its decoded field list so callers can
/// extract logs with [`extract_log`].
pub fn verify_receipt_proof(
    block_number: u64,
    index: u64,
    tx_type: TxType,
    receipt: &TransactionReceiptPartial,
    proof_input: &ReceiptProofInput,
    receipts_root: H256,
) -> VerifierResult<(ReceiptRlp, RlpList<RECEIPT_FIELDS_COUNT>)> {
    if proof_input.key != keys::index_key(index)? {
        return Err(VerifierError::KeyMismatch("transaction index"));
    }

    let pre_byzantium = block_number < MAINNET_BYZANTIUM_BLOCK_NUMBER;
    if pre_byzantium && !tx_type.is_legacy() {
        return Err(VerifierError::TypedTransactionPreByzantium);
    }

    let payload = typed_payload(&proof_input.value, tx_type)?;

    let fields: RlpList<RECEIPT_FIELDS_COUNT> = decode_list(&payload).map_err(|e| match e {
        RlpError::TooManyItems { .. } => VerifierError::ReceiptFieldCount,
        other => other.into(),
    })?;
    if fields.len() != RECEIPT_FIELDS_COUNT {
        return Err(VerifierError::ReceiptFieldCount);
    }

    if pre_byzantium {
        let state_root = receipt.state_root.ok_or(VerifierError::StateRootMissing)?;
        expect_bytes32_exact(&payload, &fields.at(0), state_root, "Receipt State Root")?;
    } else {
        let status = receipt.status.ok_or(VerifierError::StatusMissing)?;
        expect_u8(&payload, &fields.at(0), status, "Status")?;
    }

    expect_u64(
        &payload,
        &fields.at(1),
        receipt.cumulative_gas_used,
        "Cumulative Gas Used",
    )?;
    let bloom = fields.at(2);
    if bloom.kind == RlpKind::String && bloom.length != BLOOM_FILTER_LENGTH {
        return Err(RlpError::UnexpectedLength {
            label: "Logs Bloom",
            length: bloom.length,
        }
        .into());
    }
    expect_bytes(&payload, &bloom, receipt.logs_bloom.as_bytes(), "Logs Bloom")?;

    let logs = fields.at(3);
    if logs.kind != RlpKind::List {
        return Err(RlpError::UnexpectedKind {
            expected: RlpKind::List,
            found: logs.kind,
            label: "Logs",
        }
        .into());
    }

    verify_merkle_proof(proof_input, receipts_root).map_err(|source| VerifierError::Proof {
        label: "Receipts Root",
        source,
    })?;

    Ok((payload, fields))
}

/// Extracts one log from a verified receipt payload.
pub fn extract_log(
    receipt_rlp: &ReceiptRlp,
    fields: &RlpList<RECEIPT_FIELDS_COUNT>,
    log_index: usize,
) -> VerifierResult<Log> {
    let logs_frag = list_fragment(receipt_rlp, &fields.at(3), "Logs")?;
    let logs: RlpList<MAX_LOGS_COUNT> = decode_list(&logs_frag)?;

    if log_index >= logs.len() {
        return Err(VerifierError::LogIndexOutOfRange {
            index: log_index,
            count: logs.len(),
        });
    }

    let log_frag = list_fragment(&logs_frag, &logs.at(log_index), "Log")?;
    let log_fields: RlpList<LOG_FIELDS_COUNT> = decode_list(&log_frag).map_err(|e| match e {
        RlpError::TooManyItems { .. } => VerifierError::LogFieldCount,
        other => other.into(),
    })?;
    if log_fields.len() != LOG_FIELDS_COUNT {
        return Err(VerifierError::LogFieldCount);
    }

    let address = read_address(&log_frag, &log_fields.at(0), "Log Address")?;

    let topics_frag = list_fragment(&log_frag, &log_fields.at(1), "Log Topics")?;
    let topic_headers: RlpList<MAX_LOG_TOPICS_COUNT> = decode_list(&topics_frag)?;
    let topics = topic_headers
        .iter()
        .map(|h| read_bytes32(&topics_frag, h, "Log Topic"))
        .collect::<Result<Vec<_>, _>>()?;

    let data_header = log_fields.at(2);
    if data_header.kind != RlpKind::String {
        return Err(RlpError::UnexpectedKind {
            expected: RlpKind::String,
            found: data_header.kind,
            label: "Log Data",
        }
        .into());
    }
    let data = Bytes::copy_from_slice(item_slice(&log_frag, &data_header));

    Ok(Log {
        address,
        topics,
        data,
    })
}

/// Re-frames a list-kind child as its own fragment (prefix included) so it
/// can be decoded as an outer list.
fn list_fragment(
    frag: &ReceiptRlp,
    header: &RlpHeader,
    label: &'static str,
) -> VerifierResult<ReceiptRlp> {
    if header.kind != RlpKind::List {
        return Err(RlpError::UnexpectedKind {
            expected: RlpKind::List,
            found: header.kind,
            label,
        }
        .into());
    }

    let (start, length) = encoded_span(frag, header);
    Ok(frag.sub_fragment(start, length))
}
