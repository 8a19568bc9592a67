//! Transaction verification against a block's transactions root.
//!
//! Every transaction type since the original format serializes its common
//! fields at different list indices. Rather than decoding full per-type
//! structs, verification works from [`TransactionPartial`] — the subset of
//! fields shared by all types — and a per-type
//! [`TransactionPartialFieldLayout`] naming where each semantic field sits.

use bytes::Bytes;
use ethereum_types::{H160, H256, U256};
use mpt_proofs::fragment::Fragment;
use mpt_proofs::proof::{verify_merkle_proof, ProofInput};
use mpt_proofs::rlp::{
    decode_list, expect_address, expect_bytes, expect_u256, expect_u64, RlpError, RlpKind, RlpList,
};
use serde::{Deserialize, Serialize};
use verifier_common::{
    MAX_TRIE_INDEX_KEY_LENGTH, MAX_TX_ENCODED_LENGTH, MAX_TX_FIELDS_COUNT, MAX_TX_LEAF_LENGTH,
    MAX_TX_PROOF_DEPTH,
};

use crate::{keys, VerifierError, VerifierResult};

/// The transaction envelope types (EIP-2718).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TxType {
    /// Pre-EIP-2718 transactions, serialized as a bare 9-field list.
    Legacy,
    /// EIP-2930 access list transactions.
    AccessList,
    /// EIP-1559 dynamic fee transactions.
    DynamicFee,
    /// EIP-4844 blob transactions.
    Blob,
    /// EIP-7702 set-code transactions.
    SetCode,
}

impl TxType {
    /// The envelope type byte prefixed to non-legacy payloads.
    pub const fn type_byte(self) -> u8 {
        match self {
            TxType::Legacy => 0,
            TxType::AccessList => 1,
            TxType::DynamicFee => 2,
            TxType::Blob => 3,
            TxType::SetCode => 4,
        }
    }

    /// Whether the value is a bare RLP list with no type prefix.
    pub const fn is_legacy(self) -> bool {
        matches!(self, TxType::Legacy)
    }

    /// Where the common fields sit in this type's RLP list.
    pub const fn layout(self) -> TransactionPartialFieldLayout {
        match self {
            TxType::Legacy => TransactionPartialFieldLayout {
                fields_count: 9,
                nonce: 0,
                gas_limit: 2,
                to: 3,
                value: 4,
                data: 5,
                v: 6,
                r: 7,
                s: 8,
            },
            TxType::AccessList => TransactionPartialFieldLayout {
                fields_count: 11,
                nonce: 1,
                gas_limit: 3,
                to: 4,
                value: 5,
                data: 6,
                v: 8,
                r: 9,
                s: 10,
            },
            TxType::DynamicFee => TransactionPartialFieldLayout {
                fields_count: 12,
                nonce: 1,
                gas_limit: 4,
                to: 5,
                value: 6,
                data: 7,
                v: 9,
                r: 10,
                s: 11,
            },
            TxType::Blob => TransactionPartialFieldLayout {
                fields_count: 14,
                nonce: 1,
                gas_limit: 4,
                to: 5,
                value: 6,
                data: 7,
                v: 11,
                r: 12,
                s: 13,
            },
            TxType::SetCode => TransactionPartialFieldLayout {
                fields_count: 13,
                nonce: 1,
                gas_limit: 4,
                to: 5,
                value: 6,
                data: 7,
                v: 10,
                r: 11,
                s: 12,
            },
        }
    }
}

impl TryFrom<u8> for TxType {
    type Error = VerifierError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(TxType::Legacy),
            1 => Ok(TxType::AccessList),
            2 => Ok(TxType::DynamicFee),
            3 => Ok(TxType::Blob),
            4 => Ok(TxType::SetCode),
            other => Err(VerifierError::UnknownTransactionType(other)),
        }
    }
}

/// RLP list indices of the common transaction fields for one envelope type,
/// plus the total field count the list must have.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransactionPartialFieldLayout {
    /// Total number of fields in the list.
    pub fields_count: usize,
    /// Index of the nonce.
    pub nonce: usize,
    /// Index of the gas limit.
    pub gas_limit: usize,
    /// Index of the recipient.
    pub to: usize,
    /// Index of the transferred value.
    pub value: usize,
    /// Index of the calldata.
    pub data: usize,
    /// Index of the signature's `v` (or `yParity`) component.
    pub v: usize,
    /// Index of the signature's `r` component.
    pub r: usize,
    /// Index of the signature's `s` component.
    pub s: usize,
}

/// The field subset shared by every transaction type. Fields a caller
/// leaves as `None` are not checked; present fields must match the proven
/// encoding exactly.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TransactionPartial {
    /// The sender's nonce.
    pub nonce: Option<u64>,
    /// The gas limit.
    pub gas_limit: Option<u64>,
    /// The recipient; the inner `None` marks contract creation (encoded as
    /// the empty string).
    pub to: Option<Option<H160>>,
    /// The transferred value in wei.
    pub value: Option<U256>,
    /// The calldata.
    pub input: Option<Bytes>,
    /// The signature's `v` (or `yParity`) component.
    pub v: Option<u64>,
    /// The signature's `r` component.
    pub r: Option<U256>,
    /// The signature's `s` component.
    pub s: Option<U256>,
}

/// Proof input sized for transactions-trie proofs.
pub type TransactionProofInput = ProofInput<
    MAX_TRIE_INDEX_KEY_LENGTH,
    MAX_TX_ENCODED_LENGTH,
    MAX_TX_PROOF_DEPTH,
    MAX_TX_LEAF_LENGTH,
>;

/// Splits the envelope type byte off a typed value; legacy values pass
/// through untouched.
pub(crate) fn typed_payload<const M: usize>(
    value: &Fragment<u8, M>,
    tx_type: TxType,
) -> VerifierResult<Fragment<u8, M>> {
    if tx_type.is_legacy() {
        return Ok(*value);
    }

    let first = value.first().ok_or(VerifierError::EmptyTypedPayload)?;
    if first != tx_type.type_byte() {
        return Err(VerifierError::TypePrefixMismatch {
            expected: tx_type.type_byte(),
            found: first,
        });
    }
    if value.len() == 1 {
        return Err(VerifierError::EmptyTypedPayload);
    }

    Ok(value.sub_fragment(1, value.len() - 1))
}

/// Verifies a transaction against a block's transactions root.
///
/// The proof's key must be the RLP encoding of `index`; typed values must
/// lead with their type byte; the list arity must match the type's layout;
/// and every field present in `tx` must match the encoding at its layout
/// index before the proof anchors the value under `transactions_root`.
pub fn verify_transaction_proof(
    index: u64,
    tx_type: TxType,
    tx: &TransactionPartial,
    proof_input: &TransactionProofInput,
    transactions_root: H256,
) -> VerifierResult<()> {
    if proof_input.key != keys::index_key(index)? {
        return Err(VerifierError::KeyMismatch("transaction index"));
    }

    let payload = typed_payload(&proof_input.value, tx_type)?;
    let layout = tx_type.layout();

    let fields: RlpList<MAX_TX_FIELDS_COUNT> = decode_list(&payload)?;
    if fields.len() != layout.fields_count {
        return Err(VerifierError::TransactionFieldCount {
            expected: layout.fields_count,
            found: fields.len(),
        });
    }

    if let Some(nonce) = tx.nonce {
        expect_u64(&payload, &fields.at(layout.nonce), nonce, "Nonce")?;
    }
    if let Some(gas_limit) = tx.gas_limit {
        expect_u64(&payload, &fields.at(layout.gas_limit), gas_limit, "Gas Limit")?;
    }
    match tx.to {
        None => {}
        Some(Some(to)) => expect_address(&payload, &fields.at(layout.to), to, "To")?,
        Some(None) => {
            // Contract creation is the empty string.
            let header = fields.at(layout.to);
            if header.kind != RlpKind::String || header.length != 0 {
                return Err(RlpError::Mismatch { label: "To" }.into());
            }
        }
    }
    if let Some(value) = tx.value {
        expect_u256(&payload, &fields.at(layout.value), value, "Value")?;
    }
    if let Some(input) = &tx.input {
        expect_bytes(&payload, &fields.at(layout.data), input, "Data")?;
    }
    if let Some(v) = tx.v {
        expect_u64(&payload, &fields.at(layout.v), v, "V")?;
    }
    if let Some(r) = tx.r {
        expect_u256(&payload, &fields.at(layout.r), r, "R")?;
    }
    if let Some(s) = tx.s {
        expect_u256(&payload, &fields.at(layout.s), s, "S")?;
    }

    verify_merkle_proof(proof_input, transactions_root).map_err(|source| VerifierError::Proof {
        label: "Transactions Root",
        source,
    })
}
