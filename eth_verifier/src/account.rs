//! Account and storage slot verification against the state trie.

use ethereum_types::{H160, H256, U256};
use log::trace;
use mpt_proofs::proof::{verify_merkle_proof, ProofInput};
use mpt_proofs::rlp::{
    decode_header, decode_list, expect_bytes32_exact, expect_bytes32_value, expect_u256,
    expect_u64, RlpError, RlpList,
};
use serde::{Deserialize, Serialize};
use verifier_common::{
    EMPTY_TRIE_HASH, MAX_ACCOUNT_LEAF_LENGTH, MAX_ACCOUNT_PROOF_DEPTH, MAX_ACCOUNT_STATE_LENGTH,
    MAX_STORAGE_LEAF_LENGTH, MAX_STORAGE_PROOF_DEPTH, MAX_STORAGE_VALUE_LENGTH,
};

use crate::{keys, VerifierError, VerifierResult};

/// Number of fields in the RLP account state.
const ACCOUNT_FIELDS_COUNT: usize = 4;

/// An Ethereum account as claimed by a caller: the address plus the four
/// fields committed to the state trie.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Account {
    /// The account address.
    pub address: H160,
    /// The account nonce.
    pub nonce: u64,
    /// The account balance in wei.
    pub balance: U256,
    /// Root hash of the account's storage trie.
    pub storage_hash: H256,
    /// Hash of the account's EVM code.
    pub code_hash: H256,
}

/// Proof input sized for state-trie account proofs.
pub type AccountProofInput = ProofInput<
    32,
    MAX_ACCOUNT_STATE_LENGTH,
    MAX_ACCOUNT_PROOF_DEPTH,
    MAX_ACCOUNT_LEAF_LENGTH,
>;

/// Proof input sized for storage-trie slot proofs.
pub type StorageProofInput =
    ProofInput<32, MAX_STORAGE_VALUE_LENGTH, MAX_STORAGE_PROOF_DEPTH, MAX_STORAGE_LEAF_LENGTH>;

/// Verifies an account against a state root.
///
/// The proof's key must be `keccak256(address)`, its value must be the RLP
/// list `(nonce, balance, storage_hash, code_hash)` — checked field by field
/// so a mismatch names the offending field — and the proof must anchor the
/// value under `state_root`.
pub fn verify_account(
    account: &Account,
    proof_input: &AccountProofInput,
    state_root: H256,
) -> VerifierResult<()> {
    trace!(
        "verifying account {:?} against state root {:?}",
        account.address,
        state_root
    );

    if proof_input.key != keys::keccak_key(account.address.as_bytes()) {
        return Err(VerifierError::KeyMismatch("account address hash"));
    }

    let fields: RlpList<ACCOUNT_FIELDS_COUNT> =
        decode_list(&proof_input.value).map_err(|e| match e {
            RlpError::TooManyItems { .. } => VerifierError::AccountFieldCount,
            other => other.into(),
        })?;
    if fields.len() != ACCOUNT_FIELDS_COUNT {
        return Err(VerifierError::AccountFieldCount);
    }

    let value = &proof_input.value;
    expect_u64(value, &fields.at(0), account.nonce, "Nonce")?;
    expect_u256(value, &fields.at(1), account.balance, "Balance")?;
    expect_bytes32_exact(value, &fields.at(2), account.storage_hash, "Storage Hash")?;
    expect_bytes32_exact(value, &fields.at(3), account.code_hash, "Code Hash")?;

    verify_merkle_proof(proof_input, state_root).map_err(|source| VerifierError::Proof {
        label: "State Root",
        source,
    })
}

/// Verifies a storage slot value against an account's storage hash.
///
/// The proof's key must be `keccak256(slot)`; the proven value is the
/// storage word trimmed of leading zeros and wrapped as an RLP string. An
/// account whose storage hash is the empty-trie root proves only zero
/// values, with no trie to walk.
pub fn verify_storage_proof(
    slot: H256,
    value: U256,
    proof_input: &StorageProofInput,
    storage_hash: H256,
) -> VerifierResult<()> {
    if storage_hash == EMPTY_TRIE_HASH {
        return match value.is_zero() {
            true => Ok(()),
            false => Err(VerifierError::NonZeroValueInEmptyTrie),
        };
    }

    if proof_input.key != keys::keccak_key(slot.as_bytes()) {
        return Err(VerifierError::KeyMismatch("storage slot hash"));
    }

    let (header, consumed) = decode_header(&proof_input.value, 0)?;
    if consumed != proof_input.value.len() {
        return Err(RlpError::TrailingBytes.into());
    }

    let mut word = [0_u8; 32];
    value.to_big_endian(&mut word);
    expect_bytes32_value(&proof_input.value, &header, H256(word), "Storage Value")?;

    verify_merkle_proof(proof_input, storage_hash).map_err(|source| VerifierError::Proof {
        label: "Storage Hash",
        source,
    })
}

#[cfg(test)]
mod tests {
    use ethereum_types::{H160, H256, U256};
    use keccak_hash::keccak;
    use mpt_proofs::proof::MptProof;
    use mpt_proofs::rlp::RlpError;
    use rlp::RlpStream;
    use rlp_derive::RlpEncodable;
    use verifier_common::{EMPTY_CODE_HASH, EMPTY_TRIE_HASH};

    use super::{
        verify_account, verify_storage_proof, Account, AccountProofInput, StorageProofInput,
    };
    use crate::testing_utils::{common_setup, single_leaf_trie};
    use crate::VerifierError;

    fn test_account() -> Account {
        Account {
            address: H160::repeat_byte(0xaa),
            nonce: 5,
            balance: U256::from(256),
            storage_hash: EMPTY_TRIE_HASH,
            code_hash: EMPTY_CODE_HASH,
        }
    }

    /// The committed account state, as a separate struct to allow easy RLP
    /// encoding.
    #[derive(RlpEncodable)]
    struct AccountEntry {
        nonce: u64,
        balance: U256,
        storage_root: H256,
        code_hash: H256,
    }

    fn account_state_rlp(account: &Account) -> Vec<u8> {
        let entry = AccountEntry {
            nonce: account.nonce,
            balance: account.balance,
            storage_root: account.storage_hash,
            code_hash: account.code_hash,
        };

        rlp::encode(&entry).to_vec()
    }

    fn account_fixture(account: &Account) -> (H256, AccountProofInput) {
        let key = keccak(account.address.as_bytes());
        let state = account_state_rlp(account);
        let (root, nodes) = single_leaf_trie(key.as_bytes(), &state);

        let input =
            AccountProofInput::new(key.as_bytes(), &state, MptProof::from_rlp_nodes(&nodes).unwrap())
                .unwrap();

        (root, input)
    }

    #[test]
    fn account_proof_verifies() {
        common_setup();

        let account = test_account();
        let (state_root, input) = account_fixture(&account);

        assert_eq!(verify_account(&account, &input, state_root), Ok(()));
    }

    #[test]
    fn corrupted_balance_fails_with_balance_label() {
        let account = test_account();
        let (state_root, input) = account_fixture(&account);

        let mut claimed = account;
        claimed.balance += U256::one();

        assert_eq!(
            verify_account(&claimed, &input, state_root),
            Err(VerifierError::Rlp(RlpError::Mismatch { label: "Balance" }))
        );
    }

    #[test]
    fn corrupted_nonce_and_hashes_fail_with_their_labels() {
        let account = test_account();
        let (state_root, input) = account_fixture(&account);

        let mut claimed = account.clone();
        claimed.nonce += 1;
        assert_eq!(
            verify_account(&claimed, &input, state_root),
            Err(VerifierError::Rlp(RlpError::Mismatch { label: "Nonce" }))
        );

        let mut claimed = account.clone();
        claimed.code_hash = H256::repeat_byte(0x11);
        assert_eq!(
            verify_account(&claimed, &input, state_root),
            Err(VerifierError::Rlp(RlpError::Mismatch {
                label: "Code Hash"
            }))
        );
    }

    #[test]
    fn wrong_address_fails_key_derivation() {
        let account = test_account();
        let (state_root, input) = account_fixture(&account);

        let mut claimed = account;
        claimed.address = H160::repeat_byte(0xbb);

        assert_eq!(
            verify_account(&claimed, &input, state_root),
            Err(VerifierError::KeyMismatch("account address hash"))
        );
    }

    #[test]
    fn wrong_state_root_fails_proof() {
        let account = test_account();
        let (_, input) = account_fixture(&account);

        assert!(matches!(
            verify_account(&account, &input, H256::repeat_byte(0x99)),
            Err(VerifierError::Proof {
                label: "State Root",
                ..
            })
        ));
    }

    #[test]
    fn short_account_list_is_rejected() {
        let account = test_account();
        let key = keccak(account.address.as_bytes());

        let mut stream = RlpStream::new_list(3);
        stream.append(&account.nonce);
        stream.append(&account.balance);
        stream.append(&account.storage_hash);
        let state = stream.out().to_vec();

        let (root, nodes) = single_leaf_trie(key.as_bytes(), &state);
        let input = AccountProofInput::new(
            key.as_bytes(),
            &state,
            MptProof::from_rlp_nodes(&nodes).unwrap(),
        )
        .unwrap();

        assert_eq!(
            verify_account(&account, &input, root),
            Err(VerifierError::AccountFieldCount)
        );
    }

    fn storage_fixture(slot: H256, value: U256) -> (H256, StorageProofInput) {
        let key = keccak(slot.as_bytes());
        let encoded_value = rlp::encode(&value).to_vec();
        let (root, nodes) = single_leaf_trie(key.as_bytes(), &encoded_value);

        let input = StorageProofInput::new(
            key.as_bytes(),
            &encoded_value,
            MptProof::from_rlp_nodes(&nodes).unwrap(),
        )
        .unwrap();

        (root, input)
    }

    #[test]
    fn account_serde_roundtrip() {
        let account = test_account();

        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(serde_json::from_str::<Account>(&json).unwrap(), account);
    }

    #[test]
    fn storage_proof_verifies() {
        common_setup();

        let slot = H256::from_low_u64_be(3);
        let value = U256::from(0x2a);
        let (storage_hash, input) = storage_fixture(slot, value);

        assert_eq!(
            verify_storage_proof(slot, value, &input, storage_hash),
            Ok(())
        );
    }

    #[test]
    fn wrong_storage_value_fails() {
        let slot = H256::from_low_u64_be(3);
        let (storage_hash, input) = storage_fixture(slot, U256::from(0x2a));

        assert_eq!(
            verify_storage_proof(slot, U256::from(0x2b), &input, storage_hash),
            Err(VerifierError::Rlp(RlpError::Mismatch {
                label: "Storage Value"
            }))
        );
    }

    #[test]
    fn empty_storage_trie_proves_only_zero() {
        let slot = H256::from_low_u64_be(3);
        // The proof content is never inspected for an empty trie.
        let (_, input) = storage_fixture(slot, U256::zero());

        assert_eq!(
            verify_storage_proof(slot, U256::zero(), &input, EMPTY_TRIE_HASH),
            Ok(())
        );
        assert_eq!(
            verify_storage_proof(slot, U256::one(), &input, EMPTY_TRIE_HASH),
            Err(VerifierError::NonZeroValueInEmptyTrie)
        );
    }
}
