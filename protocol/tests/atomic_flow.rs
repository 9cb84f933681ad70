//! End-to-end tests for atomic import/export.
//!
//! Each test drives the public API the way a wallet would: populate a UTXO
//! set, build a transaction, sign it with an in-memory keychain, serialize
//! it, and decode it again.

use std::collections::HashMap;
use std::thread;

use atomic_protocol::codec::{Address, AssetId, ChainId, CodecError, Decode, Encode, TxId, UtxoId};
use atomic_protocol::config::{unix_now, BuildConfig, PLATFORM_CHAIN_ID, SECP_CREDENTIAL_ID};
use atomic_protocol::crypto::hash::{add_checksum, base58_encode, sha256_array};
use atomic_protocol::crypto::{KeyHandle, Signer};
use atomic_protocol::transaction::{
    EvmOutput, EvmTx, FeeRequirement, ImportTx, Output, OutputOwners, SecpTransferOutput,
    Signature, Tx, TxError, UnsignedTx,
};
use atomic_protocol::utxo::{
    build_export_from_account, build_export_tx, build_import_tx, AccountExportRequest,
    ExportRequest, ImportRequest, SharedUtxoSet, Utxo, UtxoError, UtxoSet,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const ASSET_X: AssetId = AssetId::new([0x58; 32]);
const NETWORK_ID: u32 = 12345;

fn addr(b: u8) -> Address {
    Address::new([b; 20])
}

/// A deterministic stand-in key: signature = digest || 32 filler bytes || id.
struct TestKey(u8);

impl KeyHandle for TestKey {
    fn sign(&self, message: &[u8]) -> Result<Signature, String> {
        if message.len() != 32 {
            return Err(format!("expected a 32-byte digest, got {}", message.len()));
        }
        let mut sig = [0u8; 65];
        sig[..32].copy_from_slice(message);
        sig[64] = self.0;
        Ok(Signature::new(sig))
    }
}

struct Keychain(HashMap<Address, TestKey>);

impl Keychain {
    fn with(ids: &[u8]) -> Self {
        Self(ids.iter().map(|b| (addr(*b), TestKey(*b))).collect())
    }
}

impl Signer for Keychain {
    type Key = TestKey;

    fn key_for(&self, address: &Address) -> Option<&TestKey> {
        self.0.get(address)
    }
}

fn config(fee: u64) -> BuildConfig {
    BuildConfig {
        fee,
        native_asset_id: ASSET_X,
        ..Default::default()
    }
}

fn coin(tx: u8, amount: u64, owner: u8) -> Utxo {
    Utxo::new(
        UtxoId::new(TxId::new([tx; 32]), 0),
        ASSET_X,
        Output::SecpTransfer(SecpTransferOutput::new(
            amount,
            OutputOwners::new(vec![addr(owner)], 0, 1).unwrap(),
        )),
    )
}

fn export_request(amount: u64) -> ExportRequest {
    ExportRequest {
        network_id: NETWORK_ID,
        blockchain_id: ChainId::new([1; 32]),
        destination_chain: None,
        asset_id: ASSET_X,
        amount,
        to_addresses: vec![addr(0xB0)],
        from_addresses: vec![addr(0xA0)],
        change_addresses: Vec::new(),
        as_of: unix_now(),
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_spends_one_utxo_with_change() {
    let set: UtxoSet = [coin(1, 1_000, 0xA0)].into_iter().collect();
    let built = build_export_tx(&set, &export_request(600), &config(10)).unwrap();

    assert_eq!(built.inputs.len(), 1);
    assert_eq!(built.inputs[0].input.amount(), 1_000);

    let EvmTx::Export(export) = &built.tx.tx else {
        panic!("expected an export");
    };
    assert_eq!(export.destination_chain, PLATFORM_CHAIN_ID);

    let destination: Vec<_> = export
        .exported_outs
        .iter()
        .filter(|o| o.output.addresses() == [addr(0xB0)])
        .collect();
    let change: Vec<_> = export
        .exported_outs
        .iter()
        .filter(|o| o.output.addresses() == [addr(0xA0)])
        .collect();
    assert_eq!(destination.len(), 1);
    assert_eq!(destination[0].output.amount(), Some(600));
    assert_eq!(change.len(), 1);
    assert_eq!(change[0].output.amount(), Some(390));
    assert_eq!(600 + 390 + 10, 1_000);
}

#[test]
fn insufficient_funds_reports_deficit() {
    let set: UtxoSet = [coin(1, 100, 0xA0), coin(2, 200, 0xA0)].into_iter().collect();
    let err = build_export_tx(&set, &export_request(600), &config(10)).unwrap_err();
    assert_eq!(
        err,
        UtxoError::InsufficientFunds {
            asset_id: ASSET_X,
            requested: 610,
            available: 300,
        }
    );
}

#[test]
fn concurrent_exports_never_share_a_utxo() {
    let shared = SharedUtxoSet::new((1..=8).map(|i| coin(i, 100, 0xA0)).collect());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                shared
                    .build_export_and_consume(&export_request(150), &config(0))
                    .unwrap()
            })
        })
        .collect();

    let mut consumed = Vec::new();
    for handle in handles {
        consumed.extend(handle.join().unwrap().consumed_utxo_ids());
    }
    let total = consumed.len();
    consumed.sort();
    consumed.dedup();
    assert_eq!(consumed.len(), total);
    assert_eq!(total, 8);
    assert!(shared.is_empty());
}

#[test]
fn account_export_signs_with_secp_credential() {
    let request = AccountExportRequest {
        network_id: NETWORK_ID,
        blockchain_id: ChainId::new([1; 32]),
        destination_chain: None,
        from_address: addr(0xA0),
        nonce: 3,
        asset_id: ASSET_X,
        amount: 500,
        to_addresses: vec![addr(0xB0)],
    };
    let unsigned = build_export_from_account(&request, &config(10)).unwrap();
    let tx = unsigned.sign(&Keychain::with(&[0xA0])).unwrap();

    assert_eq!(tx.credentials().len(), 1);
    assert_eq!(tx.credentials()[0].type_id(), SECP_CREDENTIAL_ID);
    assert_eq!(Tx::from_bytes(&tx.to_bytes()).unwrap(), tx);
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

fn import_request() -> ImportRequest {
    ImportRequest {
        network_id: NETWORK_ID,
        blockchain_id: ChainId::new([1; 32]),
        source_chain: PLATFORM_CHAIN_ID,
        to_address: addr(0xE0),
        from_addresses: vec![addr(0xA0)],
        as_of: unix_now(),
    }
}

#[test]
fn import_build_sign_encode_decode() {
    let atomics = [coin(2, 700, 0xA0), coin(1, 300, 0xA0)];
    let unsigned = build_import_tx(&atomics, &import_request(), &config(10)).unwrap();

    let tx = unsigned.sign(&Keychain::with(&[0xA0])).unwrap();
    assert_eq!(tx.credentials().len(), 2);
    let digest = sha256_array(&unsigned.to_bytes());
    for credential in tx.credentials() {
        assert_eq!(credential.signatures.len(), 1);
        assert_eq!(&credential.signatures[0].as_bytes()[..32], &digest);
    }

    let bytes = tx.to_bytes();
    let (decoded, consumed) = Tx::from_bytes_at(&bytes, 0).unwrap();
    assert_eq!(consumed, bytes.len());
    assert_eq!(decoded, tx);
    assert_eq!(decoded.tx_id(), TxId::new(sha256_array(&bytes)));

    let restored: Tx = tx.to_string_cb58().parse().unwrap();
    assert_eq!(restored, tx);

    let EvmTx::Import(import) = &decoded.unsigned.tx else {
        panic!("expected an import");
    };
    assert_eq!(import.outs, vec![EvmOutput::new(addr(0xE0), 990, ASSET_X)]);
}

fn two_of_three() -> Utxo {
    Utxo::new(
        UtxoId::new(TxId::new([9; 32]), 0),
        ASSET_X,
        Output::SecpTransfer(SecpTransferOutput::new(
            500,
            OutputOwners::new(vec![addr(0xA1), addr(0xA2), addr(0xA3)], 0, 2).unwrap(),
        )),
    )
}

#[test]
fn import_multisig_signs_in_owner_order() {
    let mut request = import_request();
    request.from_addresses = vec![addr(0xA3), addr(0xA2), addr(0xA1)];

    let unsigned = build_import_tx(&[two_of_three()], &request, &config(0)).unwrap();
    let EvmTx::Import(import) = &unsigned.tx else {
        panic!("expected an import");
    };
    let indices: Vec<u32> = import.imported_inputs[0]
        .input
        .sig_idxs()
        .iter()
        .map(|s| s.index)
        .collect();
    assert_eq!(indices, vec![0, 1]);

    // Caller order of the senders does not change the bytes.
    let mut reordered = import_request();
    reordered.from_addresses = vec![addr(0xA1), addr(0xA3), addr(0xA2)];
    let again = build_import_tx(&[two_of_three()], &reordered, &config(0)).unwrap();
    assert_eq!(again.to_bytes(), unsigned.to_bytes());

    let tx = unsigned.sign(&Keychain::with(&[0xA1, 0xA2, 0xA3])).unwrap();
    assert_eq!(tx.credentials().len(), 1);
    let signers: Vec<u8> = tx.credentials()[0]
        .signatures
        .iter()
        .map(|sig| sig.as_bytes()[64])
        .collect();
    assert_eq!(signers, vec![0xA1, 0xA2]);
}

#[test]
fn import_without_key_fails_to_sign() {
    let unsigned = build_import_tx(&[coin(1, 100, 0xA0)], &import_request(), &config(0)).unwrap();
    assert_eq!(
        unsigned.sign(&Keychain::with(&[0xA1])).unwrap_err(),
        TxError::MissingKey { address: addr(0xA0) }
    );
}

#[test]
fn import_duplicate_pair_and_fee_rules() {
    let unsigned = build_import_tx(&[coin(1, 1_000, 0xA0)], &import_request(), &config(0)).unwrap();
    let EvmTx::Import(template) = unsigned.tx else {
        panic!("expected an import");
    };
    let fee = |amount| FeeRequirement::new(ASSET_X, amount);

    let duplicate = vec![
        EvmOutput::new(addr(1), 100, ASSET_X),
        EvmOutput::new(addr(1), 100, ASSET_X),
    ];
    assert!(matches!(
        ImportTx::new(
            template.base,
            template.source_chain,
            template.imported_inputs.clone(),
            duplicate,
            fee(0),
        ),
        Err(TxError::EvmOutput(_))
    ));

    let single = || vec![EvmOutput::new(addr(1), 900, ASSET_X)];
    let build = |required| {
        ImportTx::new(
            template.base,
            template.source_chain,
            template.imported_inputs.clone(),
            single(),
            fee(required),
        )
    };
    assert!(build(100).is_ok());
    assert_eq!(
        build(101).unwrap_err(),
        TxError::EvmFee {
            required: 101,
            provided: 100
        }
    );
}

// ---------------------------------------------------------------------------
// Wire forms
// ---------------------------------------------------------------------------

#[test]
fn utxo_id_checksum_rules() {
    let utxo_id = UtxoId::new(TxId::new([7; 32]), 2);
    let raw = utxo_id.to_array();

    // Bare 36 bytes decode.
    let bare: UtxoId = base58_encode(&raw).parse().unwrap();
    assert_eq!(bare, utxo_id);

    // Checksummed form decodes and matches Display.
    let checked = base58_encode(&add_checksum(&raw));
    assert_eq!(checked, utxo_id.to_string());
    assert_eq!(checked.parse::<UtxoId>().unwrap(), utxo_id);

    // A wrong checksum is rejected.
    let mut corrupt = add_checksum(&raw);
    corrupt[39] ^= 0x01;
    assert_eq!(
        base58_encode(&corrupt).parse::<UtxoId>(),
        Err(CodecError::Checksum)
    );
}

#[test]
fn utxo_set_roundtrips_through_strings() {
    let mut original = UtxoSet::new();
    original.add(coin(1, 10, 0xA0), false);
    original.add(coin(2, 20, 0xA0), false);

    let mut restored = UtxoSet::new();
    for s in original.get_all_strings() {
        assert!(restored.add_from_string(&s, false).unwrap());
    }
    assert_eq!(restored.get_all(), original.get_all());
    assert_eq!(
        restored.balance(&[addr(0xA0)], &ASSET_X, unix_now()).unwrap(),
        30
    );
}

#[test]
fn unsigned_tx_json_form_roundtrips() {
    let unsigned = build_import_tx(&[coin(1, 100, 0xA0)], &import_request(), &config(0)).unwrap();
    let json = serde_json::to_string(&unsigned).unwrap();
    let back: UnsignedTx = serde_json::from_str(&json).unwrap();
    assert_eq!(back.to_bytes(), unsigned.to_bytes());
}
