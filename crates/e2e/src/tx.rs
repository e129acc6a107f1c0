use k256::ecdsa::signature::Signer as _;
use k256::ecdsa::Signature;
use pox_types::{ContractCall, SignedTransaction};

use crate::TestSigner;

/// Flat fee every scenario transaction pays. Devnet accounts are funded
/// far beyond this, so tests never compute fees.
pub const DEFAULT_TX_FEE: u64 = 1_000;

/// Assembles and signs the wire envelope for one contract call.
pub fn sign_transaction(
    signer: &TestSigner,
    nonce: u64,
    fee: u64,
    payload: ContractCall,
) -> SignedTransaction {
    let mut transaction = SignedTransaction {
        sender: signer.address.clone(),
        public_key: signer.public_key_hex(),
        nonce,
        fee,
        payload,
        signature: String::new(),
    };
    let signature: Signature = signer.signing_key.sign(&transaction.signing_payload());
    transaction.signature = hex::encode(signature.to_bytes());
    transaction
}
