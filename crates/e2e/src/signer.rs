use k256::ecdsa::SigningKey;
use pox_types::PoxAddr;
use sha2::{Digest as _, Sha256};
use tracing::warn;

/// Devnet identity: a secp256k1 key plus the principal address derived
/// from it.
#[derive(Debug, Clone)]
pub struct TestSigner {
    pub signing_key: SigningKey,
    pub address: String,
    pub name: String,
}

impl TestSigner {
    pub fn from_private_key(private_key_hex: &str, name: impl Into<String>) -> eyre::Result<Self> {
        let key_bytes = hex::decode(private_key_hex.trim_start_matches("0x"))?;
        let signing_key = SigningKey::from_slice(&key_bytes)?;
        let address = derive_address(&signing_key);
        Ok(Self {
            signing_key,
            address,
            name: name.into(),
        })
    }

    pub fn random(name: impl Into<String>) -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let address = derive_address(&signing_key);
        Self {
            signing_key,
            address,
            name: name.into(),
        }
    }

    /// Compressed public key, hex encoded, the way the node expects it in
    /// a transaction envelope.
    pub fn public_key_hex(&self) -> String {
        hex::encode(
            self.signing_key
                .verifying_key()
                .to_encoded_point(true)
                .as_bytes(),
        )
    }

    /// Reward address backed by the same key, for `pox-addr` arguments.
    pub fn pox_addr(&self) -> PoxAddr {
        PoxAddr::new(0, address_hash_hex(&self.signing_key))
    }
}

fn address_hash_hex(key: &SigningKey) -> String {
    let compressed = key.verifying_key().to_encoded_point(true);
    let digest = Sha256::digest(compressed.as_bytes());
    hex::encode(&digest[..20])
}

/// Principals are the first 20 bytes of the hashed compressed public key,
/// upper hex, behind an `ST` prefix.
fn derive_address(key: &SigningKey) -> String {
    format!("ST{}", address_hash_hex(key).to_uppercase())
}

/// Loads signers from `POX_SIGNER_KEYS` (comma separated hex private keys).
pub fn load_test_signers_from_env() -> eyre::Result<Vec<TestSigner>> {
    match std::env::var("POX_SIGNER_KEYS") {
        Ok(keys) => keys
            .split(',')
            .enumerate()
            .map(|(i, key)| TestSigner::from_private_key(key.trim(), format!("signer{}", i)))
            .collect(),
        Err(_) => {
            warn!("POX_SIGNER_KEYS not set, using default devnet keys");
            // Default devnet keys (DO NOT USE IN PRODUCTION)
            let default_keys = [
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
                "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
                "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
                "0x7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6",
                "0x47e179ec197488593b187f80a00eb0da91f1b9d0b13f8733639f19c30a34926a",
                "0x8b3a350cf5c34c9194ca85829a2df0ec3153be0318b5e2d3348e872092edffba",
            ];
            default_keys
                .iter()
                .enumerate()
                .map(|(i, key)| TestSigner::from_private_key(key, format!("signer{}", i)))
                .collect()
        }
    }
}
