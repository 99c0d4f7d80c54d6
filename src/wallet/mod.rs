use std::collections::HashMap;
use std::fmt;

use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("wallet name already taken: {0}")]
    DuplicateIdentity(String),
}

/// A named secp256k1 keypair. The secret key stays private to this struct;
/// the wallet-creation endpoint is the only consumer of its hex accessor.
pub struct Wallet {
    pub name: String,
    secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl Wallet {
    fn generate(name: &str) -> Self {
        let secp = Secp256k1::new();
        let (sk, pk) = secp.generate_keypair(&mut OsRng);
        Self {
            name: name.to_string(),
            secret_key: sk,
            public_key: pk,
        }
    }

    /// Hex of the compressed public key (33 bytes).
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Sign a 32-byte message hash, returning the DER signature hex-encoded.
    pub fn sign_digest_hex(&self, msg32: [u8; 32]) -> String {
        let secp = Secp256k1::new();
        let msg = Message::from_slice(&msg32).expect("digest is 32 bytes");
        let sig = secp.sign_ecdsa(&msg, &self.secret_key);
        hex::encode(sig.serialize_der())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("name", &self.name)
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// One wallet per unique name. An explicit owned instance (never a global),
/// so independent registries can coexist.
#[derive(Default)]
pub struct KeyRegistry {
    wallets: HashMap<String, Wallet>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self {
            wallets: HashMap::new(),
        }
    }

    /// Generate and store a fresh keypair under `name`.
    pub fn create_identity(&mut self, name: &str) -> Result<&Wallet, RegistryError> {
        if self.wallets.contains_key(name) {
            return Err(RegistryError::DuplicateIdentity(name.to_string()));
        }
        let wallet = Wallet::generate(name);
        Ok(self.wallets.entry(name.to_string()).or_insert(wallet))
    }

    /// Read-only lookup, no side effects.
    pub fn lookup(&self, name: &str) -> Option<&Wallet> {
        self.wallets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.wallets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
