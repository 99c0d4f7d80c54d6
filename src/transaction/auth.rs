use secp256k1::{Message, Secp256k1, ecdsa::Signature};
use thiserror::Error;

use super::model::Transaction;
use crate::wallet::KeyRegistry;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unknown wallet: {0}")]
    UnknownIdentity(String),
}

/// Signs and verifies transactions against a wallet registry. Borrows the
/// registry read-only and never mutates it.
pub struct Authenticator<'a> {
    registry: &'a KeyRegistry,
}

impl<'a> Authenticator<'a> {
    pub fn new(registry: &'a KeyRegistry) -> Self {
        Self { registry }
    }

    /// Sign the canonical payload with the sender's private key. Both parties
    /// must be registered.
    pub fn sign(&self, sender: &str, recipient: &str, amount: u64) -> Result<Transaction, AuthError> {
        let wallet = self
            .registry
            .lookup(sender)
            .ok_or_else(|| AuthError::UnknownIdentity(sender.to_string()))?;
        if !self.registry.contains(recipient) {
            return Err(AuthError::UnknownIdentity(recipient.to_string()));
        }

        let sighash = Transaction::payload_sighash(sender, recipient, amount);
        Ok(Transaction {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            amount,
            signature: wallet.sign_digest_hex(sighash),
        })
    }

    /// Recompute the signing payload from the transaction's own fields and
    /// check the signature against the sender's registered public key. Any
    /// missing identity, malformed bytes or mismatch yields `false`, never an
    /// error: failed verification is an expected outcome.
    pub fn verify(&self, tx: &Transaction) -> bool {
        let wallet = match self.registry.lookup(&tx.sender) {
            Some(w) => w,
            None => return false,
        };
        let sig_bytes = match hex::decode(&tx.signature) {
            Ok(b) => b,
            Err(_) => return false,
        };
        let sig = match Signature::from_der(&sig_bytes) {
            Ok(s) => s,
            Err(_) => return false,
        };
        let msg = Message::from_slice(&tx.sighash()).expect("digest is 32 bytes");

        let secp = Secp256k1::verification_only();
        secp.verify_ecdsa(&msg, &sig, &wallet.public_key).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(names: &[&str]) -> KeyRegistry {
        let mut registry = KeyRegistry::new();
        for name in names {
            registry.create_identity(name).unwrap();
        }
        registry
    }

    #[test]
    fn sign_verify_roundtrip() {
        let registry = registry_with(&["alice", "bob"]);
        let auth = Authenticator::new(&registry);

        let tx = auth.sign("alice", "bob", 10).unwrap();
        assert_eq!(tx.sender, "alice");
        assert_eq!(tx.recipient, "bob");
        assert_eq!(tx.amount, 10);
        assert!(auth.verify(&tx));
    }

    #[test]
    fn unknown_parties_cannot_sign() {
        let registry = registry_with(&["alice"]);
        let auth = Authenticator::new(&registry);

        let err = auth.sign("mallory", "alice", 1).unwrap_err();
        assert!(matches!(err, AuthError::UnknownIdentity(name) if name == "mallory"));

        let err = auth.sign("alice", "nobody", 1).unwrap_err();
        assert!(matches!(err, AuthError::UnknownIdentity(name) if name == "nobody"));
    }

    #[test]
    fn altered_amount_fails_verification() {
        let registry = registry_with(&["alice", "bob"]);
        let auth = Authenticator::new(&registry);

        let mut tx = auth.sign("alice", "bob", 10).unwrap();
        tx.amount = 11;
        assert!(!auth.verify(&tx));
    }

    #[test]
    fn corrupted_signature_fails_verification() {
        let registry = registry_with(&["alice", "bob"]);
        let auth = Authenticator::new(&registry);

        let tx = auth.sign("alice", "bob", 10).unwrap();

        // Flip the last hex digit while keeping the string valid hex.
        let mut corrupted = tx.clone();
        let last = corrupted.signature.pop().unwrap();
        corrupted.signature.push(if last == '0' { '1' } else { '0' });
        assert!(!auth.verify(&corrupted));

        // Garbage that is not hex at all.
        let mut garbage = tx.clone();
        garbage.signature = "not-hex".to_string();
        assert!(!auth.verify(&garbage));

        // Valid hex that is not a DER signature.
        let mut bad_der = tx;
        bad_der.signature = "deadbeef".to_string();
        assert!(!auth.verify(&bad_der));
    }

    #[test]
    fn unsigned_reward_never_verifies() {
        let registry = registry_with(&["alice"]);
        let auth = Authenticator::new(&registry);
        assert!(!auth.verify(&Transaction::reward("alice", 5)));
    }

    #[test]
    fn wrong_sender_key_fails_verification() {
        let registry = registry_with(&["alice", "bob"]);
        let auth = Authenticator::new(&registry);

        // Signed by alice, then claimed to be from bob.
        let mut tx = auth.sign("alice", "bob", 10).unwrap();
        tx.sender = "bob".to_string();
        tx.recipient = "alice".to_string();
        assert!(!auth.verify(&tx));
    }
}
