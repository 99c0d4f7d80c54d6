use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Sender name carried by miner-reward transactions. Not a real wallet;
/// reward transactions are produced internally and carry no signature.
pub const REWARD_SENDER: &str = "Blockchain";

/// A value transfer between two named wallets. Immutable once signed: any
/// later change to sender, recipient or amount invalidates the signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    /// Integer minor units, so the signing payload text is canonical.
    pub amount: u64,
    /// Hex-encoded DER ECDSA signature; empty on reward transactions.
    pub signature: String,
}

impl Transaction {
    /// Build the unsigned miner-reward transaction for a mined block.
    pub fn reward(recipient: &str, amount: u64) -> Self {
        Self {
            sender: REWARD_SENDER.to_string(),
            recipient: recipient.to_string(),
            amount,
            signature: String::new(),
        }
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }

    /// Canonical signing payload: `"{sender}->{recipient}:{amount}"`.
    pub fn signing_payload(sender: &str, recipient: &str, amount: u64) -> Vec<u8> {
        format!("{sender}->{recipient}:{amount}").into_bytes()
    }

    /// SHA-256 of the signing payload for the given fields.
    pub fn payload_sighash(sender: &str, recipient: &str, amount: u64) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(Self::signing_payload(sender, recipient, amount));
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest[..]);
        out
    }

    /// Sighash recomputed from this transaction's own fields.
    pub fn sighash(&self) -> [u8; 32] {
        Self::payload_sighash(&self.sender, &self.recipient, self.amount)
    }
}
