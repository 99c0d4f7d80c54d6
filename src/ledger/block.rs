use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::GENESIS_PREV_HASH;
use crate::transaction::Transaction;

/// A single block in the ledger holding a list of transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // Unix timestamp (UTC), fixed at creation
    pub previous_hash: String,
    pub nonce: u64, // Proof-of-Work nonce
    /// Address credited for mining this block; `None` on genesis.
    pub miner: Option<String>,
    pub hash: String, // Cached hash of the block
    pub transactions: Vec<Transaction>,
}

/// The nonce search was aborted through its `CancelToken`.
#[derive(Debug, Error)]
#[error("mining cancelled before a valid nonce was found")]
pub struct MineCancelled;

/// Shared flag for aborting an in-flight nonce search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        let mut block = Self {
            index: 0,
            timestamp: Utc::now().timestamp(),
            previous_hash: GENESIS_PREV_HASH.to_string(),
            nonce: 0,
            miner: None,
            hash: String::new(),
            transactions: Vec::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create a new candidate block (not mined yet). Call `mine()` to perform
    /// the Proof-of-Work search.
    pub fn new(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        miner: &str,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp: Utc::now().timestamp(),
            previous_hash,
            nonce: 0,
            miner: Some(miner.to_string()),
            hash: String::new(),
            transactions,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Compute the SHA-256 hash of this block from its fields (excluding the
    /// `hash` field itself). Transactions are serialized deterministically as
    /// JSON and included in the preimage, so two field-wise equal blocks
    /// always hash identically.
    pub fn compute_hash(&self) -> String {
        let txs_json = serde_json::to_string(&self.transactions).expect("serialize txs");
        let preimage = format!(
            "{}:{}:{}:{}:{}:{}",
            self.index,
            self.timestamp,
            self.previous_hash,
            self.nonce,
            self.miner.as_deref().unwrap_or(""),
            txs_json
        );
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Perform Proof-of-Work by finding a nonce that yields a hash starting
    /// with `difficulty` leading zeros (in hex). Blocks until found; the
    /// timestamp stays fixed, so the search space is the nonce alone.
    pub fn mine(&mut self, difficulty: u32) {
        let target_prefix = "0".repeat(difficulty as usize);
        loop {
            self.hash = self.compute_hash();
            if self.hash.starts_with(&target_prefix) {
                break;
            }
            self.nonce = self.nonce.wrapping_add(1);
        }
    }

    /// Same search, abortable: returns `MineCancelled` once `cancel` fires.
    /// The block keeps its last attempted nonce/hash but is not chain-worthy.
    pub fn mine_with_cancel(
        &mut self,
        difficulty: u32,
        cancel: &CancelToken,
    ) -> Result<(), MineCancelled> {
        let target_prefix = "0".repeat(difficulty as usize);
        loop {
            self.hash = self.compute_hash();
            if self.hash.starts_with(&target_prefix) {
                return Ok(());
            }
            if cancel.is_cancelled() {
                return Err(MineCancelled);
            }
            self.nonce = self.nonce.wrapping_add(1);
        }
    }

    /// Validate that the cached `hash` matches the block's content.
    /// (Does NOT validate chain linkage.)
    pub fn is_valid(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Human-readable UTC form of `timestamp`.
    pub fn readable_timestamp(&self) -> String {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.to_string())
    }
}
