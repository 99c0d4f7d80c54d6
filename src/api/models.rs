use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::ledger::{Block, DEFAULT_DIFFICULTY, Ledger};
use crate::transaction::Transaction;

/// Shared application state: the whole in-memory ledger behind one lock.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
}

impl AppState {
    pub fn new(difficulty: u32) -> Self {
        Self {
            ledger: Mutex::new(Ledger::new(difficulty)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

/* ---------- Wallet API Models ---------- */

#[derive(Deserialize)]
pub struct NewWalletRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct NewWalletResponse {
    pub name: String,
    pub public_key: String,
    pub private_key: String,
}

/* ---------- TX API Models ---------- */

#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub pending_size: usize,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub size: usize,
    pub transactions: Vec<Transaction>,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub difficulty: u32,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub first_invalid_index: Option<u64>,
}

#[derive(Deserialize)]
pub struct MineRequest {
    pub miner_address: String,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub mined_index: u64,
    pub hash: String,
    pub nonce: u64,
    pub difficulty: u32,
    pub transactions: usize,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

#[derive(Deserialize)]
pub struct SetDifficultyRequest {
    pub difficulty: u32,
}

/* ---------- Balance / Stats Models ---------- */

#[derive(Serialize)]
pub struct BalanceResponse {
    pub name: String,
    pub received: u128,
    pub sent: u128,
    pub balance: i128,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub height: usize,
    pub difficulty: u32,
    pub pending_size: usize,
    pub wallets: usize,
    pub last_block_time: String,
}
