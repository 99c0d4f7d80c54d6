use log::{debug, info};
use thiserror::Error;

use super::GENESIS_PREV_HASH;
use super::block::{Block, CancelToken};
use super::reward::{RandomReward, RewardPolicy};
use crate::transaction::{AuthError, Authenticator, Transaction};
use crate::wallet::KeyRegistry;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transaction rejected: {0}")]
    Auth(#[from] AuthError),
    /// A signature the ledger itself just produced did not verify. This
    /// should never happen absent a bug and is surfaced separately from
    /// client-caused rejections.
    #[error("locally signed transaction failed verification")]
    SelfVerifyFailed,
    #[error("no pending transactions to mine")]
    EmptyQueue,
    #[error("mining cancelled before a valid nonce was found")]
    MiningCancelled,
}

/// Single-process append-only ledger: owns the chain, the pending queue and
/// the wallet registry. All mutation goes through the methods below.
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    registry: KeyRegistry,
    difficulty: u32,
    reward: Box<dyn RewardPolicy + Send>,
}

impl Ledger {
    /// Initialize a new ledger with a genesis block.
    pub fn new(difficulty: u32) -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
            registry: KeyRegistry::new(),
            difficulty,
            reward: Box::new(RandomReward),
        };
        ledger.chain.push(Block::genesis());
        ledger
    }

    /// Swap the reward policy (tests pin a `FixedReward`).
    pub fn with_reward_policy(mut self, reward: Box<dyn RewardPolicy + Send>) -> Self {
        self.reward = reward;
        self
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut KeyRegistry {
        &mut self.registry
    }

    /// Read-only view of the chain for display/export collaborators.
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Admitted transactions not yet mined into a block.
    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Changing difficulty affects future blocks only.
    pub fn set_difficulty(&mut self, difficulty: u32) {
        self.difficulty = difficulty;
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger always holds at least the genesis block")
    }

    /// Sign a transfer with the sender's key, verify the fresh signature and
    /// queue it. Fail-closed: nothing enters the queue unverified.
    pub fn submit_transaction(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let auth = Authenticator::new(&self.registry);
        let tx = auth.sign(sender, recipient, amount)?;
        if !auth.verify(&tx) {
            return Err(LedgerError::SelfVerifyFailed);
        }

        debug!("queued tx {} -> {} ({})", tx.sender, tx.recipient, tx.amount);
        self.pending.push(tx);
        Ok(())
    }

    /// Mine the pending queue into a new block credited to `miner_address`.
    /// Blocking; see `mine_pending_with_cancel` for an abortable variant.
    pub fn mine_pending(&mut self, miner_address: &str) -> Result<&Block, LedgerError> {
        self.mine_pending_with_cancel(miner_address, &CancelToken::new())
    }

    /// Assemble a candidate from the queue plus a miner-reward transaction,
    /// run the nonce search, then append the block and clear the queue as one
    /// step. A cancelled or empty-queue call leaves all state untouched.
    pub fn mine_pending_with_cancel(
        &mut self,
        miner_address: &str,
        cancel: &CancelToken,
    ) -> Result<&Block, LedgerError> {
        if self.pending.is_empty() {
            return Err(LedgerError::EmptyQueue);
        }

        let reward_amount = self.reward.reward_amount(self.chain.len() as u64);
        let mut transactions = self.pending.clone();
        transactions.push(Transaction::reward(miner_address, reward_amount));

        let mut block = Block::new(
            self.chain.len() as u64,
            self.last_block().hash.clone(),
            transactions,
            miner_address,
        );
        block
            .mine_with_cancel(self.difficulty, cancel)
            .map_err(|_| LedgerError::MiningCancelled)?;

        info!(
            "sealed block #{} (hash={}, nonce={}, txs={})",
            block.index,
            block.hash,
            block.nonce,
            block.transactions.len()
        );
        self.chain.push(block);
        self.pending.clear();
        Ok(self.last_block())
    }

    /// Walk the chain recomputing each block's hash and checking linkage.
    /// `None` means the chain is intact; otherwise the first failing index.
    pub fn first_invalid_index(&self) -> Option<u64> {
        let genesis = match self.chain.first() {
            Some(b) => b,
            None => return Some(0),
        };
        if genesis.index != 0 || genesis.previous_hash != GENESIS_PREV_HASH || !genesis.is_valid() {
            return Some(0);
        }

        for i in 1..self.chain.len() {
            let current = &self.chain[i];
            let prev = &self.chain[i - 1];

            // Hash integrity: detects tampering with any field.
            if !current.is_valid() {
                return Some(i as u64);
            }
            // Linkage: detects broken ordering or a replaced predecessor.
            if current.previous_hash != prev.hash {
                return Some(i as u64);
            }
        }
        None
    }

    /// Validate the entire chain.
    pub fn is_valid_chain(&self) -> bool {
        self.first_invalid_index().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::reward::FixedReward;
    use crate::transaction::REWARD_SENDER;

    fn ledger_with_wallets(difficulty: u32, names: &[&str]) -> Ledger {
        let mut ledger = Ledger::new(difficulty).with_reward_policy(Box::new(FixedReward(7)));
        for name in names {
            ledger.registry_mut().create_identity(name).unwrap();
        }
        ledger
    }

    #[test]
    fn fresh_ledger_is_valid() {
        let ledger = Ledger::new(2);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.pending().is_empty());
        assert!(ledger.is_valid_chain());
        assert_eq!(ledger.first_invalid_index(), None);
    }

    #[test]
    fn submit_then_mine_scenario() {
        let mut ledger = ledger_with_wallets(2, &["A", "B"]);

        ledger.submit_transaction("A", "B", 10).unwrap();
        ledger.submit_transaction("B", "A", 5).unwrap();
        assert_eq!(ledger.pending().len(), 2);

        let block = ledger.mine_pending("miner1").unwrap();
        assert_eq!(block.index, 1);
        assert!(block.hash.starts_with("00"));
        assert_eq!(block.miner.as_deref(), Some("miner1"));

        // Two transfers plus the reward, in submission order.
        assert_eq!(block.transactions.len(), 3);
        assert_eq!(block.transactions[0].sender, "A");
        assert_eq!(block.transactions[1].sender, "B");
        let reward = &block.transactions[2];
        assert_eq!(reward.sender, REWARD_SENDER);
        assert_eq!(reward.recipient, "miner1");
        assert_eq!(reward.amount, 7);
        assert!(reward.signature.is_empty());

        assert_eq!(ledger.len(), 2);
        assert!(ledger.pending().is_empty());
        assert!(ledger.is_valid_chain());
    }

    #[test]
    fn mining_empty_queue_is_rejected() {
        let mut ledger = Ledger::new(2);
        let err = ledger.mine_pending("miner1").unwrap_err();
        assert!(matches!(err, LedgerError::EmptyQueue));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn queue_clears_only_on_success() {
        let mut ledger = ledger_with_wallets(1, &["A", "B"]);
        ledger.submit_transaction("A", "B", 3).unwrap();

        // Cancelled search: chain and queue untouched.
        ledger.set_difficulty(64);
        let token = CancelToken::new();
        token.cancel();
        let err = ledger.mine_pending_with_cancel("miner1", &token).unwrap_err();
        assert!(matches!(err, LedgerError::MiningCancelled));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.pending().len(), 1);

        // Successful mine: exactly one block appended, queue emptied.
        ledger.set_difficulty(1);
        ledger.mine_pending("miner1").unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.pending().is_empty());

        // And the queue really is gone: the next mine has nothing to do.
        let err = ledger.mine_pending("miner1").unwrap_err();
        assert!(matches!(err, LedgerError::EmptyQueue));
    }

    #[test]
    fn unknown_sender_is_rejected() {
        let mut ledger = ledger_with_wallets(1, &["A"]);
        let err = ledger.submit_transaction("ghost", "A", 1).unwrap_err();
        assert!(matches!(err, LedgerError::Auth(AuthError::UnknownIdentity(_))));
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn chain_links_blocks_by_hash() {
        let mut ledger = ledger_with_wallets(1, &["A", "B"]);

        ledger.submit_transaction("A", "B", 1).unwrap();
        ledger.mine_pending("m").unwrap();
        ledger.submit_transaction("B", "A", 2).unwrap();
        ledger.mine_pending("m").unwrap();

        assert_eq!(ledger.len(), 3);
        for i in 1..ledger.len() {
            assert_eq!(ledger.chain()[i].previous_hash, ledger.chain()[i - 1].hash);
        }
        assert!(ledger.is_valid_chain());
    }

    #[test]
    fn tampered_amount_is_detected() {
        let mut ledger = ledger_with_wallets(1, &["A", "B"]);
        ledger.submit_transaction("A", "B", 10).unwrap();
        ledger.mine_pending("m").unwrap();
        assert!(ledger.is_valid_chain());

        ledger.chain[1].transactions[0].amount = 999;
        assert!(!ledger.is_valid_chain());
        assert_eq!(ledger.first_invalid_index(), Some(1));
    }

    #[test]
    fn rewritten_block_breaks_linkage_downstream() {
        let mut ledger = ledger_with_wallets(1, &["A", "B"]);
        ledger.submit_transaction("A", "B", 1).unwrap();
        ledger.mine_pending("m").unwrap();
        ledger.submit_transaction("B", "A", 1).unwrap();
        ledger.mine_pending("m").unwrap();

        // Rewrite block 1 and recompute its hash so the block itself passes;
        // block 2 still links to the old hash.
        ledger.chain[1].transactions[0].amount = 999;
        ledger.chain[1].hash = ledger.chain[1].compute_hash();
        assert!(!ledger.is_valid_chain());
        assert_eq!(ledger.first_invalid_index(), Some(2));
    }

    #[test]
    fn tampered_genesis_is_detected() {
        let mut ledger = ledger_with_wallets(1, &["A", "B"]);
        ledger.chain[0].previous_hash = "1".repeat(64);
        assert_eq!(ledger.first_invalid_index(), Some(0));
    }
}
