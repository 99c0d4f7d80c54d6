pub mod block;
pub mod model;
pub mod reward;

pub use block::{Block, CancelToken};
pub use model::{Ledger, LedgerError};
pub use reward::{FixedReward, RandomReward, RewardPolicy};

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Bounds for the default randomized miner reward.
pub const REWARD_MIN: u64 = 5;
pub const REWARD_MAX: u64 = 15;

/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";
