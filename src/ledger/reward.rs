use rand::Rng;

use super::{REWARD_MAX, REWARD_MIN};

/// Chooses the miner-reward amount for the block being assembled at the given
/// height. The ledger takes whatever the policy returns.
pub trait RewardPolicy {
    fn reward_amount(&self, height: u64) -> u64;
}

/// Uniform draw from `REWARD_MIN..=REWARD_MAX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReward;

impl RewardPolicy for RandomReward {
    fn reward_amount(&self, _height: u64) -> u64 {
        rand::thread_rng().gen_range(REWARD_MIN..=REWARD_MAX)
    }
}

/// Constant reward, for callers that need reproducible amounts.
#[derive(Debug, Clone, Copy)]
pub struct FixedReward(pub u64);

impl RewardPolicy for FixedReward {
    fn reward_amount(&self, _height: u64) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_reward_stays_in_bounds() {
        let policy = RandomReward;
        for height in 0..100 {
            let amount = policy.reward_amount(height);
            assert!((REWARD_MIN..=REWARD_MAX).contains(&amount));
        }
    }

    #[test]
    fn fixed_reward_is_constant() {
        let policy = FixedReward(7);
        assert_eq!(policy.reward_amount(0), 7);
        assert_eq!(policy.reward_amount(42), 7);
    }
}
