//! ALT reward currency: combo rewards, star bonuses and first-clear bonuses.

use std::collections::BTreeSet;

use log::{debug, info};

/// Bonus granted the first time a level key is cleared.
pub const FIRST_CLEAR_BONUS: u32 = 30;

/// ALT granted for a correct answer at the given combo length.
pub fn reward_for_combo(combo: u32) -> u32 {
    if combo >= 4 {
        3
    } else if combo >= 2 {
        2
    } else {
        1
    }
}

/// Star rating for a finished round.
pub fn stars_for_result(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 1;
    }

    let ratio = correct as f64 / total as f64;
    if ratio >= 1.0 {
        3
    } else if ratio >= 0.8 {
        2
    } else {
        1
    }
}

pub fn star_bonus(stars: u8) -> u32 {
    match stars {
        3 => 20,
        2 => 10,
        _ => 5,
    }
}

/// What a round earned, reported once the round completes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RoundReward {
    pub stars: u8,
    pub star_bonus: u32,
    pub first_clear: bool,
    /// Everything earned this round, bonuses included.
    pub round_total: u32,
    pub max_combo: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RewardEngine {
    total: u64,
    combo: u32,
    round_total: u32,
    round_max_combo: u32,
    cleared_levels: BTreeSet<String>,
}

impl RewardEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn round_total(&self) -> u32 {
        self.round_total
    }

    pub fn round_max_combo(&self) -> u32 {
        self.round_max_combo
    }

    pub fn has_cleared(&self, level_key: &str) -> bool {
        self.cleared_levels.contains(level_key)
    }

    fn add(&mut self, amount: u32) {
        self.total += u64::from(amount);
        self.round_total += amount;
    }

    /// Clears the round-scoped counters. The cumulative total and the set of
    /// cleared levels are kept.
    pub fn reset_round(&mut self) {
        self.combo = 0;
        self.round_total = 0;
        self.round_max_combo = 0;
    }

    /// Extends the combo and pays out for it. Returns the amount granted.
    pub fn on_correct(&mut self) -> u32 {
        self.combo += 1;
        self.round_max_combo = self.round_max_combo.max(self.combo);

        let reward = reward_for_combo(self.combo);
        self.add(reward);
        debug!("combo {} pays {} ALT", self.combo, reward);
        reward
    }

    pub fn on_wrong(&mut self) {
        self.combo = 0;
    }

    /// Applies the star bonus and, once per level key, the first-clear bonus.
    pub fn on_round_end(&mut self, correct: usize, total: usize, level_key: &str) -> RoundReward {
        let stars = stars_for_result(correct, total);
        let bonus = star_bonus(stars);
        self.add(bonus);

        let first_clear = self.cleared_levels.insert(level_key.to_string());
        if first_clear {
            self.add(FIRST_CLEAR_BONUS);
            info!("first clear of level {level_key}");
        }

        RoundReward {
            stars,
            star_bonus: bonus,
            first_clear,
            round_total: self.round_total,
            max_combo: self.round_max_combo,
        }
    }
}
