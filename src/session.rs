//! Per-round state: question progress, answer evaluation, streaks and grading.

use std::collections::HashSet;

use log::{debug, info};

use crate::collection::CollectionTracker;
use crate::painting::{Painting, PaintingId};
use crate::quiz::{Question, QuizConfig, QuizMode};
use crate::reward::{RewardEngine, RoundReward};
use crate::settings::EngineConfig;
use crate::store::KeyValueStore;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("genre quiz needs at least {required} genres but the pool has {available}")]
    InsufficientGenreVariety { required: usize, available: usize },
    #[error("requires at least {required} paintings but only {available} match the selection")]
    PoolTooSmall { required: usize, available: usize },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no round is in progress")]
    NoActiveRound,
    #[error("the current question has not been answered yet")]
    NotAnswered,
    #[error("the round is already complete")]
    RoundComplete,
}

/// Checks that a pool can support a round in `mode`.
pub fn validate_pool(
    pool: &[Painting],
    mode: QuizMode,
    config: &EngineConfig,
) -> Result<(), ValidationError> {
    if mode == QuizMode::Genre {
        let genres: HashSet<_> = pool.iter().map(|painting| painting.genre).collect();
        if genres.len() < config.min_genre_variety {
            return Err(ValidationError::InsufficientGenreVariety {
                required: config.min_genre_variety,
                available: genres.len(),
            });
        }
    }

    // A round needs at least one question whatever the configuration says.
    let required = config.min_pool_size.max(1);
    if pool.len() < required {
        return Err(ValidationError::PoolTooSmall {
            required,
            available: pool.len(),
        });
    }

    Ok(())
}

/// Celebration shown for a run of consecutive correct answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum StreakTier {
    Three,
    Five,
    Ten,
}

impl StreakTier {
    /// Highest tier first.
    const TIERS: [StreakTier; 3] = [StreakTier::Ten, StreakTier::Five, StreakTier::Three];

    pub fn threshold(self) -> u32 {
        match self {
            StreakTier::Three => 3,
            StreakTier::Five => 5,
            StreakTier::Ten => 10,
        }
    }

    pub fn for_streak(streak: u32) -> Option<Self> {
        Self::TIERS
            .into_iter()
            .find(|tier| streak >= tier.threshold())
    }

    pub fn message(self) -> &'static str {
        match self {
            StreakTier::Three => "3連続正解！",
            StreakTier::Five => "5連続！すごい！",
            StreakTier::Ten => "10連続！天才！",
        }
    }

    pub fn flames(self) -> &'static str {
        match self {
            StreakTier::Three => "🔥",
            StreakTier::Five => "🔥🔥",
            StreakTier::Ten => "🔥🔥🔥",
        }
    }
}

/// Grade awarded on the result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Medal {
    Trophy,
    Silver,
    Bronze,
    Explorer,
}

impl Medal {
    pub fn for_ratio(ratio: f64) -> Self {
        if ratio >= 0.9 {
            Medal::Trophy
        } else if ratio >= 0.7 {
            Medal::Silver
        } else if ratio >= 0.5 {
            Medal::Bronze
        } else {
            Medal::Explorer
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Medal::Trophy => "🏆",
            Medal::Silver => "🥈",
            Medal::Bronze => "🥉",
            Medal::Explorer => "📖",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Medal::Trophy => "Magnificent!",
            Medal::Silver => "Well Done!",
            Medal::Bronze => "Good Effort!",
            Medal::Explorer => "Keep Exploring!",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Medal::Trophy => "芸術の真の鑑定家です",
            Medal::Silver => "素晴らしい審美眼をお持ちです",
            Medal::Bronze => "美術館をもっと巡ってみよう",
            Medal::Explorer => "名画の世界は奥が深い！",
        }
    }
}

/// Everything the presentation layer needs to react to one answer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AnswerOutcome {
    pub painting_id: PaintingId,
    pub chosen: String,
    pub correct: bool,
    pub correct_answer: String,
    pub streak: u32,
    pub streak_tier: Option<StreakTier>,
    /// ALT paid for this answer; zero when wrong.
    pub alt_gained: u32,
    pub combo: u32,
    /// Whether the painting is in the collection after this answer.
    pub collected: bool,
    pub newly_collected: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RoundSummary {
    pub correct_count: usize,
    pub wrong_count: usize,
    pub total: usize,
    /// Accuracy rounded to a whole percent.
    pub percentage: u32,
    pub medal: Medal,
    /// Accuracy high enough for the confetti effect.
    pub celebrate: bool,
    pub max_streak: u32,
    pub correct_paintings: Vec<Painting>,
    /// Present once the round is complete.
    pub reward: Option<RoundReward>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    InRound { index: usize, answered: bool },
    Complete,
}

/// What [`Round::advance`] moved to.
#[derive(Debug, PartialEq)]
pub enum Advance<'a> {
    Question(&'a Question),
    Complete(&'a RoundReward),
}

/// One round of questions from start to result screen.
///
/// The "already answered" guard lives here, so separate rounds never share it.
#[derive(Debug, Clone)]
pub struct Round {
    config: QuizConfig,
    questions: Vec<Question>,
    index: usize,
    answer: Option<AnswerOutcome>,
    correct_count: usize,
    wrong_count: usize,
    streak: u32,
    max_streak: u32,
    correct_paintings: Vec<Painting>,
    reward: Option<RoundReward>,
}

impl Round {
    pub fn new(config: QuizConfig, questions: Vec<Question>) -> Self {
        info!(
            "round started: {} with {} questions",
            config.level_key(),
            questions.len()
        );

        Self {
            config,
            questions,
            index: 0,
            answer: None,
            correct_count: 0,
            wrong_count: 0,
            streak: 0,
            max_streak: 0,
            correct_paintings: Vec::new(),
            reward: None,
        }
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn phase(&self) -> RoundPhase {
        if self.reward.is_some() {
            RoundPhase::Complete
        } else {
            RoundPhase::InRound {
                index: self.index,
                answered: self.answer.is_some(),
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.reward.is_some()
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            return None;
        }
        self.questions.get(self.index)
    }

    /// Outcome recorded for the current question, if it has been answered.
    pub fn current_answer(&self) -> Option<&AnswerOutcome> {
        self.answer.as_ref()
    }

    /// Evaluates `choice` against the current question.
    ///
    /// Only the first call per question has any effect; later calls return
    /// the recorded outcome unchanged.
    pub fn answer<S: KeyValueStore>(
        &mut self,
        choice: &str,
        rewards: &mut RewardEngine,
        collection: &mut CollectionTracker<S>,
    ) -> Result<AnswerOutcome, SessionError> {
        if self.is_complete() {
            return Err(SessionError::RoundComplete);
        }
        if let Some(recorded) = &self.answer {
            debug!("question {} already answered; ignoring", self.index);
            return Ok(recorded.clone());
        }
        let question = self
            .questions
            .get(self.index)
            .ok_or(SessionError::NoActiveRound)?;

        let correct = question.is_correct(choice);
        let painting = question.painting.clone();
        let correct_answer = question.correct.clone();

        let outcome = if correct {
            self.correct_count += 1;
            self.streak += 1;
            self.max_streak = self.max_streak.max(self.streak);

            let marked = collection.mark_correct(&painting.id, self.config.mode);
            let alt_gained = rewards.on_correct();
            self.correct_paintings.push(painting.clone());

            AnswerOutcome {
                painting_id: painting.id,
                chosen: choice.to_string(),
                correct,
                correct_answer,
                streak: self.streak,
                streak_tier: StreakTier::for_streak(self.streak),
                alt_gained,
                combo: rewards.combo(),
                collected: marked.collected,
                newly_collected: marked.newly_collected,
            }
        } else {
            self.wrong_count += 1;
            self.streak = 0;
            rewards.on_wrong();

            AnswerOutcome {
                collected: collection.is_collected(&painting.id),
                painting_id: painting.id,
                chosen: choice.to_string(),
                correct,
                correct_answer,
                streak: 0,
                streak_tier: None,
                alt_gained: 0,
                combo: 0,
                newly_collected: false,
            }
        };

        debug!(
            "question {} answered {}",
            self.index,
            if outcome.correct { "correctly" } else { "wrongly" }
        );
        self.answer = Some(outcome.clone());
        Ok(outcome)
    }

    /// Moves past an answered question, finishing the round after the last one.
    pub fn advance(&mut self, rewards: &mut RewardEngine) -> Result<Advance<'_>, SessionError> {
        if self.is_complete() {
            return Err(SessionError::RoundComplete);
        }
        if self.answer.is_none() {
            return Err(SessionError::NotAnswered);
        }

        self.answer = None;
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            return Ok(Advance::Question(&self.questions[self.index]));
        }

        let reward = rewards.on_round_end(
            self.correct_count,
            self.questions.len(),
            &self.config.level_key(),
        );
        info!(
            "round complete: {}/{} correct, {} ALT earned",
            self.correct_count,
            self.questions.len(),
            reward.round_total
        );
        Ok(Advance::Complete(self.reward.insert(reward)))
    }

    pub fn summary(&self) -> RoundSummary {
        let total = self.questions.len();
        let ratio = if total > 0 {
            self.correct_count as f64 / total as f64
        } else {
            0.0
        };

        RoundSummary {
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
            total,
            percentage: (ratio * 100.0).round() as u32,
            medal: Medal::for_ratio(ratio),
            celebrate: ratio >= 0.9,
            max_streak: self.max_streak,
            correct_paintings: self.correct_paintings.clone(),
            reward: self.reward.clone(),
        }
    }
}
