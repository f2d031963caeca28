//! The service object a presentation layer drives: start a round, answer,
//! advance, read the results.

use log::{info, warn};
use rand::Rng;

use crate::collection::CollectionTracker;
use crate::corpus::Corpus;
use crate::quiz::{Difficulty, GenreFilter, Question, QuizConfig, QuizMode, generate_questions};
use crate::reward::RewardEngine;
use crate::session::{
    Advance, AnswerOutcome, Round, RoundSummary, SessionError, ValidationError, validate_pool,
};
use crate::settings::{self, EngineConfig, Settings};
use crate::store::{KeyValueStore, StoreError, migrate_legacy_keys};

/// Points per correct answer in a [`RoundReport`].
pub const SCORE_PER_CORRECT: u32 = 10;

/// End-of-round figures handed to an external progress sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RoundReport {
    pub score: u32,
    pub correct_count: usize,
    pub total_count: usize,
    pub max_streak: u32,
}

impl RoundReport {
    pub fn from_summary(summary: &RoundSummary) -> Self {
        Self {
            score: summary.correct_count as u32 * SCORE_PER_CORRECT,
            correct_count: summary.correct_count,
            total_count: summary.total,
            max_streak: summary.max_streak,
        }
    }
}

/// Optional sink notified once per completed round.
pub trait ProgressReporter {
    fn report_round(&mut self, report: &RoundReport);
}

impl<F: FnMut(&RoundReport)> ProgressReporter for F {
    fn report_round(&mut self, report: &RoundReport) {
        self(report)
    }
}

/// Returned by [`Game::start_round`]; the first question is available through
/// [`Game::current_question`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RoundHandle {
    #[serde(skip)]
    pub config: QuizConfig,
    pub level_key: String,
    pub question_count: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundAdvance {
    Question(Question),
    RoundComplete(RoundSummary),
}

pub struct Game<S, R> {
    corpus: Corpus,
    config: EngineConfig,
    collection: CollectionTracker<S>,
    rewards: RewardEngine,
    round: Option<Round>,
    rng: R,
    reporter: Option<Box<dyn ProgressReporter>>,
}

impl<S: KeyValueStore, R: Rng> Game<S, R> {
    /// Builds the engine, migrating legacy progress keys before the collection
    /// is read.
    pub fn new(corpus: Corpus, mut store: S, rng: R) -> Self {
        migrate_legacy_keys(&mut store);

        Self {
            corpus,
            config: EngineConfig::default(),
            collection: CollectionTracker::open(store),
            rewards: RewardEngine::new(),
            round: None,
            rng,
            reporter: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_reporter(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn collection(&self) -> &CollectionTracker<S> {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut CollectionTracker<S> {
        &mut self.collection
    }

    pub fn rewards(&self) -> &RewardEngine {
        &self.rewards
    }

    pub fn rewards_mut(&mut self) -> &mut RewardEngine {
        &mut self.rewards
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Validates the selection and, only if it passes, replaces any previous
    /// round with a fresh one.
    pub fn start_round(
        &mut self,
        mode: QuizMode,
        difficulty: Difficulty,
        genre_filter: GenreFilter,
    ) -> Result<RoundHandle, ValidationError> {
        let config = QuizConfig::new(mode, difficulty, genre_filter);
        let pool = self.corpus.pool(genre_filter, difficulty);
        if let Err(err) = validate_pool(&pool, mode, &self.config) {
            warn!("cannot start {}: {err}", config.level_key());
            return Err(err);
        }

        let questions = generate_questions(
            &mut self.rng,
            &pool,
            self.corpus.paintings(),
            mode,
            config.choice_count(),
            self.config.round_size,
        );

        self.rewards.reset_round();
        let round = self.round.insert(Round::new(config, questions));

        Ok(RoundHandle {
            config,
            level_key: config.level_key(),
            question_count: round.len(),
        })
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.round.as_ref().and_then(Round::current_question)
    }

    pub fn submit_answer(&mut self, choice: &str) -> Result<AnswerOutcome, SessionError> {
        let round = self.round.as_mut().ok_or(SessionError::NoActiveRound)?;
        round.answer(choice, &mut self.rewards, &mut self.collection)
    }

    /// Moves to the next question, or grades the round and notifies the
    /// reporter after the last one.
    pub fn advance(&mut self) -> Result<RoundAdvance, SessionError> {
        let round = self.round.as_mut().ok_or(SessionError::NoActiveRound)?;
        let next = match round.advance(&mut self.rewards)? {
            Advance::Question(question) => Some(question.clone()),
            Advance::Complete(_) => None,
        };

        if let Some(question) = next {
            return Ok(RoundAdvance::Question(question));
        }

        let summary = round.summary();
        if let Some(reporter) = self.reporter.as_mut() {
            let report = RoundReport::from_summary(&summary);
            info!("reporting round score {}", report.score);
            reporter.report_round(&report);
        }
        Ok(RoundAdvance::RoundComplete(summary))
    }

    pub fn round_summary(&self) -> Option<RoundSummary> {
        self.round.as_ref().map(Round::summary)
    }

    /// Drops the current round without grading it.
    pub fn abandon_round(&mut self) {
        if self.round.take().is_some() {
            info!("round abandoned");
        }
    }

    /// Wipes collection progress. Callers must confirm with the player first.
    pub fn reset_progress(&mut self) -> Result<(), StoreError> {
        self.collection.reset()
    }

    pub fn settings(&self) -> Settings {
        Settings::load(self.collection.store())
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        settings.save(self.collection.store_mut())
    }

    pub fn tutorial_pending(&self) -> bool {
        !settings::tutorial_shown(self.collection.store())
    }

    pub fn complete_tutorial(&mut self) -> Result<(), StoreError> {
        settings::mark_tutorial_shown(self.collection.store_mut())
    }
}
