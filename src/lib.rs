pub mod collection;
pub mod corpus;
pub mod fallback;
pub mod game;
pub mod painting;
pub mod quiz;
pub mod reward;
pub mod session;
pub mod settings;
pub mod store;
pub mod wasm;

pub use collection::{CollectionEntry, CollectionTracker, MarkOutcome, ModeProgress, ProgressLoad};
pub use corpus::{Corpus, CorpusLoadError, CorpusSource};
pub use fallback::fallback_paintings;
pub use game::{Game, ProgressReporter, RoundAdvance, RoundHandle, RoundReport};
pub use painting::{ALL_GENRES, Genre, Painting, PaintingId, UnknownGenre};
pub use quiz::{
    ChoiceSet, Difficulty, GenreFilter, Question, QuizConfig, QuizConfigError, QuizMode,
    generate_choices, generate_questions,
};
pub use reward::{RewardEngine, RoundReward};
pub use session::{
    AnswerOutcome, Medal, Round, RoundPhase, RoundSummary, SessionError, StreakTier,
    ValidationError, validate_pool,
};
pub use settings::{ConfigError, EngineConfig, Settings};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, migrate_legacy_keys};
