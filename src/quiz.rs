use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use std::str::FromStr;

use crate::painting::{ALL_GENRES, Genre, Painting, UnknownGenre};

/// Placeholder used when not enough distinct wrong answers can be found.
pub const UNKNOWN_ANSWER: &str = "不明";

/// Number of questions in a full round.
pub const QUESTIONS_PER_ROUND: usize = 10;

/// What the player is asked to identify about a painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Shows a painting and expects its title.
    Title,
    /// Shows a painting and expects its artist.
    Artist,
    /// Shows a painting and expects its genre.
    Genre,
}

impl QuizMode {
    pub const ALL: [QuizMode; 3] = [QuizMode::Title, QuizMode::Artist, QuizMode::Genre];

    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Title => "title",
            QuizMode::Artist => "artist",
            QuizMode::Genre => "genre",
        }
    }

    /// The string a painting is quizzed on in this mode.
    pub fn answer_for(self, painting: &Painting) -> String {
        match self {
            QuizMode::Title => painting.title().to_string(),
            QuizMode::Artist => painting.artist().to_string(),
            QuizMode::Genre => painting.genre.label().to_string(),
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizMode {
    type Err = QuizConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        QuizMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| QuizConfigError::UnknownMode(value.to_string()))
    }
}

/// Quiz difficulty. Level 1 offers three choices, higher levels four.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Easy = 1,
    Normal = 2,
    Hard = 3,
}

impl Difficulty {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn choice_count(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Normal | Difficulty::Hard => 4,
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = QuizConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Normal),
            3 => Ok(Difficulty::Hard),
            other => Err(QuizConfigError::UnknownDifficulty(other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.level()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Restricts the candidate pool to one genre, or leaves it open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Only(Genre),
}

impl GenreFilter {
    pub fn admits(self, genre: Genre) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Only(selected) => selected == genre,
        }
    }
}

impl fmt::Display for GenreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenreFilter::All => f.write_str("all"),
            GenreFilter::Only(genre) => f.write_str(genre.label()),
        }
    }
}

impl FromStr for GenreFilter {
    type Err = QuizConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "all" {
            return Ok(GenreFilter::All);
        }

        value
            .parse::<Genre>()
            .map(GenreFilter::Only)
            .map_err(|UnknownGenre(name)| QuizConfigError::UnknownGenre(name))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizConfigError {
    #[error("unknown quiz mode: {0}")]
    UnknownMode(String),
    #[error("difficulty must be 1, 2 or 3 but got {0}")]
    UnknownDifficulty(u8),
    #[error("unknown genre filter: {0}")]
    UnknownGenre(String),
}

/// Player-selected settings for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuizConfig {
    pub mode: QuizMode,
    pub difficulty: Difficulty,
    pub genre_filter: GenreFilter,
}

impl QuizConfig {
    pub fn new(mode: QuizMode, difficulty: Difficulty, genre_filter: GenreFilter) -> Self {
        Self {
            mode,
            difficulty,
            genre_filter,
        }
    }

    pub fn choice_count(&self) -> usize {
        self.difficulty.choice_count()
    }

    /// Key identifying this level for the one-time clear bonus, e.g. `all_title_1`.
    pub fn level_key(&self) -> String {
        format!("{}_{}_{}", self.genre_filter, self.mode, self.difficulty)
    }
}

/// Correct answer plus the shuffled options presented for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    pub correct: String,
    /// Shuffled options; contains `correct` exactly once.
    pub choices: Vec<String>,
}

/// A single generated quiz question.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Question {
    pub painting: Painting,
    pub mode: QuizMode,
    pub correct: String,
    /// Answer options. Length is always the `choice_count` passed to the generator.
    pub choices: Vec<String>,
}

impl Question {
    pub fn correct_index(&self) -> Option<usize> {
        self.choices.iter().position(|choice| *choice == self.correct)
    }

    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.correct
    }
}

struct DistractorPicker<'a> {
    correct: &'a str,
    needed: usize,
    picked: Vec<String>,
}

impl<'a> DistractorPicker<'a> {
    fn new(correct: &'a str, needed: usize) -> Self {
        Self {
            correct,
            needed,
            picked: Vec::with_capacity(needed),
        }
    }

    fn is_full(&self) -> bool {
        self.picked.len() >= self.needed
    }

    /// Shuffles one tier of candidates and takes from it until full.
    fn drain_tier<R: Rng + ?Sized>(&mut self, rng: &mut R, mut candidates: Vec<String>) {
        if self.is_full() {
            return;
        }

        candidates.shuffle(rng);

        for candidate in candidates {
            if self.is_full() {
                break;
            }
            if candidate.is_empty() || candidate == self.correct || self.picked.contains(&candidate)
            {
                continue;
            }
            self.picked.push(candidate);
        }
    }

    fn finish(self) -> Vec<String> {
        self.picked
    }
}

fn distinct<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

fn title_distractors<R: Rng + ?Sized>(
    rng: &mut R,
    target: &Painting,
    pool: &[Painting],
    corpus: &[Painting],
    correct: &str,
    needed: usize,
) -> Vec<String> {
    let others = move || pool.iter().filter(move |other| other.id != target.id);
    let mut picker = DistractorPicker::new(correct, needed);

    picker.drain_tier(
        rng,
        others()
            .filter(|other| other.artist_ja == target.artist_ja)
            .map(|other| other.title_ja.clone())
            .collect(),
    );
    picker.drain_tier(
        rng,
        others()
            .filter(|other| other.artist_ja != target.artist_ja && other.genre == target.genre)
            .map(|other| other.title_ja.clone())
            .collect(),
    );
    picker.drain_tier(
        rng,
        others()
            .filter(|other| other.artist_ja != target.artist_ja && other.genre != target.genre)
            .map(|other| other.title_ja.clone())
            .collect(),
    );
    picker.drain_tier(
        rng,
        corpus
            .iter()
            .filter(|other| other.id != target.id)
            .map(|other| other.title_ja.clone())
            .collect(),
    );

    picker.finish()
}

fn artist_distractors<R: Rng + ?Sized>(
    rng: &mut R,
    target: &Painting,
    pool: &[Painting],
    corpus: &[Painting],
    correct: &str,
    needed: usize,
) -> Vec<String> {
    let other_artists = move || {
        pool.iter()
            .filter(move |other| other.id != target.id && other.artist_ja != target.artist_ja)
    };
    let mut picker = DistractorPicker::new(correct, needed);

    picker.drain_tier(
        rng,
        distinct(
            other_artists()
                .filter(|other| other.genre == target.genre)
                .map(|other| other.artist_ja.clone()),
        ),
    );
    picker.drain_tier(
        rng,
        distinct(
            other_artists()
                .filter(|other| other.genre != target.genre)
                .map(|other| other.artist_ja.clone()),
        ),
    );
    picker.drain_tier(
        rng,
        distinct(
            corpus
                .iter()
                .filter(|other| other.artist_ja != target.artist_ja)
                .map(|other| other.artist_ja.clone()),
        ),
    );

    picker.finish()
}

fn genre_distractors<R: Rng + ?Sized>(rng: &mut R, correct: Genre, needed: usize) -> Vec<String> {
    let mut available: Vec<String> = ALL_GENRES
        .iter()
        .filter(|genre| **genre != correct)
        .map(|genre| genre.label().to_string())
        .collect();

    available.shuffle(rng);
    available.truncate(needed);
    available
}

fn placeholder(attempt: usize) -> String {
    if attempt == 0 {
        UNKNOWN_ANSWER.to_string()
    } else {
        format!("{} ({})", UNKNOWN_ANSWER, attempt + 1)
    }
}

/// Builds the options for one painting in the given mode.
///
/// Wrong answers come from escalating tiers: closely related works in `pool`
/// first, then anything in the full `corpus`. Genre mode draws from the fixed
/// genre list instead. If the tiers run dry the remaining slots are filled
/// with [`UNKNOWN_ANSWER`] placeholders, so this never fails.
///
/// `choice_count` includes the correct answer.
pub fn generate_choices<R: Rng + ?Sized>(
    rng: &mut R,
    target: &Painting,
    pool: &[Painting],
    corpus: &[Painting],
    mode: QuizMode,
    choice_count: usize,
) -> ChoiceSet {
    let needed = choice_count.saturating_sub(1);
    let correct = mode.answer_for(target);

    let mut wrong = match mode {
        QuizMode::Title => title_distractors(rng, target, pool, corpus, &correct, needed),
        QuizMode::Artist => artist_distractors(rng, target, pool, corpus, &correct, needed),
        QuizMode::Genre => genre_distractors(rng, target.genre, needed),
    };

    wrong.retain(|answer| !answer.is_empty() && *answer != correct);
    wrong.truncate(needed);

    let mut attempt = 0;
    while wrong.len() < needed {
        let filler = placeholder(attempt);
        attempt += 1;
        if filler != correct && !wrong.contains(&filler) {
            wrong.push(filler);
        }
    }

    let mut choices = Vec::with_capacity(needed + 1);
    choices.push(correct.clone());
    choices.extend(wrong);
    choices.shuffle(rng);

    ChoiceSet { correct, choices }
}

/// Samples up to `round_size` distinct paintings from `pool` and builds a
/// question for each.
///
/// `rng` picks which paintings make the round and then orders each
/// question's options, so a seeded generator replays the same round.
pub fn generate_questions<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[Painting],
    corpus: &[Painting],
    mode: QuizMode,
    choice_count: usize,
    round_size: usize,
) -> Vec<Question> {
    let mut selected: Vec<usize> = (0..pool.len()).collect();
    selected.shuffle(rng);
    selected.truncate(round_size.min(pool.len()));

    selected
        .into_iter()
        .map(|idx| {
            let painting = &pool[idx];
            let ChoiceSet { correct, choices } =
                generate_choices(rng, painting, pool, corpus, mode, choice_count);

            Question {
                painting: painting.clone(),
                mode,
                correct,
                choices,
            }
        })
        .collect()
}
