use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::fallback::fallback_paintings;
use crate::painting::{Genre, Painting, PaintingId};
use crate::quiz::{Difficulty, GenreFilter};

/// The full set of paintings the quiz draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    paintings: Vec<Painting>,
}

#[derive(Debug, thiserror::Error)]
pub enum CorpusLoadError {
    #[error("dataset contains no paintings")]
    Empty,
    #[error("painting id {id} appears more than once")]
    DuplicateId { id: PaintingId },
    #[error("failed to read dataset file at {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse dataset file at {path}: {source}")]
    ParseError {
        path: String,
        source: serde_json::Error,
    },
}

impl PartialEq for CorpusLoadError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::DuplicateId { id: left }, Self::DuplicateId { id: right }) => left == right,
            (Self::ReadError { path: left, .. }, Self::ReadError { path: right, .. }) => {
                left == right
            }
            (Self::ParseError { path: left, .. }, Self::ParseError { path: right, .. }) => {
                left == right
            }
            _ => false,
        }
    }
}

impl Eq for CorpusLoadError {}

/// Data files hold either a bare array or an object wrapping `paintings`.
///
/// Records are kept as raw JSON so one bad entry does not sink the file.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum PaintingFile {
    List(Vec<serde_json::Value>),
    Wrapped {
        #[serde(default)]
        paintings: Vec<serde_json::Value>,
    },
}

impl PaintingFile {
    /// Decodes each record, logging and skipping those that do not parse.
    fn into_paintings(self, origin: &str) -> Vec<Painting> {
        let records = match self {
            PaintingFile::List(records) => records,
            PaintingFile::Wrapped { paintings } => paintings,
        };

        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let id = record.get("id").map(ToString::to_string);
                match serde_json::from_value::<Painting>(record) {
                    Ok(painting) => Some(painting),
                    Err(error) => {
                        warn!(
                            "{origin}: skipping record {index} (id {}): {error}",
                            id.as_deref().unwrap_or("missing")
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

/// Where the paintings of a loaded corpus came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusSource {
    DataFile,
    Fallback,
}

impl Corpus {
    /// Builds a corpus, rejecting empty lists and duplicate ids.
    pub fn new(paintings: Vec<Painting>) -> Result<Self, CorpusLoadError> {
        if paintings.is_empty() {
            return Err(CorpusLoadError::Empty);
        }

        let mut seen = HashSet::new();
        for painting in &paintings {
            if !seen.insert(&painting.id) {
                return Err(CorpusLoadError::DuplicateId {
                    id: painting.id.clone(),
                });
            }
        }

        Ok(Self { paintings })
    }

    pub fn fallback() -> Self {
        Self {
            paintings: fallback_paintings(),
        }
    }

    pub fn from_json_str(origin: &str, json: &str) -> Result<Self, CorpusLoadError> {
        let parsed: PaintingFile =
            serde_json::from_str(json).map_err(|source| CorpusLoadError::ParseError {
                path: origin.to_string(),
                source,
            })?;

        Self::new(parsed.into_paintings(origin))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CorpusLoadError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| CorpusLoadError::ReadError {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json_str(&path.display().to_string(), &data)
    }

    /// Loads the data file, substituting the fallback dataset on any failure.
    pub fn load_or_fallback(path: impl AsRef<Path>) -> (Self, CorpusSource) {
        Self::recover(Self::from_path(path))
    }

    /// Turns a load attempt into a usable corpus, logging and falling back on error.
    pub fn recover(result: Result<Self, CorpusLoadError>) -> (Self, CorpusSource) {
        match result {
            Ok(corpus) => {
                info!("paintings loaded: {} paintings", corpus.len());
                (corpus, CorpusSource::DataFile)
            }
            Err(error) => {
                warn!("painting data unavailable ({error}); using fallback dataset");
                let corpus = Self::fallback();
                info!("fallback dataset in use: {} paintings", corpus.len());
                (corpus, CorpusSource::Fallback)
            }
        }
    }

    pub fn paintings(&self) -> &[Painting] {
        &self.paintings
    }

    pub fn len(&self) -> usize {
        self.paintings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paintings.is_empty()
    }

    pub fn find(&self, id: &PaintingId) -> Option<&Painting> {
        self.paintings.iter().find(|painting| &painting.id == id)
    }

    /// Distinct genres in corpus order.
    pub fn genres(&self) -> Vec<Genre> {
        let mut seen = HashSet::new();
        self.paintings
            .iter()
            .map(|painting| painting.genre)
            .filter(|genre| seen.insert(*genre))
            .collect()
    }

    /// Candidate pool for a round.
    ///
    /// Paintings without a difficulty are admitted at every level, which makes
    /// low-difficulty pools larger than their tagged contents suggest.
    pub fn pool(&self, filter: GenreFilter, max_difficulty: Difficulty) -> Vec<Painting> {
        self.paintings
            .iter()
            .filter(|painting| filter.admits(painting.genre))
            .filter(|painting| match painting.difficulty() {
                None => true,
                Some(level) => level <= max_difficulty.level(),
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn painting(id: &str, genre: Genre, difficulty: Option<u8>) -> Painting {
        Painting {
            id: PaintingId::new(id),
            title_ja: format!("作品{id}"),
            title_en: None,
            artist_ja: format!("画家{id}"),
            artist_en: None,
            year: None,
            genre,
            museum: None,
            image: String::new(),
            image_thumb: None,
            wiki_filename: None,
            difficulty,
            trivia: None,
        }
    }

    fn sample_corpus() -> Corpus {
        Corpus::new(vec![
            painting("1", Genre::Portrait, Some(1)),
            painting("2", Genre::Portrait, Some(2)),
            painting("3", Genre::Landscape, Some(3)),
            painting("4", Genre::Landscape, None),
            painting("5", Genre::Ukiyoe, Some(0)),
        ])
        .expect("sample corpus is valid")
    }

    #[test]
    fn filters_by_genre() {
        let corpus = sample_corpus();
        let pool = corpus.pool(GenreFilter::Only(Genre::Portrait), Difficulty::Hard);

        assert_eq!(pool.len(), 2);
        assert!(pool.iter().all(|p| p.genre == Genre::Portrait));
    }

    #[test]
    fn filters_by_max_difficulty() {
        let corpus = sample_corpus();
        let ids = |difficulty| -> Vec<String> {
            corpus
                .pool(GenreFilter::All, difficulty)
                .into_iter()
                .map(|p| p.id.to_string())
                .collect()
        };

        assert_eq!(ids(Difficulty::Easy), vec!["1", "4", "5"]);
        assert_eq!(ids(Difficulty::Normal), vec!["1", "2", "4", "5"]);
        assert_eq!(ids(Difficulty::Hard), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn untagged_paintings_are_admitted_at_every_level() {
        let corpus = sample_corpus();
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let pool = corpus.pool(GenreFilter::Only(Genre::Landscape), difficulty);
            assert!(pool.iter().any(|p| p.id.as_str() == "4"));
        }
    }

    #[test]
    fn empty_pool_is_not_an_error() {
        let corpus = sample_corpus();
        assert!(
            corpus
                .pool(GenreFilter::Only(Genre::Abstract), Difficulty::Hard)
                .is_empty()
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let error = Corpus::new(vec![
            painting("1", Genre::Portrait, None),
            painting("1", Genre::Landscape, None),
        ])
        .expect_err("duplicate ids should be rejected");

        assert_eq!(
            error,
            CorpusLoadError::DuplicateId {
                id: PaintingId::new("1")
            }
        );
    }

    #[test]
    fn lists_genres_in_corpus_order() {
        assert_eq!(
            sample_corpus().genres(),
            vec![Genre::Portrait, Genre::Landscape, Genre::Ukiyoe]
        );
    }

    #[test]
    fn parses_bare_and_wrapped_files() {
        let bare = r#"[{"id": 1, "title_ja": "a", "artist_ja": "x", "genre": "肖像画"}]"#;
        let wrapped =
            r#"{"paintings": [{"id": "1", "title_ja": "a", "artist_ja": "x", "genre": "肖像画"}]}"#;

        let from_bare = Corpus::from_json_str("bare", bare).expect("bare array should parse");
        let from_wrapped =
            Corpus::from_json_str("wrapped", wrapped).expect("wrapped object should parse");

        assert_eq!(from_bare, from_wrapped);
    }

    #[test]
    fn invalid_records_are_skipped() {
        let json = r#"[
            {"id": 1, "title_ja": "a", "artist_ja": "x", "genre": "肖像画"},
            {"id": 2, "title_ja": "b", "artist_ja": "y", "genre": "水彩画"},
            {"id": 3, "artist_ja": "z", "genre": "風景画"}
        ]"#;

        let corpus = Corpus::from_json_str("mixed", json).expect("valid records remain");

        assert_eq!(corpus.len(), 1);
        assert!(corpus.find(&PaintingId::new("1")).is_some());
    }

    #[test]
    fn file_with_only_invalid_records_is_empty() {
        let json = r#"[{"id": 1, "title_ja": "a", "artist_ja": "x", "genre": "水彩画"}]"#;

        assert_eq!(
            Corpus::from_json_str("bad", json),
            Err(CorpusLoadError::Empty)
        );
    }

    #[test]
    fn empty_file_is_rejected() {
        let error = Corpus::from_json_str("empty", r#"{"paintings": []}"#)
            .expect_err("empty list should fail");
        assert_eq!(error, CorpusLoadError::Empty);
    }

    #[test]
    fn loads_from_file_on_disk() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let path = root.path().join("paintings.json");
        let corpus = sample_corpus();
        let serialized =
            serde_json::to_string(corpus.paintings()).expect("paintings should serialize");
        fs::write(&path, serialized).expect("data file should be written");

        let (loaded, source) = Corpus::load_or_fallback(&path);

        assert_eq!(source, CorpusSource::DataFile);
        assert_eq!(loaded, corpus);
    }

    #[test]
    fn missing_file_falls_back_to_builtin_dataset() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let path: PathBuf = root.path().join("missing.json");

        assert!(matches!(
            Corpus::from_path(&path),
            Err(CorpusLoadError::ReadError { .. })
        ));

        let (corpus, source) = Corpus::load_or_fallback(&path);
        assert_eq!(source, CorpusSource::Fallback);
        assert_eq!(corpus.len(), 5);
    }

    #[test]
    fn malformed_file_falls_back_to_builtin_dataset() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let path = root.path().join("paintings.json");
        fs::write(&path, "{ not json").expect("data file should be written");

        assert_eq!(
            Corpus::from_path(&path).expect_err("parse should fail"),
            CorpusLoadError::ParseError {
                path: path.display().to_string(),
                source: serde_json::from_str::<()>("x").expect_err("never valid"),
            }
        );

        let (_, source) = Corpus::load_or_fallback(&path);
        assert_eq!(source, CorpusSource::Fallback);
    }
}
