use std::fmt;
use std::str::FromStr;

/// Stable identifier of a painting.
///
/// Data files carry ids either as JSON numbers or strings; both are normalised
/// to their string form so that persisted progress keys line up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct PaintingId(String);

impl PaintingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaintingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaintingId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for PaintingId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for PaintingId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(number) => Self::from(number),
            RawId::Text(text) => Self(text),
        })
    }
}

/// Closed set of genres a painting may belong to.
///
/// The serialized form is the Japanese label used by the data files and by
/// level keys such as `肖像画_title_1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Genre {
    #[serde(rename = "肖像画")]
    Portrait,
    #[serde(rename = "風景画")]
    Landscape,
    #[serde(rename = "宗教画")]
    Religious,
    #[serde(rename = "歴史画")]
    History,
    #[serde(rename = "静物画")]
    StillLife,
    #[serde(rename = "風俗画")]
    GenreScene,
    #[serde(rename = "浮世絵")]
    Ukiyoe,
    #[serde(rename = "抽象画")]
    Abstract,
    #[serde(rename = "神話画")]
    Mythological,
}

/// Every genre, in the order choices are drawn from in genre mode.
pub const ALL_GENRES: [Genre; 9] = [
    Genre::Portrait,
    Genre::Landscape,
    Genre::Religious,
    Genre::History,
    Genre::StillLife,
    Genre::GenreScene,
    Genre::Ukiyoe,
    Genre::Abstract,
    Genre::Mythological,
];

impl Genre {
    pub fn label(self) -> &'static str {
        match self {
            Genre::Portrait => "肖像画",
            Genre::Landscape => "風景画",
            Genre::Religious => "宗教画",
            Genre::History => "歴史画",
            Genre::StillLife => "静物画",
            Genre::GenreScene => "風俗画",
            Genre::Ukiyoe => "浮世絵",
            Genre::Abstract => "抽象画",
            Genre::Mythological => "神話画",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown genre: {0}")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ALL_GENRES
            .iter()
            .copied()
            .find(|genre| genre.label() == value)
            .ok_or_else(|| UnknownGenre(value.to_string()))
    }
}

/// A painting record used for quiz questions.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Painting {
    pub id: PaintingId,
    /// Japanese title; the string quizzed in title mode.
    pub title_ja: String,
    #[serde(default)]
    pub title_en: Option<String>,
    /// Japanese artist name; the string quizzed in artist mode.
    pub artist_ja: String,
    #[serde(default)]
    pub artist_en: Option<String>,
    /// Free-text year such as `1665頃` or `1503-1519`.
    #[serde(default)]
    pub year: Option<String>,
    pub genre: Genre,
    #[serde(default)]
    pub museum: Option<String>,
    /// Full-size image URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_thumb: Option<String>,
    #[serde(default)]
    pub wiki_filename: Option<String>,
    /// Lowest quiz difficulty this painting is offered at. Missing (or zero)
    /// means it is offered at every difficulty.
    #[serde(default)]
    pub difficulty: Option<u8>,
    #[serde(default)]
    pub trivia: Option<String>,
}

impl Painting {
    pub fn title(&self) -> &str {
        &self.title_ja
    }

    pub fn artist(&self) -> &str {
        &self.artist_ja
    }

    /// Difficulty level, with a zero value folded into "unset".
    pub fn difficulty(&self) -> Option<u8> {
        self.difficulty.filter(|level| *level > 0)
    }

    /// Returns the image URL, preferring the thumbnail when `thumb` is set and
    /// falling back to the full image, then to an empty string.
    pub fn image_url(&self, thumb: bool) -> &str {
        if thumb {
            if let Some(url) = self.image_thumb.as_deref().filter(|url| !url.is_empty()) {
                return url;
            }
        }

        &self.image
    }
}

impl fmt::Display for Painting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "「{}」{} ／ {}", self.title_ja, self.artist_ja, self.genre)?;
        if let Some(year) = &self.year {
            write!(f, " ({})", year)?;
        }
        Ok(())
    }
}
