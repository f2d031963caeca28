use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};

use crate::corpus::Corpus;
use crate::painting::{Painting, PaintingId};
use crate::quiz::{GenreFilter, QuizMode};
use crate::store::{KeyValueStore, NEW_BADGES_KEY, PROGRESS_KEY, RESET_KEYS, StoreError};

/// Which quiz modes a painting has been answered correctly in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModeProgress {
    #[serde(default)]
    pub title: bool,
    #[serde(default)]
    pub artist: bool,
    #[serde(default)]
    pub genre: bool,
}

impl ModeProgress {
    pub fn get(&self, mode: QuizMode) -> bool {
        match mode {
            QuizMode::Title => self.title,
            QuizMode::Artist => self.artist,
            QuizMode::Genre => self.genre,
        }
    }

    pub fn set(&mut self, mode: QuizMode) {
        match mode {
            QuizMode::Title => self.title = true,
            QuizMode::Artist => self.artist = true,
            QuizMode::Genre => self.genre = true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.title && self.artist && self.genre
    }
}

/// How stored progress was obtained when the tracker was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressLoad {
    /// Nothing was stored yet.
    Fresh,
    Restored,
    /// Stored progress existed but could not be read and was dropped.
    Discarded { reason: String },
}

/// Result of recording a correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    pub collected: bool,
    /// True only on the answer that completed the painting.
    pub newly_collected: bool,
}

/// Display card for one painting in the collection view.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CollectionEntry<'a> {
    pub painting: &'a Painting,
    pub progress: ModeProgress,
    pub collected: bool,
    pub is_new: bool,
}

/// Tracks per-painting quiz progress and the unacknowledged "new" badges.
///
/// In-memory state is authoritative: when the store fails, the failure is
/// logged and play continues with whatever was last recorded here.
#[derive(Debug)]
pub struct CollectionTracker<S> {
    store: S,
    progress: BTreeMap<PaintingId, ModeProgress>,
    new_badges: BTreeSet<PaintingId>,
    load: ProgressLoad,
}

fn read_json<S, T>(store: &S, key: &str) -> Result<Option<T>, String>
where
    S: KeyValueStore,
    T: serde::de::DeserializeOwned,
{
    match store.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|error| format!("{key} is corrupt: {error}")),
        Ok(None) => Ok(None),
        Err(error) => Err(error.to_string()),
    }
}

impl<S: KeyValueStore> CollectionTracker<S> {
    /// Opens the tracker, restoring whatever progress the store holds.
    pub fn open(store: S) -> Self {
        let mut load = ProgressLoad::Fresh;
        let mut discard = |reason: String| {
            warn!("collection progress discarded: {reason}");
            load = ProgressLoad::Discarded { reason };
        };

        let progress = match read_json::<_, BTreeMap<PaintingId, ModeProgress>>(&store, PROGRESS_KEY)
        {
            Ok(Some(progress)) => Some(progress),
            Ok(None) => None,
            Err(reason) => {
                discard(reason);
                None
            }
        };
        let new_badges = match read_json::<_, BTreeSet<PaintingId>>(&store, NEW_BADGES_KEY) {
            Ok(badges) => badges,
            Err(reason) => {
                discard(reason);
                None
            }
        };

        if load == ProgressLoad::Fresh && (progress.is_some() || new_badges.is_some()) {
            load = ProgressLoad::Restored;
        }

        let tracker = Self {
            store,
            progress: progress.unwrap_or_default(),
            new_badges: new_badges.unwrap_or_default(),
            load,
        };
        info!(
            "collection opened: {} paintings tracked, {} new",
            tracker.progress.len(),
            tracker.new_badges.len()
        );
        tracker
    }

    pub fn load_status(&self) -> &ProgressLoad {
        &self.load
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct access for settings that share the store with progress.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn try_save(&mut self) -> Result<(), StoreError> {
        let progress =
            serde_json::to_string(&self.progress).map_err(|source| StoreError::Encode {
                key: PROGRESS_KEY.to_string(),
                source,
            })?;
        let badges =
            serde_json::to_string(&self.new_badges).map_err(|source| StoreError::Encode {
                key: NEW_BADGES_KEY.to_string(),
                source,
            })?;

        self.store.set(PROGRESS_KEY, &progress)?;
        self.store.set(NEW_BADGES_KEY, &badges)
    }

    fn save(&mut self) {
        if let Err(error) = self.try_save() {
            warn!("collection progress not saved: {error}");
        }
    }

    /// Records a correct answer in `mode`. Idempotent apart from the write.
    pub fn mark_correct(&mut self, id: &PaintingId, mode: QuizMode) -> MarkOutcome {
        let entry = self.progress.entry(id.clone()).or_default();
        let was_collected = entry.is_complete();
        entry.set(mode);
        let collected = entry.is_complete();

        let newly_collected = !was_collected && collected;
        if newly_collected {
            self.new_badges.insert(id.clone());
            info!("painting {id} collected");
        }

        self.save();
        MarkOutcome {
            collected,
            newly_collected,
        }
    }

    pub fn is_collected(&self, id: &PaintingId) -> bool {
        self.progress
            .get(id)
            .is_some_and(|progress| progress.is_complete())
    }

    pub fn progress_for(&self, id: &PaintingId) -> ModeProgress {
        self.progress.get(id).copied().unwrap_or_default()
    }

    pub fn is_new(&self, id: &PaintingId) -> bool {
        self.new_badges.contains(id)
    }

    pub fn new_badges(&self) -> impl Iterator<Item = &PaintingId> {
        self.new_badges.iter()
    }

    /// Clears the "new" badge after the player has viewed the painting.
    pub fn acknowledge(&mut self, id: &PaintingId) {
        if self.new_badges.remove(id) {
            self.save();
        }
    }

    pub fn collected_paintings<'a>(&self, corpus: &'a Corpus) -> Vec<&'a Painting> {
        corpus
            .paintings()
            .iter()
            .filter(|painting| self.is_collected(&painting.id))
            .collect()
    }

    pub fn collected_count(&self, corpus: &Corpus) -> usize {
        self.collected_paintings(corpus).len()
    }

    /// Cards for the collection screen, in corpus order.
    pub fn entries<'a>(&self, corpus: &'a Corpus, filter: GenreFilter) -> Vec<CollectionEntry<'a>> {
        corpus
            .paintings()
            .iter()
            .filter(|painting| filter.admits(painting.genre))
            .map(|painting| CollectionEntry {
                painting,
                progress: self.progress_for(&painting.id),
                collected: self.is_collected(&painting.id),
                is_new: self.is_new(&painting.id),
            })
            .collect()
    }

    /// Irreversibly wipes all progress. Callers must confirm with the player first.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.progress.clear();
        self.new_badges.clear();
        self.load = ProgressLoad::Fresh;

        for key in RESET_KEYS {
            self.store.remove(key)?;
        }
        info!("collection progress reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_paintings;
    use crate::painting::Genre;
    use crate::store::{LEGACY_PROGRESS_KEY, MemoryStore};

    fn id(value: &str) -> PaintingId {
        PaintingId::new(value)
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable {
                reason: "quota exceeded".to_string(),
            })
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn collected_only_after_all_three_modes() {
        let mut tracker = CollectionTracker::open(MemoryStore::new());
        let mona_lisa = id("1");

        let title = tracker.mark_correct(&mona_lisa, QuizMode::Title);
        assert!(!title.collected);
        assert!(!tracker.is_collected(&mona_lisa));

        tracker.mark_correct(&mona_lisa, QuizMode::Artist);
        assert!(!tracker.is_collected(&mona_lisa));
        assert!(!tracker.is_new(&mona_lisa));

        let genre = tracker.mark_correct(&mona_lisa, QuizMode::Genre);
        assert!(genre.collected);
        assert!(genre.newly_collected);
        assert!(tracker.is_collected(&mona_lisa));
        assert!(tracker.is_new(&mona_lisa));

        tracker.acknowledge(&mona_lisa);
        assert!(!tracker.is_new(&mona_lisa));
        assert!(tracker.is_collected(&mona_lisa));
    }

    #[test]
    fn marking_again_does_not_re_badge() {
        let mut tracker = CollectionTracker::open(MemoryStore::new());
        let wave = id("5");
        for mode in QuizMode::ALL {
            tracker.mark_correct(&wave, mode);
        }
        tracker.acknowledge(&wave);

        let again = tracker.mark_correct(&wave, QuizMode::Title);

        assert!(again.collected);
        assert!(!again.newly_collected);
        assert!(!tracker.is_new(&wave));
    }

    #[test]
    fn unknown_ids_are_not_collected() {
        let tracker = CollectionTracker::open(MemoryStore::new());
        assert!(!tracker.is_collected(&id("404")));
        assert_eq!(tracker.progress_for(&id("404")), ModeProgress::default());
    }

    #[test]
    fn progress_survives_reopening_the_store() {
        let mut tracker = CollectionTracker::open(MemoryStore::new());
        for mode in QuizMode::ALL {
            tracker.mark_correct(&id("2"), mode);
        }
        tracker.mark_correct(&id("3"), QuizMode::Artist);

        let reopened = CollectionTracker::open(tracker.store().clone());

        assert_eq!(reopened.load_status(), &ProgressLoad::Restored);
        assert!(reopened.is_collected(&id("2")));
        assert!(reopened.is_new(&id("2")));
        assert!(reopened.progress_for(&id("3")).artist);
    }

    #[test]
    fn reads_progress_written_with_partial_flags() {
        let mut store = MemoryStore::new();
        store
            .set(PROGRESS_KEY, r#"{"4": {"title": true, "genre": true}}"#)
            .expect("set succeeds");

        let tracker = CollectionTracker::open(store);
        let progress = tracker.progress_for(&id("4"));

        assert!(progress.title && progress.genre && !progress.artist);
    }

    #[test]
    fn corrupt_progress_is_reported_as_discarded() {
        let mut store = MemoryStore::new();
        store.set(PROGRESS_KEY, "{ broken").expect("set succeeds");

        let tracker = CollectionTracker::open(store);

        assert!(matches!(
            tracker.load_status(),
            ProgressLoad::Discarded { reason } if reason.contains(PROGRESS_KEY)
        ));
        assert!(!tracker.is_collected(&id("1")));
    }

    #[test]
    fn failed_saves_keep_in_memory_progress() {
        let mut tracker = CollectionTracker::open(BrokenStore);
        for mode in QuizMode::ALL {
            tracker.mark_correct(&id("1"), mode);
        }

        assert!(tracker.is_collected(&id("1")));
    }

    #[test]
    fn reset_clears_memory_and_store() {
        let mut store = MemoryStore::new();
        store.set(LEGACY_PROGRESS_KEY, "{}").expect("set succeeds");
        let mut tracker = CollectionTracker::open(store);
        for mode in QuizMode::ALL {
            tracker.mark_correct(&id("1"), mode);
        }

        tracker.reset().expect("reset succeeds");

        assert!(!tracker.is_collected(&id("1")));
        assert_eq!(tracker.new_badges().count(), 0);
        for key in RESET_KEYS {
            assert_eq!(tracker.store().get(key), Ok(None));
        }
    }

    #[test]
    fn entries_reflect_progress_and_filter() {
        let corpus = Corpus::new(fallback_paintings()).expect("fallback corpus is valid");
        let mut tracker = CollectionTracker::open(MemoryStore::new());
        for mode in QuizMode::ALL {
            tracker.mark_correct(&id("4"), mode);
        }
        tracker.mark_correct(&id("1"), QuizMode::Title);

        let portraits = tracker.entries(&corpus, GenreFilter::Only(Genre::Portrait));

        assert_eq!(portraits.len(), 2);
        let pearl = portraits
            .iter()
            .find(|entry| entry.painting.id == id("4"))
            .expect("pearl earring is a portrait");
        assert!(pearl.collected && pearl.is_new);
        let mona_lisa = portraits
            .iter()
            .find(|entry| entry.painting.id == id("1"))
            .expect("mona lisa is a portrait");
        assert!(!mona_lisa.collected && mona_lisa.progress.title);

        assert_eq!(tracker.collected_count(&corpus), 1);
        assert_eq!(tracker.collected_paintings(&corpus)[0].title_ja, "真珠の耳飾りの少女");
    }
}
