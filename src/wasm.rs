#![cfg(target_arch = "wasm32")]

use crate::{
    AnswerOutcome, Corpus, CorpusLoadError, Difficulty, Game, GenreFilter, KeyValueStore,
    MemoryStore, PaintingId, QuizMode, Settings, StoreError,
};
use gloo_net::http::Request;
use log::warn;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

const DATA_URL: &str = "data/paintings.json";

/// `window.localStorage`, the store the browser build persists into.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

fn unavailable(error: JsValue) -> StoreError {
    StoreError::Unavailable {
        reason: format!("{error:?}"),
    }
}

impl LocalStorageStore {
    pub fn open() -> Result<Self, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable {
            reason: "no window".to_string(),
        })?;
        let storage = window
            .local_storage()
            .map_err(unavailable)?
            .ok_or_else(|| StoreError::Unavailable {
                reason: "localStorage disabled".to_string(),
            })?;

        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(unavailable)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(unavailable)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(unavailable)
    }
}

async fn fetch_corpus(url: &str) -> Result<Corpus, CorpusLoadError> {
    let read_error = |error: gloo_net::Error| CorpusLoadError::ReadError {
        path: url.to_string(),
        source: std::io::Error::other(error.to_string()),
    };

    let body = Request::get(url)
        .send()
        .await
        .map_err(read_error)?
        .text()
        .await
        .map_err(read_error)?;

    Corpus::from_json_str(url, &body)
}

fn open_store() -> Box<dyn KeyValueStore> {
    match LocalStorageStore::open() {
        Ok(store) => Box::new(store),
        Err(error) => {
            warn!("progress will not persist: {error}");
            Box::new(MemoryStore::new())
        }
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    let json = serde_json::to_string(value)?;
    js_sys::JSON::parse(&json).map_err(|error| JsError::new(&format!("{error:?}")))
}

fn parse_selection(
    mode: &str,
    difficulty: u8,
    genre: &str,
) -> Result<(QuizMode, Difficulty, GenreFilter), JsError> {
    Ok((mode.parse()?, Difficulty::try_from(difficulty)?, genre.parse()?))
}

/// Engine handle exported to the page script.
#[wasm_bindgen]
pub struct PaintQuiz {
    game: Game<Box<dyn KeyValueStore>, StdRng>,
}

#[wasm_bindgen]
impl PaintQuiz {
    /// Fetches the dataset (falling back to the built-in set) and opens
    /// `localStorage`.
    pub async fn load(data_url: Option<String>) -> PaintQuiz {
        let url = data_url.unwrap_or_else(|| DATA_URL.to_string());
        let (corpus, _) = Corpus::recover(fetch_corpus(&url).await);

        PaintQuiz {
            game: Game::new(corpus, open_store(), StdRng::from_entropy()),
        }
    }

    #[wasm_bindgen(js_name = startRound)]
    pub fn start_round(
        &mut self,
        mode: &str,
        difficulty: u8,
        genre: &str,
    ) -> Result<JsValue, JsError> {
        let (mode, difficulty, filter) = parse_selection(mode, difficulty, genre)?;
        let handle = self.game.start_round(mode, difficulty, filter)?;
        to_js(&handle)
    }

    #[wasm_bindgen(js_name = currentQuestion)]
    pub fn current_question(&self) -> Result<JsValue, JsError> {
        to_js(&self.game.current_question())
    }

    #[wasm_bindgen(js_name = submitAnswer)]
    pub fn submit_answer(&mut self, choice: &str) -> Result<JsValue, JsError> {
        let outcome: AnswerOutcome = self.game.submit_answer(choice)?;
        to_js(&outcome)
    }

    pub fn advance(&mut self) -> Result<JsValue, JsError> {
        let next = self.game.advance()?;
        to_js(&next)
    }

    #[wasm_bindgen(js_name = roundSummary)]
    pub fn round_summary(&self) -> Result<JsValue, JsError> {
        to_js(&self.game.round_summary())
    }

    #[wasm_bindgen(js_name = totalAlt)]
    pub fn total_alt(&self) -> f64 {
        self.game.rewards().total() as f64
    }

    pub fn combo(&self) -> u32 {
        self.game.rewards().combo()
    }

    pub fn genres(&self) -> Vec<String> {
        self.game
            .corpus()
            .genres()
            .into_iter()
            .map(|genre| genre.label().to_string())
            .collect()
    }

    /// Collection cards, optionally limited to one genre label.
    pub fn collection(&self, genre: &str) -> Result<JsValue, JsError> {
        let filter: GenreFilter = genre.parse()?;
        let collection = self.game.collection();
        to_js(&collection.entries(self.game.corpus(), filter))
    }

    #[wasm_bindgen(js_name = collectedCount)]
    pub fn collected_count(&self) -> usize {
        self.game.collection().collected_count(self.game.corpus())
    }

    pub fn acknowledge(&mut self, painting_id: &str) {
        self.game
            .collection_mut()
            .acknowledge(&PaintingId::new(painting_id));
    }

    /// Irreversible; the page asks the player to confirm before calling this.
    #[wasm_bindgen(js_name = resetProgress)]
    pub fn reset_progress(&mut self) -> Result<(), JsError> {
        self.game.reset_progress()?;
        Ok(())
    }

    pub fn settings(&self) -> Result<JsValue, JsError> {
        to_js(&self.game.settings())
    }

    #[wasm_bindgen(js_name = saveSettings)]
    pub fn save_settings(
        &mut self,
        sound_enabled: bool,
        animation_enabled: bool,
    ) -> Result<(), JsError> {
        self.game.save_settings(&Settings {
            sound_enabled,
            animation_enabled,
        })?;
        Ok(())
    }

    #[wasm_bindgen(js_name = tutorialPending)]
    pub fn tutorial_pending(&self) -> bool {
        self.game.tutorial_pending()
    }

    #[wasm_bindgen(js_name = completeTutorial)]
    pub fn complete_tutorial(&mut self) -> Result<(), JsError> {
        self.game.complete_tutorial()?;
        Ok(())
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}
