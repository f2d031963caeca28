use crate::painting::{Genre, Painting, PaintingId};

const WIKIMEDIA_THUMB_ROOT: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb";

struct FallbackEntry {
    id: u64,
    title_ja: &'static str,
    title_en: &'static str,
    artist_ja: &'static str,
    artist_en: &'static str,
    year: &'static str,
    genre: Genre,
    museum: &'static str,
    /// Hash directory plus file name under the Wikimedia thumbnail root.
    image_path: &'static str,
    wiki_filename: &'static str,
    trivia: &'static str,
}

const FALLBACK_ENTRIES: [FallbackEntry; 5] = [
    FallbackEntry {
        id: 1,
        title_ja: "モナ・リザ",
        title_en: "Mona Lisa",
        artist_ja: "レオナルド・ダ・ヴィンチ",
        artist_en: "Leonardo da Vinci",
        year: "1503-1519",
        genre: Genre::Portrait,
        museum: "ルーヴル美術館",
        image_path: "6/6a/Mona_Lisa.jpg",
        wiki_filename: "Mona_Lisa.jpg",
        trivia: "実はこの絵、ナポレオンが自分の寝室にかざっていたことがある。描かれた女性が誰なのか、500年たった今でもナゾが残っている。",
    },
    FallbackEntry {
        id: 2,
        title_ja: "星月夜",
        title_en: "The Starry Night",
        artist_ja: "フィンセント・ファン・ゴッホ",
        artist_en: "Vincent van Gogh",
        year: "1889",
        genre: Genre::Landscape,
        museum: "ニューヨーク近代美術館",
        image_path: "e/ea/Van_Gogh_-_Starry_Night_-_Google_Art_Project.jpg",
        wiki_filename: "Van_Gogh_-_Starry_Night_-_Google_Art_Project.jpg",
        trivia: "ゴッホが精神病院に入院していたときに描いた絵。窓から見た夜空に想像を加えて、うずまく星空を表現した。",
    },
    FallbackEntry {
        id: 3,
        title_ja: "最後の晩餐",
        title_en: "The Last Supper",
        artist_ja: "レオナルド・ダ・ヴィンチ",
        artist_en: "Leonardo da Vinci",
        year: "1495-1498",
        genre: Genre::Religious,
        museum: "サンタ・マリア・デッレ・グラツィエ教会",
        image_path: "4/48/The_Last_Supper_-_Leonardo_Da_Vinci_-_High_Resolution_32x16.jpg",
        wiki_filename: "The_Last_Supper_-_Leonardo_Da_Vinci_-_High_Resolution_32x16.jpg",
        trivia: "壁に直接描かれたこの絵は、完成直後から少しずつはがれ始めた。何度も修復されて今の姿になっている。",
    },
    FallbackEntry {
        id: 4,
        title_ja: "真珠の耳飾りの少女",
        title_en: "Girl with a Pearl Earring",
        artist_ja: "ヨハネス・フェルメール",
        artist_en: "Johannes Vermeer",
        year: "1665頃",
        genre: Genre::Portrait,
        museum: "マウリッツハイス美術館",
        image_path: "0/0f/1665_Girl_with_a_Pearl_Earring.jpg",
        wiki_filename: "1665_Girl_with_a_Pearl_Earring.jpg",
        trivia: "「北のモナ・リザ」とも呼ばれるこの絵。描かれた少女が誰なのかは今でもわかっていない。",
    },
    FallbackEntry {
        id: 5,
        title_ja: "神奈川沖浪裏",
        title_en: "The Great Wave off Kanagawa",
        artist_ja: "葛飾北斎",
        artist_en: "Katsushika Hokusai",
        year: "1831頃",
        genre: Genre::Ukiyoe,
        museum: "メトロポリタン美術館",
        image_path: "a/a5/Tsunami_by_hokusai_19th_century.jpg",
        wiki_filename: "Tsunami_by_hokusai_19th_century.jpg",
        trivia: "北斎がこの絵を描いたのは70歳すぎ。世界で最も有名な日本の絵で、ゴッホやドビュッシーにも影響を与えた。",
    },
];

fn thumbnail_url(image_path: &str, width: u32) -> String {
    let file_name = image_path.rsplit('/').next().unwrap_or(image_path);
    format!("{WIKIMEDIA_THUMB_ROOT}/{image_path}/{width}px-{file_name}")
}

impl FallbackEntry {
    fn to_painting(&self) -> Painting {
        Painting {
            id: PaintingId::from(self.id),
            title_ja: self.title_ja.to_string(),
            title_en: Some(self.title_en.to_string()),
            artist_ja: self.artist_ja.to_string(),
            artist_en: Some(self.artist_en.to_string()),
            year: Some(self.year.to_string()),
            genre: self.genre,
            museum: Some(self.museum.to_string()),
            image: thumbnail_url(self.image_path, 600),
            image_thumb: Some(thumbnail_url(self.image_path, 300)),
            wiki_filename: Some(self.wiki_filename.to_string()),
            difficulty: Some(1),
            trivia: Some(self.trivia.to_string()),
        }
    }
}

/// Five well-known paintings used when the data file cannot be loaded.
pub fn fallback_paintings() -> Vec<Painting> {
    FALLBACK_ENTRIES
        .iter()
        .map(FallbackEntry::to_painting)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{QuizMode, generate_questions};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn every_entry_is_fully_populated() {
        for painting in fallback_paintings() {
            assert!(!painting.title_ja.is_empty());
            assert!(painting.title_en.is_some());
            assert!(painting.artist_en.is_some());
            assert!(painting.year.is_some());
            assert!(painting.museum.is_some());
            assert!(painting.trivia.is_some());
            assert_eq!(painting.difficulty, Some(1));
            assert!(painting.image.starts_with(WIKIMEDIA_THUMB_ROOT));
        }
    }

    #[test]
    fn image_urls_follow_wikimedia_thumbnail_layout() {
        let mona_lisa = &fallback_paintings()[0];
        assert_eq!(
            mona_lisa.image,
            "https://upload.wikimedia.org/wikipedia/commons/thumb/6/6a/Mona_Lisa.jpg/600px-Mona_Lisa.jpg"
        );
        assert_eq!(
            mona_lisa.image_url(true),
            "https://upload.wikimedia.org/wikipedia/commons/thumb/6/6a/Mona_Lisa.jpg/300px-Mona_Lisa.jpg"
        );
    }

    #[test]
    fn dataset_supports_a_full_title_round() {
        let paintings = fallback_paintings();
        let mut rng = StdRng::seed_from_u64(10);

        let questions = generate_questions(&mut rng, &paintings, &paintings, QuizMode::Title, 4, 10);

        assert_eq!(questions.len(), 5);
        assert!(questions.iter().all(|q| q.choices.len() == 4));
    }
}
