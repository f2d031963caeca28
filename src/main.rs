//! Terminal front end: plays rounds against a data file and keeps progress in
//! a local directory.

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::error::Error;
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use paintquiz::{
        Corpus, Difficulty, EngineConfig, FileStore, Game, GenreFilter, QuizMode, RoundAdvance,
        RoundSummary,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DEFAULT_DATA_FILE: &str = "data/paintings.json";
    const DEFAULT_SAVE_DIR: &str = "paintquiz-data";
    const SAVE_DIR_ENV_VAR: &str = "PAINTQUIZ_DATA_DIR";

    type TerminalGame = Game<FileStore, StdRng>;

    enum Command {
        Play(QuizMode, Difficulty, GenreFilter),
        Collection(GenreFilter),
        Reset,
    }

    struct Options {
        data_file: PathBuf,
        command: Command,
    }

    fn usage() -> String {
        "usage: paintquiz [DATA_FILE] [--mode title|artist|genre] [--difficulty 1|2|3] \
         [--genre all|GENRE] [--collection] [--reset]"
            .to_string()
    }

    fn parse_options(args: impl IntoIterator<Item = String>) -> Result<Options, Box<dyn Error>> {
        let mut data_file = PathBuf::from(DEFAULT_DATA_FILE);
        let mut mode = QuizMode::Title;
        let mut difficulty = Difficulty::Easy;
        let mut filter = GenreFilter::All;
        let mut show_collection = false;
        let mut reset = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = || args.next().ok_or_else(usage);
            match arg.as_str() {
                "--mode" => mode = value()?.parse()?,
                "--difficulty" => difficulty = Difficulty::try_from(value()?.parse::<u8>()?)?,
                "--genre" => filter = value()?.parse()?,
                "--collection" => show_collection = true,
                "--reset" => reset = true,
                "-h" | "--help" => return Err(usage().into()),
                flag if flag.starts_with('-') => return Err(usage().into()),
                path => data_file = PathBuf::from(path),
            }
        }

        let command = if reset {
            Command::Reset
        } else if show_collection {
            Command::Collection(filter)
        } else {
            Command::Play(mode, difficulty, filter)
        };
        Ok(Options { data_file, command })
    }

    fn prompt(input: &mut impl BufRead, message: &str) -> io::Result<Option<String>> {
        print!("{message}");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_summary(summary: &RoundSummary, total_alt: u64) {
        println!();
        println!("{} {}", summary.medal.emoji(), summary.medal.title());
        println!("{}", summary.medal.message());
        println!(
            "{}/{} correct ({}%)",
            summary.correct_count, summary.total, summary.percentage
        );
        if let Some(reward) = &summary.reward {
            println!(
                "{} stars, +{} ALT this round (max combo {})",
                "★".repeat(reward.stars.into()),
                reward.round_total,
                reward.max_combo
            );
            if reward.first_clear {
                println!("first clear bonus!");
            }
        }
        println!("total ALT: {total_alt}");
    }

    fn play(
        game: &mut TerminalGame,
        mode: QuizMode,
        difficulty: Difficulty,
        filter: GenreFilter,
    ) -> Result<(), Box<dyn Error>> {
        let handle = game.start_round(mode, difficulty, filter)?;
        println!("{} questions ({})", handle.question_count, handle.level_key);

        let stdin = io::stdin();
        let mut input = stdin.lock();

        loop {
            let Some(question) = game.current_question().cloned() else {
                return Ok(());
            };

            println!();
            println!("{}", question.painting.image_url(false));
            for (index, choice) in question.choices.iter().enumerate() {
                println!("  {}. {choice}", index + 1);
            }

            let choice = loop {
                let Some(line) = prompt(&mut input, "> ")? else {
                    return Ok(());
                };
                match line.parse::<usize>() {
                    Ok(number) if (1..=question.choices.len()).contains(&number) => {
                        break question.choices[number - 1].clone();
                    }
                    _ => println!("enter 1-{}", question.choices.len()),
                }
            };

            let outcome = game.submit_answer(&choice)?;
            if outcome.correct {
                println!("○ correct! +{} ALT", outcome.alt_gained);
            } else {
                println!("× the answer was {}", outcome.correct_answer);
            }
            if let Some(tier) = outcome.streak_tier {
                println!("{} {}", tier.flames(), tier.message());
            }
            if outcome.newly_collected {
                println!("added to your collection: {}", question.painting.title());
            }
            if let Some(trivia) = &question.painting.trivia {
                println!("{trivia}");
            }

            match game.advance()? {
                RoundAdvance::Question(_) => {}
                RoundAdvance::RoundComplete(summary) => {
                    print_summary(&summary, game.rewards().total());
                    return Ok(());
                }
            }
        }
    }

    fn show_collection(game: &mut TerminalGame, filter: GenreFilter) {
        let corpus = game.corpus().clone();
        let entries = game.collection().entries(&corpus, filter);
        let new_ids: Vec<_> = entries
            .iter()
            .filter(|entry| entry.is_new)
            .map(|entry| entry.painting.id.clone())
            .collect();

        for entry in &entries {
            let mark = if entry.collected { "★" } else { "・" };
            let badge = if entry.is_new { " NEW" } else { "" };
            println!("{mark} {}{badge}", entry.painting);
        }
        println!(
            "{}/{} collected",
            game.collection().collected_count(&corpus),
            corpus.len()
        );

        for id in &new_ids {
            game.collection_mut().acknowledge(id);
        }
    }

    fn reset(game: &mut TerminalGame) -> Result<(), Box<dyn Error>> {
        let stdin = io::stdin();
        let answer = prompt(&mut stdin.lock(), "erase all collection progress? [y/N] ")?;
        if answer.as_deref() == Some("y") {
            game.reset_progress()?;
            println!("progress erased");
        }
        Ok(())
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

        let options = parse_options(std::env::args().skip(1))?;
        let save_dir = std::env::var(SAVE_DIR_ENV_VAR).unwrap_or_else(|_| DEFAULT_SAVE_DIR.into());

        let (corpus, _) = Corpus::load_or_fallback(&options.data_file);
        let mut game = Game::new(corpus, FileStore::new(save_dir), StdRng::from_entropy())
            .with_config(EngineConfig::from_env());

        if game.tutorial_pending() {
            println!("絵画を見て、作品名・作者・ジャンルを当てよう！");
            println!("3つのモード全てで正解すると、その作品がコレクションに加わります。");
            game.complete_tutorial()?;
        }

        match options.command {
            Command::Play(mode, difficulty, filter) => play(&mut game, mode, difficulty, filter),
            Command::Collection(filter) => {
                show_collection(&mut game, filter);
                Ok(())
            }
            Command::Reset => reset(&mut game),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(error) = terminal::run() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
