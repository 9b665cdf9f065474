//! Word puzzle: rebuild a hidden word from its shuffled letters.

use crate::error::InputError;
use anyhow::Result;
use console::Term;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::io::{BufRead, IsTerminal, Write};

pub const MIN_LETTERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Correct { word: String },
    Incorrect { guess: String, answer: String },
}

#[derive(Debug, Clone)]
pub struct Puzzle {
    answer: String,
    tiles: Vec<char>,
    used: Vec<bool>,
    /// Tile indices in the order they were picked.
    picks: Vec<usize>,
}

impl Puzzle {
    /// Start a round. The word is trimmed and upper-cased before shuffling.
    pub fn new<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Result<Self, InputError> {
        let answer = word.trim().to_uppercase();
        if answer.is_empty() {
            return Err(InputError::Empty { field: "word" });
        }
        let mut tiles: Vec<char> = answer.chars().collect();
        if tiles.len() < MIN_LETTERS {
            return Err(InputError::WordTooShort { min: MIN_LETTERS });
        }
        tiles.shuffle(rng);
        Ok(Self {
            used: vec![false; tiles.len()],
            answer,
            tiles,
            picks: Vec::new(),
        })
    }

    pub fn tiles(&self) -> &[char] {
        &self.tiles
    }

    pub fn is_used(&self, index: usize) -> bool {
        self.used.get(index).copied().unwrap_or(false)
    }

    pub fn letter_count(&self) -> usize {
        self.tiles.len()
    }

    /// Letters picked so far.
    pub fn guess(&self) -> String {
        self.picks.iter().map(|&i| self.tiles[i]).collect()
    }

    pub fn pick(&mut self, index: usize) -> Result<char, InputError> {
        match self.used.get(index).copied() {
            None => Err(InputError::NoSuchTile { index }),
            Some(true) => Err(InputError::TileUsed { index }),
            Some(false) => {
                self.used[index] = true;
                self.picks.push(index);
                Ok(self.tiles[index])
            }
        }
    }

    /// Take back the last pick. Returns the freed letter.
    pub fn undo(&mut self) -> Option<char> {
        let index = self.picks.pop()?;
        self.used[index] = false;
        Some(self.tiles[index])
    }

    pub fn check(&self) -> Verdict {
        let guess = self.guess();
        if guess == self.answer {
            Verdict::Correct { word: guess }
        } else {
            Verdict::Incorrect {
                guess,
                answer: self.answer.clone(),
            }
        }
    }
}

enum Command {
    Pick(usize),
    Undo,
    Check,
    NewGame,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "u" | "undo" => Some(Command::Undo),
        "c" | "check" => Some(Command::Check),
        "n" | "new" => Some(Command::NewGame),
        "q" | "quit" => Some(Command::Quit),
        other => other
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(|n| Command::Pick(n - 1)),
    }
}

fn board(p: &Puzzle) -> Vec<String> {
    let tiles = p
        .tiles()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if p.is_used(i) {
                format!("{}:·", i + 1)
            } else {
                format!("{}:{}", i + 1, c)
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    vec![
        format!("Hidden word: {}", "_".repeat(p.letter_count())),
        format!("Letters:     {tiles}"),
        format!("Your word:   {}", p.guess()),
    ]
}

/// How the word to hide is typed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordEntry {
    /// Read from the game input like any other line.
    Visible,
    /// Read from the terminal without echo.
    Hidden,
}

impl WordEntry {
    /// Hidden when stdin is an interactive terminal.
    pub fn for_stdin() -> Self {
        if std::io::stdin().is_terminal() {
            WordEntry::Hidden
        } else {
            WordEntry::Visible
        }
    }
}

fn read_word<R: BufRead>(input: &mut R, entry: WordEntry) -> Result<Option<String>> {
    match entry {
        WordEntry::Visible => {
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            Ok(Some(line))
        }
        WordEntry::Hidden => Ok(Some(Term::stdout().read_secure_line()?)),
    }
}

/// Ask for the next hidden word. `None` on end of input or `q`.
fn prompt_word<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    entry: WordEntry,
) -> Result<Option<String>> {
    loop {
        write!(out, "Enter a word to hide: ")?;
        out.flush()?;
        let Some(line) = read_word(input, entry)? else {
            return Ok(None);
        };
        let word = line.trim();
        if word.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        if word.is_empty() {
            writeln!(out, "Please enter a word.")?;
            continue;
        }
        return Ok(Some(word.to_string()));
    }
}

/// Line-driven game loop.
///
/// `first_word` skips the initial prompt. Returns the number of solved rounds.
pub fn play<R, W, G>(
    input: &mut R,
    out: &mut W,
    rng: &mut G,
    first_word: Option<String>,
    entry: WordEntry,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let mut solved = 0;
    let mut next_word = first_word;

    'rounds: loop {
        let word = match next_word.take() {
            Some(w) => w,
            None => match prompt_word(input, out, entry)? {
                Some(w) => w,
                None => break,
            },
        };
        let mut puzzle = match Puzzle::new(&word, rng) {
            Ok(p) => p,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        tracing::debug!(letters = puzzle.letter_count(), "puzzle round started");
        writeln!(
            out,
            "Pick letters by number; u = undo, c = check, n = new game, q = quit."
        )?;

        loop {
            for line in board(&puzzle) {
                writeln!(out, "{line}")?;
            }
            write!(out, "> ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break 'rounds;
            }
            match parse_command(&line) {
                Some(Command::Pick(i)) => {
                    if let Err(e) = puzzle.pick(i) {
                        writeln!(out, "{e}")?;
                    }
                }
                Some(Command::Undo) => {
                    if puzzle.undo().is_none() {
                        writeln!(out, "Nothing to undo.")?;
                    }
                }
                Some(Command::Check) => match puzzle.check() {
                    Verdict::Correct { word } => {
                        solved += 1;
                        writeln!(out, "Correct! The word was {word}.")?;
                        continue 'rounds;
                    }
                    Verdict::Incorrect { guess, answer } => {
                        writeln!(out, "Wrong. Your word: {guess}. Answer: {answer}.")?;
                    }
                },
                Some(Command::NewGame) => continue 'rounds,
                Some(Command::Quit) => break 'rounds,
                None => writeln!(out, "Unknown command.")?,
            }
        }
    }
    Ok(solved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Pick tiles so that the answer is spelled out.
    fn solve(p: &mut Puzzle, answer: &str) {
        for c in answer.chars() {
            let i = (0..p.letter_count())
                .find(|&i| !p.is_used(i) && p.tiles()[i] == c)
                .unwrap();
            p.pick(i).unwrap();
        }
    }

    #[test]
    fn new_normalizes_and_keeps_letters() {
        let p = Puzzle::new("  hello ", &mut rng()).unwrap();
        let mut tiles = p.tiles().to_vec();
        tiles.sort_unstable();
        assert_eq!(tiles, vec!['E', 'H', 'L', 'L', 'O']);
        assert_eq!(p.guess(), "");
    }

    #[test]
    fn rejects_short_and_empty_words() {
        assert_eq!(
            Puzzle::new("  ", &mut rng()).unwrap_err(),
            InputError::Empty { field: "word" }
        );
        assert_eq!(
            Puzzle::new("я", &mut rng()).unwrap_err(),
            InputError::WordTooShort { min: 2 }
        );
    }

    #[test]
    fn counts_cyrillic_letters_not_bytes() {
        let p = Puzzle::new("кот", &mut rng()).unwrap();
        assert_eq!(p.letter_count(), 3);
    }

    #[test]
    fn pick_rejects_reuse_and_out_of_range() {
        let mut p = Puzzle::new("ab", &mut rng()).unwrap();
        p.pick(0).unwrap();
        assert_eq!(p.pick(0), Err(InputError::TileUsed { index: 0 }));
        assert_eq!(p.pick(5), Err(InputError::NoSuchTile { index: 5 }));
    }

    #[test]
    fn undo_frees_the_last_tile() {
        let mut p = Puzzle::new("abc", &mut rng()).unwrap();
        let first = p.pick(2).unwrap();
        p.pick(0).unwrap();
        assert_eq!(p.undo(), Some(p.tiles()[0]));
        assert!(!p.is_used(0));
        assert_eq!(p.guess(), first.to_string());
        p.undo();
        assert_eq!(p.undo(), None);
    }

    #[test]
    fn check_reports_both_outcomes() {
        let mut p = Puzzle::new("stop", &mut rng()).unwrap();
        solve(&mut p, "POTS");
        assert_eq!(
            p.check(),
            Verdict::Incorrect {
                guess: "POTS".into(),
                answer: "STOP".into()
            }
        );
        for _ in 0..4 {
            p.undo();
        }
        solve(&mut p, "STOP");
        assert_eq!(
            p.check(),
            Verdict::Correct {
                word: "STOP".into()
            }
        );
    }

    #[test]
    fn interactive_round_can_be_solved() {
        let mut seeded = rng();
        let p = Puzzle::new("AB", &mut seeded).unwrap();
        // Same seed, same shuffle: find the tile order that spells AB.
        let a = p.tiles().iter().position(|c| *c == 'A').unwrap() + 1;
        let b = p.tiles().iter().position(|c| *c == 'B').unwrap() + 1;

        let script = format!("{b}\nc\nu\nu\n{a}\n{b}\nc\nq\n");
        let mut input = Cursor::new(script.into_bytes());
        let mut out = Vec::new();
        let solved = play(
            &mut input,
            &mut out,
            &mut rng(),
            Some("ab".into()),
            WordEntry::Visible,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(solved, 1);
        assert!(text.contains("Wrong. Your word: B. Answer: AB."));
        assert!(text.contains("Correct! The word was AB."));
    }

    #[test]
    fn entered_word_is_never_written_back() {
        let mut input = Cursor::new(b"zebra\nq\n".to_vec());
        let mut out = Vec::new();
        play(&mut input, &mut out, &mut rng(), None, WordEntry::Visible).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Hidden word: _____"));
        assert!(!text.to_uppercase().contains("ZEBRA"));
    }

    #[test]
    fn interactive_prompts_and_handles_eof() {
        let mut input = Cursor::new(b"\nx\nxy\nzz\n".to_vec());
        let mut out = Vec::new();
        let solved = play(&mut input, &mut out, &mut rng(), None, WordEntry::Visible).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(solved, 0);
        assert!(text.contains("Please enter a word."));
        assert!(text.contains("word must contain at least 2 letters"));
        assert!(text.contains("Unknown command."));
    }
}
