use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;

pub mod roman;

const MAGIC: &[u8; 4] = b"PRLB";
const FORMAT_VERSION: u16 = 1;

// Built-in English -> Pirate table. Entry order is significant: among
// sources with the same word count, the earliest entry wins.
const BUILTIN: &[(&str, &str)] = &[
    ("hello", "ahoy"),
    ("excuse me", "arrr"),
    ("sir", "matey"),
    ("boy", "matey"),
    ("man", "matey"),
    ("madame", "proud beauty"),
    ("officer", "foul blaggart"),
    ("the", "th'"),
    ("my", "me"),
    ("your", "yer"),
    ("is", "be"),
    ("are", "be"),
    ("restroom", "head"),
    ("restaurant", "galley"),
    ("hotel", "fleabag inn"),
    ("coins", "doubloons"),
    ("pirate", "buccaneer"),
    ("friend", "mate"),
    ("you", "ye"),
];

#[derive(Debug, Error)]
pub enum PhrasebookError {
    #[error("failed to read phrasebook: {0}")]
    Io(#[from] io::Error),
    #[error("invalid magic number")]
    BadMagic,
    #[error("unsupported phrasebook version {0}")]
    BadVersion(u16),
    #[error("entry {0} points outside the strings section")]
    CorruptEntry(usize),
    #[error("entry {0} is not valid UTF-8")]
    BadUtf8(usize),
    #[error("entry {0} has an empty source or target")]
    EmptyEntry(usize),
}

#[derive(Debug, Clone)]
pub struct DictEntry {
    pub source: Vec<String>, // canonical lowercase words
    pub target: String,
}

pub struct Dictionary {
    entries: Vec<DictEntry>,
    index: HashMap<String, Vec<usize>>, // first source word -> entry indices, longest phrase first
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub word: String,
    pub punct: String, // trailing punctuation run plus one space
}

impl Dictionary {
    pub fn builtin() -> Self {
        Self::from_pairs(
            BUILTIN
                .iter()
                .map(|&(source, target)| (source.to_string(), target.to_string())),
        )
    }

    /// Builds a dictionary from (source phrase, target phrase) pairs.
    /// Sources are normalized to lowercase whitespace-separated words;
    /// pairs with an empty source or target are dropped.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries: Vec<DictEntry> = pairs
            .into_iter()
            .filter_map(|(source, target)| {
                let words: Vec<String> = source
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect();
                if words.is_empty() || target.is_empty() {
                    return None;
                }
                Some(DictEntry {
                    source: words,
                    target,
                })
            })
            .collect();

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            index.entry(entry.source[0].clone()).or_default().push(i);
        }
        for candidates in index.values_mut() {
            candidates.sort_by_key(|&i| Reverse(entries[i].source.len()));
        }

        Dictionary { entries, index }
    }

    pub fn load(path: &str) -> Result<Self, PhrasebookError> {
        let file = File::open(path)?;
        let mut file = BufReader::new(file);

        // Header (10 bytes)
        let mut header = [0u8; 10];
        file.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(PhrasebookError::BadMagic);
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != FORMAT_VERSION {
            return Err(PhrasebookError::BadVersion(version));
        }
        let num_entries =
            u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;

        // Entry records (12 bytes each)
        let mut records = Vec::with_capacity(num_entries);
        for _ in 0..num_entries {
            let mut record = [0u8; 12];
            file.read_exact(&mut record)?;

            let source_off =
                u32::from_le_bytes([record[0], record[1], record[2], record[3]]) as usize;
            let source_len = u16::from_le_bytes([record[4], record[5]]) as usize;
            let target_off =
                u32::from_le_bytes([record[6], record[7], record[8], record[9]]) as usize;
            let target_len = u16::from_le_bytes([record[10], record[11]]) as usize;

            records.push((source_off, source_len, target_off, target_len));
        }

        // Strings section (rest of the file)
        let mut strings = Vec::new();
        file.read_to_end(&mut strings)?;

        let mut pairs = Vec::with_capacity(num_entries);
        for (i, &(source_off, source_len, target_off, target_len)) in records.iter().enumerate() {
            let source_bytes = strings
                .get(source_off..source_off + source_len)
                .ok_or(PhrasebookError::CorruptEntry(i))?;
            let target_bytes = strings
                .get(target_off..target_off + target_len)
                .ok_or(PhrasebookError::CorruptEntry(i))?;

            let source =
                std::str::from_utf8(source_bytes).map_err(|_| PhrasebookError::BadUtf8(i))?;
            let target =
                std::str::from_utf8(target_bytes).map_err(|_| PhrasebookError::BadUtf8(i))?;

            if source.trim().is_empty() || target.trim().is_empty() {
                return Err(PhrasebookError::EmptyEntry(i));
            }
            pairs.push((source.to_string(), target.to_string()));
        }

        Ok(Self::from_pairs(pairs))
    }

    /// Writes the phrasebook atomically: temp file in the destination
    /// directory, then rename over the target path.
    pub fn save(&self, path: &str) -> io::Result<()> {
        let parent = match Path::new(path).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(&temp);

            let mut strings: Vec<u8> = Vec::new();
            let mut records = Vec::with_capacity(self.entries.len());
            for entry in &self.entries {
                let source = entry.source.join(" ");
                let source_off = strings.len() as u32;
                strings.extend_from_slice(source.as_bytes());
                let target_off = strings.len() as u32;
                strings.extend_from_slice(entry.target.as_bytes());
                records.push((
                    source_off,
                    source.len() as u16,
                    target_off,
                    entry.target.len() as u16,
                ));
            }

            writer.write_all(MAGIC)?;
            writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
            writer.write_all(&(self.entries.len() as u32).to_le_bytes())?;
            for (source_off, source_len, target_off, target_len) in records {
                writer.write_all(&source_off.to_le_bytes())?;
                writer.write_all(&source_len.to_le_bytes())?;
                writer.write_all(&target_off.to_le_bytes())?;
                writer.write_all(&target_len.to_le_bytes())?;
            }
            writer.write_all(&strings)?;
            writer.flush()?;
        }
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Finds the longest phrase starting at tokens[pos], returning the
    // entry index and the number of word tokens consumed. Words after
    // the first are compared against the stored lowercase form only.
    fn lookup(&self, tokens: &[Token], pos: usize) -> Option<(usize, usize)> {
        let word = &tokens[pos].word;
        let capitalized = starts_uppercase(word);
        let key = if capitalized {
            decapitalize(word)
        } else {
            word.clone()
        };
        let candidates = self.index.get(&key)?;

        for &idx in candidates {
            let source = &self.entries[idx].source;
            if pos + source.len() > tokens.len() {
                continue;
            }
            if !first_word_matches(word, &source[0], capitalized) {
                continue;
            }
            let rest_matches = source[1..]
                .iter()
                .zip(&tokens[pos + 1..])
                .all(|(expect, token)| token.word == *expect);
            if rest_matches {
                return Some((idx, source.len()));
            }
        }
        None
    }
}

/// Splits raw input on literal spaces, separating each chunk into its
/// word characters and its punctuation characters. Punctuation found
/// mid-word is pulled to the end of the chunk. The punctuation run
/// carries one trailing space.
pub fn tokenize(text: &str) -> Vec<Token> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(' ')
        .map(|chunk| {
            let mut word = String::new();
            let mut punct = String::new();
            for c in chunk.chars() {
                match c {
                    '.' | ',' | '!' | '?' | ':' | ';' => punct.push(c),
                    _ => word.push(c),
                }
            }
            punct.push(' ');
            Token { word, punct }
        })
        .collect()
}

/// Translates a sentence, substituting dictionary phrases and passing
/// everything else through unchanged. The result may carry a trailing
/// space; it is never trimmed.
pub fn translate(text: &str, dict: &Dictionary) -> String {
    if text.is_empty() {
        return String::new();
    }

    let tokens = tokenize(text);
    let mut fragments = Vec::with_capacity(tokens.len() * 2);

    let mut pos = 0;
    while pos < tokens.len() {
        let token = &tokens[pos];
        if let Some((idx, consumed)) = dict.lookup(&tokens, pos) {
            let target = &dict.entries[idx].target;
            if starts_uppercase(&token.word) {
                fragments.push(capitalize(target));
            } else {
                fragments.push(target.clone());
            }
            // A multi-word match keeps only the last token's punctuation.
            fragments.push(tokens[pos + consumed - 1].punct.clone());
            pos += consumed;
        } else {
            fragments.push(token.word.clone());
            fragments.push(token.punct.clone());
            pos += 1;
        }
    }

    fragments.join("")
}

/// Prompts on stdout, reads one line from stdin, then translates it.
pub fn translate_interactive(dict: &Dictionary) -> io::Result<String> {
    println!("What would you like me to translate?");
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(translate(&line, dict))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_uppercase)
}

fn first_word_matches(token_word: &str, source_word: &str, capitalized: bool) -> bool {
    if capitalized {
        token_word == capitalize(source_word)
    } else {
        token_word == source_word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excuse_me_boy_pirate_hotel() {
        let dict = Dictionary::builtin();
        assert_eq!(
            translate(
                "Excuse me, boy, have you seen my fellow pirate in the hotel?",
                &dict
            ),
            "Arrr, matey, have ye seen me fellow buccaneer in th' fleabag inn? "
        );
    }

    #[test]
    fn hello_madame_officer() {
        let dict = Dictionary::builtin();
        assert_eq!(
            translate(
                "Hello madame, my friend will pay you five coins if you tell us where the officer is!",
                &dict
            ),
            "Ahoy proud beauty, me mate will pay ye five doubloons if ye tell us where th' foul blaggart be! "
        );
    }

    #[test]
    fn where_are_your_coins() {
        let dict = Dictionary::builtin();
        let output = translate("Where are your coins", &dict);
        assert_ne!(output, "Where be your coins?");
        assert_eq!(output, "Where be yer doubloons ");
    }

    #[test]
    fn out_of_dictionary_words_pass_through() {
        let dict = Dictionary::builtin();
        assert_eq!(
            translate("quantum flux capacitor", &dict),
            "quantum flux capacitor "
        );
    }

    #[test]
    fn empty_input() {
        let dict = Dictionary::builtin();
        assert_eq!(translate("", &dict), "");
    }

    #[test]
    fn consecutive_spaces_are_preserved() {
        let dict = Dictionary::builtin();
        assert_eq!(translate("the  hotel", &dict), "th'  fleabag inn ");
    }

    #[test]
    fn many_sources_one_target() {
        let dict = Dictionary::builtin();
        assert_eq!(translate("boy man sir", &dict), "matey matey matey ");
    }

    #[test]
    fn capitalized_match_capitalizes_target() {
        let dict = Dictionary::builtin();
        assert_eq!(translate("The Madame", &dict), "Th' Proud beauty ");
    }

    #[test]
    fn all_caps_does_not_match() {
        let dict = Dictionary::builtin();
        assert_eq!(translate("HELLO", &dict), "HELLO ");
    }

    #[test]
    fn excuse_me_phrase() {
        let dict = Dictionary::builtin();
        assert_eq!(translate("excuse me", &dict), "arrr ");
        assert_eq!(translate("Excuse me", &dict), "Arrr ");
        // The look-ahead compares word tokens only; punctuation between
        // the phrase words is dropped from the output.
        assert_eq!(translate("Excuse, me", &dict), "Arrr ");
    }

    #[test]
    fn excuse_without_me_passes_through() {
        let dict = Dictionary::builtin();
        assert_eq!(translate("Excuse you", &dict), "Excuse ye ");
        assert_eq!(translate("Excuse", &dict), "Excuse ");
    }

    #[test]
    fn tokenize_separates_trailing_punctuation() {
        assert_eq!(
            tokenize("madame!"),
            vec![Token {
                word: "madame".to_string(),
                punct: "! ".to_string(),
            }]
        );
        assert_eq!(
            tokenize("restaurant"),
            vec![Token {
                word: "restaurant".to_string(),
                punct: " ".to_string(),
            }]
        );
    }

    #[test]
    fn tokenize_pulls_mid_word_punctuation_to_the_end() {
        assert_eq!(
            tokenize("ha,ha"),
            vec![Token {
                word: "haha".to_string(),
                punct: ", ".to_string(),
            }]
        );
    }

    #[test]
    fn tokenize_empty_input() {
        assert_eq!(tokenize(""), Vec::new());
    }

    #[test]
    fn capitalize_first_character_only() {
        assert_eq!(capitalize("hello"), "Hello");
        assert_eq!(capitalize("proud beauty"), "Proud beauty");
        assert_ne!(capitalize("pirate"), "PIRATE");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn first_entry_wins_among_duplicates() {
        let dict = Dictionary::from_pairs(vec![
            ("brig".to_string(), "jail".to_string()),
            ("brig".to_string(), "ship".to_string()),
        ]);
        assert_eq!(translate("brig", &dict), "jail ");
    }

    #[test]
    fn longest_phrase_wins() {
        let dict = Dictionary::from_pairs(vec![
            ("jolly".to_string(), "merry".to_string()),
            ("jolly roger".to_string(), "black flag".to_string()),
        ]);
        assert_eq!(translate("jolly roger", &dict), "black flag ");
        assert_eq!(translate("jolly crew", &dict), "merry crew ");
    }

    #[test]
    fn phrasebook_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pirate.prlb");
        let path = path.to_str().unwrap();

        let dict = Dictionary::builtin();
        dict.save(path).unwrap();

        let loaded = Dictionary::load(path).unwrap();
        assert_eq!(loaded.len(), dict.len());
        assert_eq!(
            translate("Excuse me, the officer is my friend!", &loaded),
            translate("Excuse me, the officer is my friend!", &dict)
        );
    }

    #[test]
    fn load_rejects_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.prlb");
        std::fs::write(&path, b"NOPE\x01\x00\x00\x00\x00\x00").unwrap();

        match Dictionary::load(path.to_str().unwrap()) {
            Err(PhrasebookError::BadMagic) => (),
            _ => panic!("expected BadMagic"),
        }
    }

    #[test]
    fn load_rejects_out_of_bounds_record() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"PRLB");
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        // record whose source length runs past the strings section
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&100u16.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(b"hi");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.prlb");
        std::fs::write(&path, &bytes).unwrap();

        match Dictionary::load(path.to_str().unwrap()) {
            Err(PhrasebookError::CorruptEntry(0)) => (),
            _ => panic!("expected CorruptEntry"),
        }
    }
}
