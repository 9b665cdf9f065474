//! English definitions from dictionaryapi.dev.

use serde::{Deserialize, Serialize};

const MAX_ENTRIES: usize = 2;
const MAX_DEFINITIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meaning {
    #[serde(default, rename = "partOfSpeech")]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Keep the entries and definitions that get displayed.
pub fn trim(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.truncate(MAX_ENTRIES);
    for meaning in entries.iter_mut().flat_map(|e| e.meanings.iter_mut()) {
        meaning.definitions.truncate(MAX_DEFINITIONS);
    }
    entries
}

pub fn render(entries: &[Entry]) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in entries {
        lines.push(format!("Word: {}", entry.word));
        if let Some(phonetic) = entry.phonetic.as_deref().filter(|p| !p.is_empty()) {
            lines.push(format!("Pronunciation: [{phonetic}]"));
        }
        for meaning in &entry.meanings {
            lines.push(String::new());
            lines.push(format!("Part of speech: {}", meaning.part_of_speech));
            for (i, def) in meaning.definitions.iter().enumerate() {
                lines.push(format!("  {}. {}", i + 1, def.definition));
                if let Some(example) = def.example.as_deref().filter(|e| !e.is_empty()) {
                    lines.push(format!("     Example: {example}"));
                }
            }
        }
    }
    lines
}
