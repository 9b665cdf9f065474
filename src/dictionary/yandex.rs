//! Russian words through the Yandex Dictionary (ru-en direction).

use serde::{Deserialize, Serialize};

const MAX_DEFINITIONS: usize = 3;
const MAX_TRANSLATIONS: usize = 4;
const MAX_SYNONYMS: usize = 3;
const MAX_RELATED: usize = 3;
const MAX_EXAMPLES: usize = 2;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub def: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pos: String,
    /// Word form hint, e.g. gender or plural form.
    #[serde(default)]
    pub fl: Option<String>,
    #[serde(default)]
    pub tr: Vec<Translation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub syn: Vec<TextItem>,
    #[serde(default)]
    pub mean: Vec<TextItem>,
    #[serde(default)]
    pub ex: Vec<Example>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextItem {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Example {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tr: Vec<TextItem>,
}

/// Russian name of a part of speech; unknown values pass through unchanged.
pub fn localize_part_of_speech(pos: &str) -> String {
    let name = match pos.to_lowercase().as_str() {
        "noun" => "существительное",
        "verb" => "глагол",
        "adjective" => "прилагательное",
        "adverb" => "наречие",
        "pronoun" => "местоимение",
        "preposition" => "предлог",
        "conjunction" => "союз",
        "interjection" => "междометие",
        "numeral" => "числительное",
        "participle" => "причастие",
        "" => "не указано",
        _ => return pos.to_string(),
    };
    name.to_string()
}

/// Keep the articles, translations and samples that get displayed.
pub fn trim(mut articles: Vec<Article>) -> Vec<Article> {
    articles.truncate(MAX_DEFINITIONS);
    for tr in articles.iter_mut().flat_map(|a| a.tr.iter_mut()) {
        tr.syn.truncate(MAX_SYNONYMS);
        tr.mean.truncate(MAX_RELATED);
        tr.ex.truncate(MAX_EXAMPLES);
    }
    for article in articles.iter_mut() {
        article.tr.truncate(MAX_TRANSLATIONS);
    }
    articles
}

fn joined(items: &[TextItem]) -> String {
    items
        .iter()
        .map(|i| i.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render(word: &str, articles: &[Article]) -> Vec<String> {
    let mut lines = vec![
        format!("Russian word: {word}"),
        "English translations:".to_string(),
        String::new(),
    ];

    for article in articles {
        lines.push(format!(
            "Part of speech: {} ({})",
            localize_part_of_speech(&article.pos),
            article.pos
        ));

        for (i, tr) in article.tr.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, tr.text));
            if !tr.syn.is_empty() {
                lines.push(format!("     Synonyms: {}", joined(&tr.syn)));
            }
            if !tr.mean.is_empty() {
                lines.push(format!("     Related: {}", joined(&tr.mean)));
            }
            if !tr.ex.is_empty() {
                lines.push("     Usage:".to_string());
                for ex in &tr.ex {
                    lines.push(format!("       «{}»", ex.text));
                    if let Some(first) = ex.tr.first().filter(|t| !t.text.is_empty()) {
                        lines.push(format!("       → «{}»", first.text));
                    }
                }
            }
            lines.push(String::new());
        }

        if !article.tr.is_empty() {
            lines.push("-".repeat(50));
        }
    }

    if let Some(form) = articles
        .first()
        .and_then(|a| a.fl.as_deref())
        .filter(|f| !f.is_empty())
    {
        lines.push(format!("Word form: {form}"));
    }
    lines
}
