//! Bilingual dictionary lookup.
//!
//! English words go to dictionaryapi.dev for definitions; Russian words go to
//! the Yandex Dictionary for English translations. The language is picked
//! from the script of the input.

pub mod english;
pub mod yandex;

use crate::error;
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
}

/// Any Cyrillic letter makes the word Russian.
pub fn detect_language(word: &str) -> Language {
    let cyrillic = word
        .chars()
        .any(|c| matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё'));
    if cyrillic {
        Language::Ru
    } else {
        Language::En
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Lookup {
    English {
        word: String,
        entries: Vec<english::Entry>,
    },
    Russian {
        word: String,
        articles: Vec<yandex::Article>,
    },
    NotFound {
        word: String,
        language: Language,
    },
}

impl Lookup {
    pub fn render(&self) -> Vec<String> {
        match self {
            Lookup::English { entries, .. } => english::render(entries),
            Lookup::Russian { word, articles } => yandex::render(word, articles),
            Lookup::NotFound { word, .. } => vec![format!("Word '{word}' not found.")],
        }
    }
}

pub struct DictionaryClient {
    http: reqwest::Client,
    english_url: String,
    yandex_url: String,
    yandex_key: Option<String>,
}

impl DictionaryClient {
    pub fn new(
        http: reqwest::Client,
        english_url: impl Into<String>,
        yandex_url: impl Into<String>,
        yandex_key: Option<String>,
    ) -> Self {
        Self {
            http,
            english_url: english_url.into(),
            yandex_url: yandex_url.into(),
            yandex_key,
        }
    }

    pub async fn lookup(&self, word: &str) -> Result<Lookup> {
        let word = error::required("word", word)?;
        match detect_language(&word) {
            Language::En => self.lookup_english(word).await,
            Language::Ru => self.lookup_russian(word).await,
        }
    }

    async fn lookup_english(&self, word: String) -> Result<Lookup> {
        let mut url = reqwest::Url::parse(&self.english_url)
            .with_context(|| format!("invalid dictionary url {}", self.english_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("dictionary url cannot take a path"))?
            .pop_if_empty()
            .push(&word);

        tracing::debug!(%url, "english lookup");
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "english lookup miss");
            return Ok(Lookup::NotFound {
                word,
                language: Language::En,
            });
        }

        let entries: Vec<english::Entry> =
            resp.json().await.context("decode dictionary response")?;
        if entries.is_empty() {
            return Ok(Lookup::NotFound {
                word,
                language: Language::En,
            });
        }
        Ok(Lookup::English {
            word,
            entries: english::trim(entries),
        })
    }

    async fn lookup_russian(&self, word: String) -> Result<Lookup> {
        let key = self.yandex_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Yandex Dictionary key is not configured (set {} or yandex_key in the config file)",
                crate::config::ENV_YANDEX_KEY
            )
        })?;

        tracing::debug!(word = %word, "russian lookup");
        let resp = self
            .http
            .get(&self.yandex_url)
            .query(&[("key", key), ("lang", "ru-en"), ("text", word.as_str()), ("ui", "ru")])
            .send()
            .await
            .with_context(|| format!("GET {}", self.yandex_url))?;

        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "russian lookup miss");
            return Ok(Lookup::NotFound {
                word,
                language: Language::Ru,
            });
        }

        let body: yandex::LookupResponse =
            resp.json().await.context("decode Yandex response")?;
        if body.def.is_empty() {
            return Ok(Lookup::NotFound {
                word,
                language: Language::Ru,
            });
        }
        Ok(Lookup::Russian {
            word,
            articles: yandex::trim(body.def),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: Option<&str>) -> DictionaryClient {
        DictionaryClient::new(
            reqwest::Client::new(),
            format!("{}/api/v2/entries/en", server.uri()),
            format!("{}/dicservice.json/lookup", server.uri()),
            key.map(str::to_string),
        )
    }

    #[test]
    fn detects_script() {
        assert_eq!(detect_language("hello"), Language::En);
        assert_eq!(detect_language("Привет"), Language::Ru);
        assert_eq!(detect_language("ёж"), Language::Ru);
        assert_eq!(detect_language("123"), Language::En);
    }

    #[tokio::test]
    async fn english_hit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/entries/en/cat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "word": "cat",
                    "meanings": [{
                        "partOfSpeech": "noun",
                        "definitions": [{"definition": "A small feline."}]
                    }]
                }
            ])))
            .mount(&server)
            .await;

        let lookup = client(&server, None).lookup("  cat ").await.unwrap();
        let lines = lookup.render();
        assert_eq!(lines[0], "Word: cat");
        assert!(lines.contains(&"  1. A small feline.".to_string()));
    }

    #[tokio::test]
    async fn english_miss_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let lookup = client(&server, None).lookup("qwzx").await.unwrap();
        assert_eq!(
            lookup,
            Lookup::NotFound {
                word: "qwzx".into(),
                language: Language::En
            }
        );
    }

    #[tokio::test]
    async fn russian_hit_sends_key_and_direction() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dicservice.json/lookup"))
            .and(query_param("key", "secret"))
            .and(query_param("lang", "ru-en"))
            .and(query_param("text", "кот"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "def": [{"text": "кот", "pos": "noun", "tr": [{"text": "cat"}]}]
            })))
            .mount(&server)
            .await;

        let lookup = client(&server, Some("secret")).lookup("кот").await.unwrap();
        match lookup {
            Lookup::Russian { articles, .. } => assert_eq!(articles[0].tr[0].text, "cat"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn russian_empty_def_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"def": []})))
            .mount(&server)
            .await;

        let lookup = client(&server, Some("k")).lookup("абвгд").await.unwrap();
        assert_eq!(lookup.render(), vec!["Word 'абвгд' not found.".to_string()]);
    }

    #[tokio::test]
    async fn russian_without_key_fails_fast() {
        let server = MockServer::start().await;
        let err = client(&server, None).lookup("кот").await.unwrap_err();
        assert!(err.to_string().contains("YANDEX_DICT_KEY"));
    }

    #[tokio::test]
    async fn blank_word_is_rejected() {
        let server = MockServer::start().await;
        assert!(client(&server, None).lookup("   ").await.is_err());
    }
}
