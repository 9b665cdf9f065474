//! Currency conversion through USD cross rates.

use crate::error::{self, InputError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SUPPORTED: [&str; 5] = ["RUB", "USD", "EUR", "CNY", "KRW"];

const FALLBACK: [(&str, f64); 5] = [
    ("USD", 1.0),
    ("EUR", 0.92),
    ("RUB", 90.0),
    ("CNY", 7.2),
    ("KRW", 1300.0),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RateSource {
    Live { date: String },
    Fallback { reason: String },
}

/// Units of each currency per 1 USD.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pub source: RateSource,
    pub rates: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    date: String,
    rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            source: RateSource::Fallback {
                reason: reason.into(),
            },
            rates: FALLBACK
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        }
    }

    pub fn rate(&self, code: &str) -> Result<f64, InputError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| InputError::Unknown {
                kind: "currency",
                value: code.to_string(),
            })
    }

    /// `(code, rate)` for every supported currency except USD, in display order.
    pub fn listing(&self) -> Vec<(&'static str, f64)> {
        SUPPORTED
            .iter()
            .filter(|c| **c != "USD")
            .filter_map(|c| self.rates.get(*c).map(|r| (*c, *r)))
            .collect()
    }
}

pub struct RatesClient {
    http: reqwest::Client,
    base_url: String,
}

impl RatesClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn fetch_live(&self) -> Result<RateTable> {
        let url = format!("{}/latest/USD", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("rates API returned {status}");
        }
        let body: LatestResponse = resp.json().await.context("decode rates response")?;

        let mut rates = BTreeMap::new();
        for code in SUPPORTED {
            match body.rates.get(code) {
                Some(r) => {
                    rates.insert(code.to_string(), *r);
                }
                None if code == "USD" => {
                    rates.insert(code.to_string(), 1.0);
                }
                None => tracing::warn!(code, "rate missing from response"),
            }
        }
        Ok(RateTable {
            source: RateSource::Live { date: body.date },
            rates,
        })
    }

    /// Fetch live rates, degrading to the built-in table on any failure.
    pub async fn load(&self) -> RateTable {
        match self.fetch_live().await {
            Ok(table) => {
                tracing::debug!(?table.source, "exchange rates loaded");
                table
            }
            Err(e) => {
                tracing::warn!("using fallback exchange rates: {e:#}");
                RateTable::fallback(format!("{e:#}"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub result: f64,
    /// Units of `to` per unit of `from`.
    pub effective_rate: f64,
}

pub fn normalize_code(code: &str) -> Result<String, InputError> {
    let code = code.trim().to_ascii_uppercase();
    if SUPPORTED.contains(&code.as_str()) {
        Ok(code)
    } else {
        Err(InputError::Unknown {
            kind: "currency",
            value: code,
        })
    }
}

pub fn convert(
    table: &RateTable,
    from: &str,
    to: &str,
    amount: f64,
) -> Result<Conversion, InputError> {
    let amount = error::positive("amount", amount)?;
    let from = normalize_code(from)?;
    let to = normalize_code(to)?;

    let in_usd = if from == "USD" {
        amount
    } else {
        amount / table.rate(&from)?
    };
    let result = if to == "USD" {
        in_usd
    } else {
        in_usd * table.rate(&to)?
    };

    Ok(Conversion {
        effective_rate: result / amount,
        from,
        to,
        amount,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn converts_through_usd() {
        let table = RateTable::fallback("test");
        let c = convert(&table, "usd", "RUB", 10.0).unwrap();
        assert_eq!(c.from, "USD");
        assert!(close(c.result, 900.0));
        assert!(close(c.effective_rate, 90.0));

        let c = convert(&table, "EUR", "CNY", 92.0).unwrap();
        assert!(close(c.result, 720.0));
    }

    #[test]
    fn same_currency_is_identity() {
        let table = RateTable::fallback("test");
        let c = convert(&table, "KRW", "KRW", 1234.0).unwrap();
        assert!(close(c.result, 1234.0));
    }

    #[test]
    fn rejects_bad_amount_and_code() {
        let table = RateTable::fallback("test");
        assert!(matches!(
            convert(&table, "USD", "RUB", 0.0),
            Err(InputError::NotPositive { .. })
        ));
        assert!(matches!(
            convert(&table, "USD", "GBP", 1.0),
            Err(InputError::Unknown { kind: "currency", .. })
        ));
    }

    #[test]
    fn listing_skips_usd() {
        let codes: Vec<_> = RateTable::fallback("x")
            .listing()
            .into_iter()
            .map(|(c, _)| c)
            .collect();
        assert_eq!(codes, ["RUB", "EUR", "CNY", "KRW"]);
    }

    #[tokio::test]
    async fn loads_live_rates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "base": "USD",
                "date": "2026-10-16",
                "rates": {"USD": 1, "EUR": 0.9, "RUB": 95.5, "CNY": 7.1, "KRW": 1350, "GBP": 0.8}
            })))
            .mount(&server)
            .await;

        let client = RatesClient::new(reqwest::Client::new(), server.uri());
        let table = client.load().await;
        assert_eq!(
            table.source,
            RateSource::Live {
                date: "2026-10-16".into()
            }
        );
        assert_eq!(table.rates.len(), 5);
        assert!(close(table.rate("RUB").unwrap(), 95.5));
    }

    #[tokio::test]
    async fn usd_defaults_to_one_when_omitted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "date": "2026-10-16",
                "rates": {"EUR": 0.9, "RUB": 95.5, "CNY": 7.1, "KRW": 1350}
            })))
            .mount(&server)
            .await;

        let table = RatesClient::new(reqwest::Client::new(), server.uri()).load().await;
        assert!(matches!(table.source, RateSource::Live { .. }));
        assert_eq!(table.rate("USD").unwrap(), 1.0);
        let c = convert(&table, "USD", "RUB", 2.0).unwrap();
        assert!(close(c.result, 191.0));
    }

    #[tokio::test]
    async fn falls_back_when_unreachable() {
        // Nothing listens on port 1.
        let client = RatesClient::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let table = client.load().await;
        assert!(matches!(table.source, RateSource::Fallback { .. }));
        assert_eq!(table.rates, RateTable::fallback("offline").rates);
    }

    #[tokio::test]
    async fn falls_back_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = RatesClient::new(reqwest::Client::new(), server.uri());
        let table = client.load().await;
        assert!(matches!(table.source, RateSource::Fallback { .. }));
        assert!(close(table.rate("EUR").unwrap(), 0.92));
    }
}
