//! Current weather for a handful of cities, interpreted through the rule table.

pub mod rules;

use crate::error::InputError;
use anyhow::{Context, Result};
use rules::{PrecipitationBand, TemperatureBand, Tone, WindBand};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    /// Local spelling, accepted on the command line as well.
    pub local_name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

pub const CITIES: [City; 5] = [
    City {
        name: "Makiivka",
        local_name: "Макеевка",
        lat: 48.0478,
        lon: 37.9722,
    },
    City {
        name: "Donetsk",
        local_name: "Донецк",
        lat: 48.0159,
        lon: 37.8028,
    },
    City {
        name: "Rostov",
        local_name: "Ростов",
        lat: 47.2313,
        lon: 39.7233,
    },
    City {
        name: "Moscow",
        local_name: "Москва",
        lat: 55.7558,
        lon: 37.6173,
    },
    City {
        name: "Saint Petersburg",
        local_name: "Санкт-Петербург",
        lat: 59.9343,
        lon: 30.3351,
    },
];

pub fn find_city(name: &str) -> Result<City, InputError> {
    let wanted = name.trim().to_lowercase();
    CITIES
        .iter()
        .find(|c| c.name.to_lowercase() == wanted || c.local_name.to_lowercase() == wanted)
        .copied()
        .ok_or_else(|| InputError::Unknown {
            kind: "city",
            value: name.trim().to_string(),
        })
}

/// The `current_weather` block of an Open-Meteo forecast.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub windspeed: f64,
    #[serde(default)]
    pub winddirection: f64,
    #[serde(default)]
    pub weathercode: u32,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current_weather: Option<serde_json::Value>,
}

pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentWeather> {
        let url = format!("{}/v1/forecast", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current_weather", "true".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("API error: {}", status.as_u16());
        }

        let body: ForecastResponse = resp.json().await.context("decode forecast response")?;
        let current = match body.current_weather {
            Some(v) if v.as_object().is_some_and(|m| !m.is_empty()) => v,
            _ => anyhow::bail!("no weather data"),
        };
        serde_json::from_value(current).context("decode current_weather")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub place: String,
    pub observed_at: String,
    pub temperature: f64,
    pub temperature_band: TemperatureBand,
    pub condition: &'static str,
    pub weather_code: u32,
    pub wind_kmh: f64,
    pub wind_direction: f64,
    pub wind_band: WindBand,
    pub humidity: i32,
    pub humidity_high: bool,
    pub pressure_hpa: i32,
    pub precipitation_mm: f64,
    pub precipitation_band: PrecipitationBand,
    pub feels_like: f64,
    pub feels_like_band: TemperatureBand,
    pub tone: Tone,
}

/// Apply the rule table to a raw reading.
pub fn interpret(place: &str, w: &CurrentWeather) -> WeatherReport {
    let precipitation_mm = rules::estimate_precipitation(w.weathercode);
    let humidity = rules::estimate_humidity(w.temperature);
    let feels_like = rules::feels_like(w.temperature, w.windspeed);

    WeatherReport {
        place: place.to_string(),
        observed_at: w.time.clone(),
        temperature: w.temperature,
        temperature_band: rules::evaluate_temperature(w.temperature),
        condition: rules::describe_code(w.weathercode),
        weather_code: w.weathercode,
        wind_kmh: w.windspeed,
        wind_direction: w.winddirection,
        wind_band: rules::evaluate_wind(w.windspeed),
        humidity,
        humidity_high: rules::humidity_is_high(humidity),
        pressure_hpa: rules::estimate_pressure(w.temperature),
        precipitation_mm,
        precipitation_band: rules::evaluate_precipitation(precipitation_mm),
        feels_like,
        feels_like_band: rules::evaluate_temperature(feels_like),
        tone: rules::tone(w.temperature),
    }
}
