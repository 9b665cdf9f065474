//! The weather rule table.
//!
//! Maps raw readings to labels and derives the readings the forecast
//! endpoint does not return (humidity, pressure, precipitation).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    VeryCold,
    Cold,
    Cool,
    Warm,
}

impl TemperatureBand {
    pub fn label(self) -> &'static str {
        match self {
            TemperatureBand::VeryCold => "Very cold",
            TemperatureBand::Cold => "Cold",
            TemperatureBand::Cool => "Cool",
            TemperatureBand::Warm => "Warm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindBand {
    Light,
    Moderate,
    Strong,
}

impl WindBand {
    pub fn label(self) -> &'static str {
        match self {
            WindBand::Light => "Light",
            WindBand::Moderate => "Moderate",
            WindBand::Strong => "Strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecipitationBand {
    None,
    Moderate,
    Heavy,
}

impl PrecipitationBand {
    pub fn label(self) -> &'static str {
        match self {
            PrecipitationBand::None => "None",
            PrecipitationBand::Moderate => "Moderate",
            PrecipitationBand::Heavy => "Heavy",
        }
    }
}

/// Background tone of the summary card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Frosty,
    Neutral,
    Hot,
}

pub fn evaluate_temperature(celsius: f64) -> TemperatureBand {
    if celsius < -10.0 {
        TemperatureBand::VeryCold
    } else if celsius < 0.0 {
        TemperatureBand::Cold
    } else if celsius < 15.0 {
        TemperatureBand::Cool
    } else {
        TemperatureBand::Warm
    }
}

pub fn evaluate_wind(kmh: f64) -> WindBand {
    if kmh < 5.0 {
        WindBand::Light
    } else if kmh < 15.0 {
        WindBand::Moderate
    } else {
        WindBand::Strong
    }
}

pub fn evaluate_precipitation(mm: f64) -> PrecipitationBand {
    if mm == 0.0 {
        PrecipitationBand::None
    } else if mm <= 5.0 {
        PrecipitationBand::Moderate
    } else {
        PrecipitationBand::Heavy
    }
}

/// WMO weather interpretation code.
pub fn describe_code(code: u32) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Rime fog",
        51 | 53 | 55 => "Drizzle",
        61 | 63 => "Rain",
        65 => "Heavy rain",
        71 | 73 => "Snow",
        75 => "Heavy snow",
        80 | 81 => "Showers",
        82 => "Heavy showers",
        85 => "Snowfall",
        86 => "Heavy snowfall",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Heavy thunderstorm with hail",
        _ => "Unknown",
    }
}

/// Estimated precipitation (mm) implied by a weather code.
pub fn estimate_precipitation(code: u32) -> f64 {
    match code {
        51 | 53 | 55 | 61 | 63 | 65 | 80 | 81 | 82 => 2.5,
        71 | 73 | 75 | 85 | 86 => 1.0,
        _ => 0.0,
    }
}

/// Relative humidity (%) estimated from temperature.
pub fn estimate_humidity(celsius: f64) -> i32 {
    (60 + (celsius * 0.5) as i32).clamp(30, 90)
}

pub fn humidity_is_high(percent: i32) -> bool {
    percent >= 70
}

/// Surface pressure (hPa) estimated from temperature.
pub fn estimate_pressure(celsius: f64) -> i32 {
    1013 - (celsius * 0.3) as i32
}

pub fn feels_like(celsius: f64, wind_kmh: f64) -> f64 {
    celsius - wind_kmh * 0.2
}

pub fn tone(celsius: f64) -> Tone {
    if celsius < 0.0 {
        Tone::Frosty
    } else if celsius > 20.0 {
        Tone::Hot
    } else {
        Tone::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_band_edges() {
        assert_eq!(evaluate_temperature(-10.1), TemperatureBand::VeryCold);
        assert_eq!(evaluate_temperature(-10.0), TemperatureBand::Cold);
        assert_eq!(evaluate_temperature(0.0), TemperatureBand::Cool);
        assert_eq!(evaluate_temperature(14.9), TemperatureBand::Cool);
        assert_eq!(evaluate_temperature(15.0), TemperatureBand::Warm);
    }

    #[test]
    fn wind_and_precipitation_edges() {
        assert_eq!(evaluate_wind(4.9), WindBand::Light);
        assert_eq!(evaluate_wind(5.0), WindBand::Moderate);
        assert_eq!(evaluate_wind(15.0), WindBand::Strong);
        assert_eq!(evaluate_precipitation(0.0), PrecipitationBand::None);
        assert_eq!(evaluate_precipitation(5.0), PrecipitationBand::Moderate);
        assert_eq!(evaluate_precipitation(5.1), PrecipitationBand::Heavy);
    }

    #[test]
    fn derived_readings_truncate_toward_zero() {
        assert_eq!(estimate_humidity(21.0), 70);
        assert_eq!(estimate_humidity(-3.0), 59);
        assert_eq!(estimate_humidity(80.0), 90);
        assert_eq!(estimate_humidity(-80.0), 30);
        assert_eq!(estimate_pressure(10.0), 1010);
        assert_eq!(estimate_pressure(-5.0), 1014);
    }

    #[test]
    fn codes_map_to_precipitation() {
        assert_eq!(estimate_precipitation(63), 2.5);
        assert_eq!(estimate_precipitation(86), 1.0);
        assert_eq!(estimate_precipitation(95), 0.0);
        assert_eq!(describe_code(48), "Rime fog");
        assert_eq!(describe_code(4), "Unknown");
    }

    #[test]
    fn feels_like_and_tone() {
        assert!((feels_like(10.0, 20.0) - 6.0).abs() < 1e-12);
        assert_eq!(tone(-0.5), Tone::Frosty);
        assert_eq!(tone(20.0), Tone::Neutral);
        assert_eq!(tone(20.5), Tone::Hot);
    }
}
