//! Text summary builders for CLI output.
//!
//! Each builder formats the human-readable lines printed in text mode.

use crate::currency::{Conversion, RateSource, RateTable};
use crate::motion::MotionAnalysis;
use crate::reliability::{DefectFree, Durability};
use crate::weather::WeatherReport;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

pub(crate) fn durability_summary(d: &Durability) -> TextSummary {
    let mttf = match d.mean_time_to_failure {
        Some(h) => format!("{h:.2} h"),
        None => "∞".to_string(),
    };
    TextSummary {
        lines: vec![
            format!("Survival probability P(t) = {:.4}", d.survival),
            format!("Operating time t = {:.2} h", d.hours),
            format!("Failure rate λ = {:.6} 1/h", d.failure_rate),
            format!("Mean time to failure T = {mttf}"),
            format!("Failure density a(t) = {:.6} 1/h", d.failure_density),
        ],
    }
}

pub(crate) fn defect_free_summary(d: &DefectFree) -> TextSummary {
    let mut lines = Vec::new();
    if d.normalized {
        lines.push(format!(
            "Probabilities summed to {:.3}; normalized to 1.",
            d.input_sum
        ));
    }
    lines.push(format!("Defect-free coefficient K = {:.4}", d.coefficient));
    lines.push(format!(
        "P0 + P1 = {:.3} + {:.3} = {:.3}",
        d.no_defect, d.with_defect, d.coefficient
    ));
    lines.push(format!("P2 (failure) = {:.3}", d.failure));
    TextSummary { lines }
}

pub(crate) fn motion_summary(m: &MotionAnalysis) -> TextSummary {
    TextSummary {
        lines: vec![
            format!(
                "v0 = {:.2} m/s, a = {:.2} m/s², t = {:.2} s",
                m.input.v0, m.input.a, m.input.t
            ),
            format!("Final velocity v = {:.2} m/s", m.v_end),
            format!("Distance S = {:.2} m", m.distance),
            format!("Motion: {}", m.kind.label()),
            m.kind.description(),
            m.equation.clone(),
        ],
    }
}

fn source_line(table: &RateTable) -> String {
    match &table.source {
        RateSource::Live { date } => format!("Rates updated: {date}"),
        RateSource::Fallback { .. } => "Rates unavailable; using built-in fallback rates".into(),
    }
}

pub(crate) fn conversion_summary(c: &Conversion, table: &RateTable) -> TextSummary {
    TextSummary {
        lines: vec![
            format!("{:.2} {} = {:.2} {}", c.amount, c.from, c.result, c.to),
            format!("1 {} = {:.4} {}", c.from, c.effective_rate, c.to),
            source_line(table),
        ],
    }
}

pub(crate) fn rates_summary(table: &RateTable) -> TextSummary {
    let mut lines = vec![source_line(table)];
    lines.extend(
        table
            .listing()
            .into_iter()
            .map(|(code, rate)| format!("1 USD = {rate:.4} {code}")),
    );
    TextSummary { lines }
}

pub(crate) fn weather_summary(r: &WeatherReport) -> TextSummary {
    let humidity = if r.humidity_high { "high" } else { "normal" };
    TextSummary {
        lines: vec![
            format!("{} ({})", r.place, r.observed_at),
            format!(
                "Temperature: {:.1}°C ({})",
                r.temperature,
                r.temperature_band.label()
            ),
            format!("Conditions: {} (code {})", r.condition, r.weather_code),
            format!(
                "Wind: {:.1} km/h, {:.0}° ({})",
                r.wind_kmh,
                r.wind_direction,
                r.wind_band.label()
            ),
            format!("Humidity: {}% ({humidity})", r.humidity),
            format!("Pressure: {} hPa", r.pressure_hpa),
            format!(
                "Precipitation: {:.1} mm ({})",
                r.precipitation_mm,
                r.precipitation_band.label()
            ),
            format!(
                "Feels like: {:.1}°C ({})",
                r.feels_like,
                r.feels_like_band.label()
            ),
        ],
    }
}
