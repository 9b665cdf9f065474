//! Uniformly accelerated straight-line motion.

use crate::error::{self, InputError};
use serde::Serialize;

/// Number of samples in a plotted trajectory, both ends included.
pub const TRAJECTORY_SAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionInput {
    /// Initial velocity, m/s.
    pub v0: f64,
    /// Acceleration, m/s².
    pub a: f64,
    /// Travel time, s.
    pub t: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionKind {
    Rest,
    Uniform,
    AcceleratedFromRest,
    Accelerated,
    Decelerated,
    StopAndReverse { t_stop: f64 },
}

impl MotionKind {
    pub fn label(&self) -> &'static str {
        match self {
            MotionKind::Rest => "At rest",
            MotionKind::Uniform => "Uniform motion",
            MotionKind::AcceleratedFromRest => "Uniformly accelerated from rest",
            MotionKind::Accelerated => "Uniformly accelerated motion",
            MotionKind::Decelerated => "Uniformly decelerated motion",
            MotionKind::StopAndReverse { .. } => "Motion with stop and reversal",
        }
    }

    pub fn description(&self) -> String {
        match self {
            MotionKind::Rest => "The body is at rest and does not move.".into(),
            MotionKind::Uniform => {
                "The body moves at a constant velocity without acceleration.".into()
            }
            MotionKind::AcceleratedFromRest => {
                "The body starts from rest with a constant positive acceleration.".into()
            }
            MotionKind::Accelerated => {
                "The body moves with a constant positive acceleration; speed increases.".into()
            }
            MotionKind::Decelerated => {
                "The body moves with a constant negative acceleration; speed decreases.".into()
            }
            MotionKind::StopAndReverse { t_stop } => format!(
                "The body stops after {t_stop:.2} s and then moves in the opposite direction."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionAnalysis {
    pub input: MotionInput,
    /// Final velocity, m/s.
    pub v_end: f64,
    /// Distance (signed displacement), m.
    pub distance: f64,
    pub kind: MotionKind,
    pub equation: String,
}

/// Axis bounds for a distance-over-time plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    /// `(t, S(t))` samples.
    pub points: Vec<(f64, f64)>,
    pub end: (f64, f64),
    /// Where the body stops, when that happens inside the time window.
    pub stop: Option<(f64, f64)>,
    pub bounds: PlotBounds,
}

impl MotionInput {
    pub fn new(v0: f64, a: f64, t: f64) -> Result<Self, InputError> {
        Ok(Self {
            v0: error::finite("v0", v0)?,
            a: error::finite("a", a)?,
            t: error::positive("t", t)?,
        })
    }

    pub fn distance_at(&self, t: f64) -> f64 {
        self.v0 * t + self.a * t * t / 2.0
    }

    pub fn velocity_at(&self, t: f64) -> f64 {
        self.v0 + self.a * t
    }

    /// Time at which velocity reaches zero under deceleration.
    fn stop_time(&self) -> Option<f64> {
        (self.a < 0.0).then(|| (self.v0 / self.a).abs())
    }
}

pub fn classify(input: &MotionInput) -> MotionKind {
    let MotionInput { v0, a, t } = *input;
    if a == 0.0 {
        if v0 == 0.0 {
            MotionKind::Rest
        } else {
            MotionKind::Uniform
        }
    } else if a > 0.0 {
        if v0 == 0.0 {
            MotionKind::AcceleratedFromRest
        } else {
            MotionKind::Accelerated
        }
    } else {
        let t_stop = (v0 / a).abs();
        if t <= t_stop {
            MotionKind::Decelerated
        } else {
            MotionKind::StopAndReverse { t_stop }
        }
    }
}

pub fn equation(input: &MotionInput) -> String {
    let sign = if input.a >= 0.0 { '+' } else { '-' };
    format!(
        "S(t) = {:.2}t {} ({:.2}t²)/2",
        input.v0,
        sign,
        input.a.abs()
    )
}

pub fn analyze(input: MotionInput) -> MotionAnalysis {
    MotionAnalysis {
        input,
        v_end: input.velocity_at(input.t),
        distance: input.distance_at(input.t),
        kind: classify(&input),
        equation: equation(&input),
    }
}

/// Evenly spaced samples over `[0, t]` with end, stop point and plot bounds.
pub fn trajectory(input: &MotionInput) -> Trajectory {
    let n = TRAJECTORY_SAMPLES;
    let step = input.t / (n - 1) as f64;
    let points: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            // Pin the last sample so rounding never overshoots t.
            let t = if i == n - 1 { input.t } else { i as f64 * step };
            (t, input.distance_at(t))
        })
        .collect();

    let stop = match input.stop_time() {
        Some(t_stop) if input.v0 > 0.0 && t_stop <= input.t => {
            Some((t_stop, input.distance_at(t_stop)))
        }
        _ => None,
    };

    let (s_min, s_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, s)| {
            (lo.min(s), hi.max(s))
        });
    let margin = if s_max != s_min {
        0.1 * (s_max - s_min)
    } else {
        1.0
    };

    Trajectory {
        end: (input.t, input.distance_at(input.t)),
        stop,
        bounds: PlotBounds {
            x: [-0.1 * input.t, 1.1 * input.t],
            y: [s_min.min(0.0) - margin, s_max + margin],
        },
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(v0: f64, a: f64, t: f64) -> MotionInput {
        MotionInput::new(v0, a, t).unwrap()
    }

    #[test]
    fn computes_distance_and_final_velocity() {
        let r = analyze(input(10.0, 2.0, 5.0));
        assert_eq!(r.v_end, 20.0);
        assert_eq!(r.distance, 75.0);
        assert_eq!(r.kind, MotionKind::Accelerated);
        assert_eq!(r.equation, "S(t) = 10.00t + (2.00t²)/2");
    }

    #[test]
    fn classifies_every_regime() {
        assert_eq!(classify(&input(0.0, 0.0, 1.0)), MotionKind::Rest);
        assert_eq!(classify(&input(3.0, 0.0, 1.0)), MotionKind::Uniform);
        assert_eq!(
            classify(&input(0.0, 1.0, 1.0)),
            MotionKind::AcceleratedFromRest
        );
        assert_eq!(classify(&input(10.0, -2.0, 5.0)), MotionKind::Decelerated);
        assert_eq!(
            classify(&input(10.0, -2.0, 8.0)),
            MotionKind::StopAndReverse { t_stop: 5.0 }
        );
    }

    #[test]
    fn negative_acceleration_from_rest_reverses_immediately() {
        assert_eq!(
            classify(&input(0.0, -1.0, 2.0)),
            MotionKind::StopAndReverse { t_stop: 0.0 }
        );
    }

    #[test]
    fn equation_uses_minus_for_deceleration() {
        assert_eq!(equation(&input(5.0, -1.5, 1.0)), "S(t) = 5.00t - (1.50t²)/2");
    }

    #[test]
    fn rejects_non_positive_time() {
        assert!(matches!(
            MotionInput::new(1.0, 1.0, 0.0),
            Err(InputError::NotPositive { field: "t", .. })
        ));
    }

    #[test]
    fn trajectory_spans_the_window() {
        let tr = trajectory(&input(10.0, -2.0, 8.0));
        assert_eq!(tr.points.len(), TRAJECTORY_SAMPLES);
        assert_eq!(tr.points[0], (0.0, 0.0));
        assert_eq!(tr.points[TRAJECTORY_SAMPLES - 1].0, 8.0);
        assert_eq!(tr.end, (8.0, 16.0));
        assert_eq!(tr.stop, Some((5.0, 25.0)));
        assert_eq!(tr.bounds.x, [-0.8, 8.8]);
    }

    #[test]
    fn flat_trajectory_gets_unit_margin() {
        let tr = trajectory(&input(0.0, 0.0, 2.0));
        assert_eq!(tr.bounds.y, [-1.0, 1.0]);
        assert_eq!(tr.stop, None);
    }
}
