//! Keyword momentum
//!
//! Classifies each series of a dataset as rising, stable or falling from the
//! least-squares slope of its most recent points. The slope is normalized by
//! the series mean so keywords of different popularity are comparable.

use serde::{Deserialize, Serialize};

use crate::models::TrendDataset;

/// Points considered when no window is given
pub const DEFAULT_WINDOW: usize = 7;

/// Trend direction indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Strongly increasing
    Rising,

    /// Slightly increasing
    SlightlyRising,

    /// Stable, no significant change
    Stable,

    /// Slightly decreasing
    SlightlyFalling,

    /// Strongly decreasing
    Falling,
}

impl TrendDirection {
    /// Determine trend direction from velocity
    ///
    /// # Classification
    /// - `velocity > 0.3`: Rising
    /// - `0.1 < velocity <= 0.3`: SlightlyRising
    /// - `-0.1 <= velocity <= 0.1`: Stable
    /// - `-0.3 <= velocity < -0.1`: SlightlyFalling
    /// - `velocity < -0.3`: Falling
    #[must_use]
    pub fn from_velocity(velocity: f64) -> Self {
        if velocity > 0.3 {
            Self::Rising
        } else if velocity > 0.1 {
            Self::SlightlyRising
        } else if velocity >= -0.1 {
            Self::Stable
        } else if velocity >= -0.3 {
            Self::SlightlyFalling
        } else {
            Self::Falling
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::SlightlyRising => "slightly rising",
            Self::Stable => "stable",
            Self::SlightlyFalling => "slightly falling",
            Self::Falling => "falling",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Momentum of one keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMomentum {
    pub keyword: String,
    pub direction: TrendDirection,

    /// Slope over mean, clamped to `[-1.0, 1.0]`
    pub velocity: f64,

    /// Change from the first to the last point of the window, in percent
    pub change_percent: Option<f64>,
}

/// Momentum of every series in `dataset`, in series order
///
/// `window` limits the computation to the most recent points
/// (default [`DEFAULT_WINDOW`]). Series with fewer than two points are
/// reported as stable.
pub fn momentum(dataset: &TrendDataset, window: Option<usize>) -> Vec<KeywordMomentum> {
    let window = window.unwrap_or(DEFAULT_WINDOW).max(2);

    dataset
        .series
        .iter()
        .map(|series| {
            let start = series.values.len().saturating_sub(window);
            let recent = &series.values[start..];
            let velocity = velocity(recent).unwrap_or(0.0);

            KeywordMomentum {
                keyword: series.name.clone(),
                direction: TrendDirection::from_velocity(velocity),
                velocity,
                change_percent: percent_change(recent),
            }
        })
        .collect()
}

/// Normalized least-squares slope; `None` with fewer than two points
pub fn velocity(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_x2) = values.iter().enumerate().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sx2), (i, &y)| {
            let x = i as f64;
            (sx + x, sy + y, sxy + x * y, sx2 + x * x)
        },
    );

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);

    let mean = sum_y / n;
    if mean > 0.0 {
        Some((slope / mean).clamp(-1.0, 1.0))
    } else {
        Some(0.0)
    }
}

fn percent_change(values: &[f64]) -> Option<f64> {
    let (first, last) = (*values.first()?, *values.last()?);
    if values.len() < 2 || first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}
