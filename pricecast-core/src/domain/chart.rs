//! Renderable line-chart payload: labeled `(x, y)` series.

use serde::{Deserialize, Serialize};

/// One named line on a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl LabeledSeries {
    pub fn new(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

/// Everything a chart surface needs to draw a multi-line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<LabeledSeries>,
}

impl ChartData {
    pub fn series(&self, label: &str) -> Option<&LabeledSeries> {
        self.series.iter().find(|s| s.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// `[min, max]` over all x values, or `None` if there are no points.
    pub fn x_bounds(&self) -> Option<[f64; 2]> {
        bounds(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))
    }

    /// `[min, max]` over all finite y values, or `None` if there are none.
    pub fn y_bounds(&self) -> Option<[f64; 2]> {
        bounds(
            self.series
                .iter()
                .flat_map(|s| s.points.iter().map(|p| p.1))
                .filter(|y| y.is_finite()),
        )
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    values.fold(None, |acc, v| match acc {
        None => Some([v, v]),
        Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
    })
}
