//! Labeled horizontal slider widget.
//!
//! Used by the form for the day-count inputs. Values are clamped to
//! `[min, max]` on every change.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use serde::{Deserialize, Serialize};

use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderState {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl SliderState {
    /// `max` below `min` is raised to `min`.
    pub fn new(value: i64, min: i64, max: i64) -> Self {
        let max = max.max(min);
        Self {
            value: value.clamp(min, max),
            min,
            max,
        }
    }

    pub fn step(&mut self, delta: i64) {
        self.value = self.value.saturating_add(delta).clamp(self.min, self.max);
    }

    pub fn set(&mut self, value: i64) {
        self.value = value.clamp(self.min, self.max);
    }

    pub fn to_min(&mut self) {
        self.value = self.min;
    }

    pub fn to_max(&mut self) {
        self.value = self.max;
    }

    /// Position of the value within the range, `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.max == self.min {
            return 1.0;
        }
        (self.value - self.min) as f64 / (self.max - self.min) as f64
    }
}

/// `Label          [=======|--------]  60  (1-365)`
pub fn slider_line(
    label: &str,
    state: &SliderState,
    track_width: usize,
    focused: bool,
) -> Line<'static> {
    let track_width = track_width.max(2);
    let filled =
        ((state.fraction() * (track_width - 1) as f64).round() as usize).min(track_width - 1);
    let track: String = (0..track_width)
        .map(|i| match i.cmp(&filled) {
            std::cmp::Ordering::Less => '=',
            std::cmp::Ordering::Equal => '|',
            std::cmp::Ordering::Greater => '-',
        })
        .collect();

    let (label_style, track_style) = if focused {
        (
            theme::accent().add_modifier(Modifier::REVERSED),
            theme::accent(),
        )
    } else {
        (theme::neutral(), theme::muted())
    };

    Line::from(vec![
        Span::styled(format!("{label:<18}"), label_style),
        Span::raw(" "),
        Span::styled(format!("[{track}]"), track_style),
        Span::styled(format!(" {:>4} ", state.value), theme::accent_bold()),
        Span::styled(format!("({}-{})", state.min, state.max), theme::muted()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_clamps_value() {
        assert_eq!(SliderState::new(500, 1, 365).value, 365);
        assert_eq!(SliderState::new(-4, 1, 30).value, 1);
        assert_eq!(SliderState::new(3, 5, 1), SliderState::new(5, 5, 5));
    }

    #[test]
    fn min_max_jumps() {
        let mut s = SliderState::new(60, 1, 365);
        s.to_max();
        assert_eq!(s.value, 365);
        s.to_min();
        assert_eq!(s.value, 1);
        assert_eq!(s.fraction(), 0.0);
    }

    #[test]
    fn line_shows_value_and_range() {
        let line = slider_line("Actual days", &SliderState::new(60, 1, 365), 10, false);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("  60 "));
        assert!(text.contains("(1-365)"));
        assert_eq!(text.matches('|').count(), 1);
    }

    proptest! {
        #[test]
        fn steps_never_leave_bounds(
            start in -1000i64..1000,
            deltas in prop::collection::vec(-500i64..500, 0..20),
        ) {
            let mut s = SliderState::new(start, 1, 30);
            for d in deltas {
                s.step(d);
                prop_assert!((1..=30).contains(&s.value));
            }
        }
    }
}
