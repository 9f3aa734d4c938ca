pub mod slider;

pub use slider::{slider_line, SliderState};
