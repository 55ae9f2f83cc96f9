use std::f64::consts::PI;

/// Radius of the circular progress ring shown while frames load.
pub const RING_RADIUS: f64 = 36.0;

/// Loading overlay state: a percentage drawn as a circular stroke.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadIndicator {
    /// Completion percentage, `0..=100`.
    pub percent: u8,
    /// Whether the overlay is shown (everything before the player runs).
    pub visible: bool,
}

impl LoadIndicator {
    /// Full ring circumference.
    pub fn circumference() -> f64 {
        2.0 * PI * RING_RADIUS
    }

    /// Dash offset for the progress stroke: the unfilled part of the circumference.
    pub fn stroke_offset(self) -> f64 {
        let c = Self::circumference();
        c - f64::from(self.percent.min(100)) / 100.0 * c
    }
}
