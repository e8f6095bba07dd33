use crate::color::{Rgb, blend_colors, rgb_from_array, rgb_to_array};

/// Ordered list of color stops
///
/// Gradients are never empty; cycling through the stops wraps around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gradient {
    stops: Vec<Rgb>,
}

impl Gradient {
    /// Create a gradient from its stops, `None` if `stops` is empty
    pub fn new(stops: Vec<Rgb>) -> Option<Self> {
        if stops.is_empty() {
            return None;
        }
        Some(Self { stops })
    }

    /// Single-stop gradient
    pub fn solid(color: Rgb) -> Self {
        Self { stops: vec![color] }
    }

    /// Build a gradient from configuration triples
    pub fn from_arrays(stops: &[[u8; 3]]) -> Option<Self> {
        Self::new(stops.iter().copied().map(rgb_from_array).collect())
    }

    pub fn to_arrays(&self) -> Vec<[u8; 3]> {
        self.stops.iter().copied().map(rgb_to_array).collect()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Stop at `index`, wrapping past the last stop
    pub fn stop(&self, index: usize) -> Rgb {
        self.stops[index % self.stops.len()]
    }

    /// Index of the stop following `index`, wrapping to 0
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.stops.len()
    }

    /// Stretch the stops evenly across `leds`, blending between neighbours
    #[allow(clippy::cast_possible_truncation)]
    pub fn fill(&self, leds: &mut [Rgb]) {
        if leds.is_empty() {
            return;
        }

        let segments = self.stops.len() - 1;
        if segments == 0 || leds.len() == 1 {
            leds.fill(self.stops[0]);
            return;
        }

        // 8.8 fixed-point position along the stop list
        let last = leds.len() - 1;
        for (i, led) in leds.iter_mut().enumerate() {
            let pos = (i * segments * 256) / last;
            let segment = (pos >> 8).min(segments - 1);
            let local = (pos - segment * 256).min(255) as u8;
            *led = blend_colors(self.stops[segment], self.stops[segment + 1], local);
        }
    }
}
