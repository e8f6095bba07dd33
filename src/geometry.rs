/// Physical layout of a strip as seen by effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    /// Number of LEDs on the strip
    pub led_count: usize,
    /// Mirror axis used by mirrored effects, `0..=led_count`
    pub led_mid: usize,
}

impl Geometry {
    /// Create a geometry, clamping `led_mid` into the strip
    pub const fn new(led_count: usize, led_mid: usize) -> Self {
        let led_mid = if led_mid > led_count { led_count } else { led_mid };
        Self { led_count, led_mid }
    }

    /// Geometry with the mirror axis at the center of the strip
    pub const fn centered(led_count: usize) -> Self {
        Self {
            led_count,
            led_mid: center_of(led_count),
        }
    }

    pub const fn is_empty(self) -> bool {
        self.led_count == 0
    }
}

/// Get the center of a strip with `count` LEDs
pub const fn center_of(count: usize) -> usize {
    let mut center_len = count / 2;
    if !count.is_multiple_of(2) {
        center_len += 1;
    }

    if center_len <= count {
        return center_len;
    }
    count
}
