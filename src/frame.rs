//! Pixel buffers exchanged between effects, the render loop and outputs.

use core::ops::Range;

use crate::color::Rgb;
use crate::math8::scale8;

/// A (3 × N) frame of 8-bit RGB pixels
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    /// All-black buffer of `len` pixels
    pub fn zeroed(len: usize) -> Self {
        Self {
            pixels: vec![Rgb::default(); len],
        }
    }

    pub fn from_pixels(pixels: Vec<Rgb>) -> Self {
        Self { pixels }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Rgb> {
        self.pixels
    }

    /// Split into per-channel rows `[red, green, blue]`
    pub fn channels(&self) -> [Vec<u8>; 3] {
        [
            self.pixels.iter().map(|p| p.r).collect(),
            self.pixels.iter().map(|p| p.g).collect(),
            self.pixels.iter().map(|p| p.b).collect(),
        ]
    }

    /// Rotate the pixels by `steps` positions
    ///
    /// Forward moves pixel `i` to `i + steps`, reversed to `i - steps`.
    pub fn roll(&mut self, steps: usize, reverse: bool) {
        if self.pixels.is_empty() {
            return;
        }
        let steps = steps % self.pixels.len();
        if reverse {
            self.pixels.rotate_left(steps);
        } else {
            self.pixels.rotate_right(steps);
        }
    }

    /// The `steps`-wide window a roll of `steps` leaves behind
    pub fn vacated(&self, steps: usize, reverse: bool) -> Range<usize> {
        let len = self.pixels.len();
        let steps = steps.min(len);
        if reverse { len - steps..len } else { 0..steps }
    }

    /// Set every pixel in `range` to `color`
    pub fn fill_range(&mut self, range: Range<usize>, color: Rgb) {
        self.pixels[range].fill(color);
    }

    pub fn clear_range(&mut self, range: Range<usize>) {
        self.fill_range(range, Rgb::default());
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Centered `len`-wide window of `reversed ++ forward`
    ///
    /// The window starts at `len - led_mid`, so pixel 0 of the buffer lands
    /// on index `led_mid` of the result and the reversed copy fills the
    /// positions before it.
    pub fn mirror_window(&self, led_mid: usize) -> Self {
        let len = self.pixels.len();
        let led_mid = led_mid.min(len);
        let doubled: Vec<Rgb> = self
            .pixels
            .iter()
            .rev()
            .chain(self.pixels.iter())
            .copied()
            .collect();
        let start = len - led_mid;
        Self {
            pixels: doubled[start..start + len].to_vec(),
        }
    }

    /// Scale all channels by `brightness` (0-255)
    pub fn scale(&mut self, brightness: u8) {
        if brightness == u8::MAX {
            return;
        }
        for pixel in &mut self.pixels {
            pixel.r = scale8(pixel.r, brightness);
            pixel.g = scale8(pixel.g, brightness);
            pixel.b = scale8(pixel.b, brightness);
        }
    }
}
