mod gradient;
mod palette;
mod utils;

use smart_leds::RGB8;

pub use gradient::Gradient;
pub use palette::{FALLBACK_COLOR, Palette};
pub use utils::{blend_colors, rgb_from_array, rgb_from_u32, rgb_to_array};

pub type Rgb = RGB8;
