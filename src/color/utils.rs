use crate::{color::Rgb, math8::blend8};

/// Blend two RGB colors
///
/// # Arguments
/// * `a` - First color
/// * `b` - Second color
/// * `amount_of_b` - Blend factor (0 = all a, 255 = all b)
#[inline]
pub fn blend_colors(a: Rgb, b: Rgb, amount_of_b: u8) -> Rgb {
    Rgb {
        r: blend8(a.r, b.r, amount_of_b),
        g: blend8(a.g, b.g, amount_of_b),
        b: blend8(a.b, b.b, amount_of_b),
    }
}

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Create an RGB color from its `[r, g, b]` triple as stored in configuration
pub const fn rgb_from_array(color: [u8; 3]) -> Rgb {
    Rgb {
        r: color[0],
        g: color[1],
        b: color[2],
    }
}

/// Inverse of [`rgb_from_array`]
pub const fn rgb_to_array(color: Rgb) -> [u8; 3] {
    [color.r, color.g, color.b]
}
