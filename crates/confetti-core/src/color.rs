//! RGB colors and the lenient hex parser used for confetti palettes

use serde::{Deserialize, Serialize};

/// 8-bit RGB color, fixed on a particle at spawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized RGBA with the given alpha
    pub fn to_rgba_f32(&self, alpha: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        ]
    }
}

/// Parse a color string such as `#26ccff`, `fff` or `f0`.
///
/// Never fails. Every non-hex character is dropped; one to five remaining
/// digits are widened to six by doubling the first three (clamped to the last
/// digit available); byte pairs that are missing or unparsable become 0.
pub fn hex_to_rgb(input: &str) -> Rgb {
    let digits: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_hexdigit())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let expanded: Vec<char> = if !digits.is_empty() && digits.len() < 6 {
        let last = digits.len() - 1;
        [0, 1, 2]
            .iter()
            .flat_map(|&i| {
                let c = digits[i.min(last)];
                [c, c]
            })
            .collect()
    } else {
        digits
    };

    let channel = |start: usize| -> u8 {
        expanded
            .get(start..start + 2)
            .map(|pair| pair.iter().collect::<String>())
            .and_then(|pair| u8::from_str_radix(&pair, 16).ok())
            .unwrap_or(0)
    };

    Rgb::new(channel(0), channel(2), channel(4))
}

/// Resolve a palette of color strings, preserving order
pub fn colors_to_rgb<S: AsRef<str>>(colors: &[S]) -> Vec<Rgb> {
    colors.iter().map(|c| hex_to_rgb(c.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_hex() {
        assert_eq!(hex_to_rgb("#26ccff"), Rgb::new(0x26, 0xcc, 0xff));
        assert_eq!(hex_to_rgb("#A25AFD"), Rgb::new(0xa2, 0x5a, 0xfd));
    }

    #[test]
    fn expands_shorthand() {
        assert_eq!(hex_to_rgb("#fff"), Rgb::WHITE);
        assert_eq!(hex_to_rgb("#f80"), Rgb::new(0xff, 0x88, 0x00));
    }

    #[test]
    fn expands_two_digits_by_clamping() {
        // "f0" -> "ff" "00" "00"
        assert_eq!(hex_to_rgb("f0"), Rgb::new(0xff, 0x00, 0x00));
        // a single digit fills every channel
        assert_eq!(hex_to_rgb("a"), Rgb::new(0xaa, 0xaa, 0xaa));
    }

    #[test]
    fn four_and_five_digits_use_first_three() {
        assert_eq!(hex_to_rgb("1234"), Rgb::new(0x11, 0x22, 0x33));
        assert_eq!(hex_to_rgb("abcde"), Rgb::new(0xaa, 0xbb, 0xcc));
    }

    #[test]
    fn malformed_input_degrades_to_black() {
        assert_eq!(hex_to_rgb(""), Rgb::BLACK);
        assert_eq!(hex_to_rgb("#zzzz"), Rgb::BLACK);
        // only 'a' and 'c' survive the filter
        assert_eq!(hex_to_rgb("not a color"), Rgb::new(0xaa, 0xcc, 0xcc));
    }

    #[test]
    fn extra_digits_are_ignored() {
        assert_eq!(hex_to_rgb("#11223344"), Rgb::new(0x11, 0x22, 0x33));
    }

    #[test]
    fn palette_preserves_order() {
        let palette = colors_to_rgb(&["#000", "#fff"]);
        assert_eq!(palette, vec![Rgb::BLACK, Rgb::WHITE]);
    }
}
