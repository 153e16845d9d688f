//! Color PROM and char/sprite lookup PROM decoding (spec.md §4.C).

use crate::error::EmuError;

/// An sRGB color with full alpha, as produced from a color PROM byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Bit-weighted resistor DAC weights for each channel (spec.md §3).
const RED_WEIGHTS: [u32; 3] = [0x21, 0x47, 0x97];
const GREEN_WEIGHTS: [u32; 3] = [0x21, 0x47, 0x97];
const BLUE_WEIGHTS: [u32; 2] = [0x51, 0xAE];

/// Decode one color PROM byte into an RGB color using bit-weighted
/// additive synthesis: bits 0-2 -> red, bits 3-5 -> green, bits 6-7 -> blue.
pub fn decode_color(byte: u8) -> Color {
    let channel = |bit0: u32, weights: &[u32]| -> u32 {
        let mut v = 0u32;
        for (i, w) in weights.iter().enumerate() {
            if (byte >> (bit0 as usize + i)) & 1 != 0 {
                v += w;
            }
        }
        v.min(255)
    };
    Color::opaque(
        channel(0, &RED_WEIGHTS) as u8,
        channel(3, &GREEN_WEIGHTS) as u8,
        channel(6, &BLUE_WEIGHTS) as u8,
    )
}

/// Build the full color table from a 32-byte color PROM.
pub fn build_colors(color_prom: &[u8; 32]) -> [Color; 32] {
    let mut colors = [Color::default(); 32];
    for (i, &b) in color_prom.iter().enumerate() {
        colors[i] = decode_color(b);
    }
    colors
}

/// One char/sprite palette: an ordered 4-tuple of colors, looked up
/// from 4 consecutive char-lookup PROM bytes.
pub type Palette = [Color; 4];

/// Decode the char/sprite lookup PROM into its palette table. Each
/// palette consumes 4 consecutive PROM bytes, so the table has
/// `lookup_prom.len() / 4` entries.
pub fn build_palettes(lookup_prom: &[u8], colors: &[Color; 32]) -> Result<Vec<Palette>, EmuError> {
    if lookup_prom.len() % 4 != 0 {
        return Err(EmuError::MalformedPalettePRom {
            len: lookup_prom.len(),
        });
    }
    Ok(lookup_prom
        .chunks_exact(4)
        .map(|chunk| {
            [
                colors[chunk[0] as usize & 0x1F],
                colors[chunk[1] as usize & 0x1F],
                colors[chunk[2] as usize & 0x1F],
                colors[chunk[3] as usize & 0x1F],
            ]
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_color_all_bytes_deterministic_and_table_driven() {
        for b in 0u8..=255 {
            let c = decode_color(b);
            let expect_channel = |bit0: usize, weights: [u32; 3]| -> u8 {
                let mut v = 0u32;
                for (i, w) in weights.iter().enumerate() {
                    if (b >> (bit0 + i)) & 1 != 0 {
                        v += w;
                    }
                }
                v.min(255) as u8
            };
            let expect_channel2 = |bit0: usize, weights: [u32; 2]| -> u8 {
                let mut v = 0u32;
                for (i, w) in weights.iter().enumerate() {
                    if (b >> (bit0 + i)) & 1 != 0 {
                        v += w;
                    }
                }
                v.min(255) as u8
            };
            assert_eq!(c.r, expect_channel(0, RED_WEIGHTS));
            assert_eq!(c.g, expect_channel(3, GREEN_WEIGHTS));
            assert_eq!(c.b, expect_channel2(6, BLUE_WEIGHTS));
            assert_eq!(c.a, 255);
        }
    }

    #[test]
    fn decode_color_zero_is_black() {
        assert_eq!(decode_color(0x00), Color::opaque(0, 0, 0));
    }

    #[test]
    fn decode_color_all_bits_set_is_max_each_channel() {
        let c = decode_color(0xFF);
        assert_eq!(c.r, (0x21 + 0x47 + 0x97).min(255));
        assert_eq!(c.g, (0x21 + 0x47 + 0x97).min(255));
        assert_eq!(c.b, (0x51 + 0xAE).min(255));
    }

    #[test]
    fn build_palettes_indexes_colors_by_four_byte_slices() {
        let mut color_prom = [0u8; 32];
        for (i, b) in color_prom.iter_mut().enumerate() {
            *b = i as u8;
        }
        let colors = build_colors(&color_prom);

        let lookup = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let palettes = build_palettes(&lookup, &colors).unwrap();
        assert_eq!(palettes.len(), 2);
        assert_eq!(palettes[0], [colors[1], colors[2], colors[3], colors[4]]);
        assert_eq!(palettes[1], [colors[5], colors[6], colors[7], colors[8]]);
    }

    #[test]
    fn build_palettes_rejects_non_multiple_of_four() {
        let colors = build_colors(&[0u8; 32]);
        let err = build_palettes(&[1, 2, 3], &colors).unwrap_err();
        assert_eq!(err, EmuError::MalformedPalettePRom { len: 3 });
    }

    #[test]
    fn build_palettes_table_has_64_entries_for_256_byte_prom() {
        let colors = build_colors(&[0u8; 32]);
        let lookup = [0u8; 256];
        let palettes = build_palettes(&lookup, &colors).unwrap();
        assert_eq!(palettes.len(), 64);
    }
}
