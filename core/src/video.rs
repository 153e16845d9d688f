//! Video hardware: walks VRAM's tile-map regions and composes one frame
//! per VBLANK (spec.md §4.E).
//!
//! The tile-map grid is 32 addresses tall: the strip regions each span
//! one full 32-wide address row, and the playfield occupies the
//! remaining 28 grid-columns (0x040..0x3BF), each 32 addresses deep,
//! top-to-bottom contiguous. Composing in this native, pre-rotation
//! orientation (32 tile columns x 36 tile rows = 256x288 pixels) is
//! what keeps the address ranges and starting column/row given in
//! spec.md §4.E internally consistent; a host that wants a particular
//! on-screen rotation applies it at the wire-format encoding step,
//! since §4.E explicitly leaves that choice to the caller.

use crate::bus::{CpuId, MemoryBus};
use crate::palette::Color;
use crate::tile::{TileRenderer, TILE_H, TILE_W};

pub const TILES_W: usize = 32;
pub const TILES_H: usize = 36;
pub const FRAME_WIDTH: usize = TILES_W * TILE_W;
pub const FRAME_HEIGHT: usize = TILES_H * TILE_H;

const VRAM_TILE_CODES_BASE: u16 = 0x8000;
const VRAM_TILE_ATTRS_BASE: u16 = 0x8400;

const PLAYFIELD_FIRST: u16 = 0x040;
const PLAYFIELD_COLS: usize = 28;
const PLAYFIELD_ROWS: usize = 32;
const PLAYFIELD_RIGHTMOST_COL: usize = 29;
const PLAYFIELD_FIRST_ROW: usize = 2;

struct StripRegion {
    /// Address of the leftmost column (col 0) of this strip row.
    base_addr: u16,
    tile_row: usize,
}

const STRIP_REGIONS: [StripRegion; 4] = [
    StripRegion {
        base_addr: 0x3DF,
        tile_row: 0,
    },
    StripRegion {
        base_addr: 0x3FF,
        tile_row: 1,
    },
    StripRegion {
        base_addr: 0x01F,
        tile_row: 34,
    },
    StripRegion {
        base_addr: 0x03F,
        tile_row: 35,
    },
];

/// A composed RGBA frame, row-major, owned by the caller across frames
/// so the composer can reuse it without reallocating.
#[derive(Clone)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            pixels: vec![Color::default(); FRAME_WIDTH * FRAME_HEIGHT],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    fn blit_tile(&mut self, tile: &crate::tile::Tile, tile_col: usize, tile_row: usize) {
        let x0 = tile_col * TILE_W;
        let y0 = tile_row * TILE_H;
        for ty in 0..TILE_H {
            for tx in 0..TILE_W {
                self.pixels[(y0 + ty) * self.width + (x0 + tx)] = tile.pixel(tx, ty);
            }
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the palette/color/tile tables and composes frames from the
/// bus's shared VRAM. Construct-once, read-many (spec.md §4.D/§4.E
/// resource ownership note).
pub struct VideoHardware {
    tiles: TileRenderer,
}

impl VideoHardware {
    pub fn new(tiles: TileRenderer) -> Self {
        Self { tiles }
    }

    /// Reads VRAM through CPU1's bus view (all three CPUs see VRAM
    /// identically in the mapped ranges) and blits every visited tile
    /// into `frame`. No clearing between frames: every pixel in the
    /// five regions is overwritten every call.
    pub fn compose_frame(&self, bus: &mut MemoryBus, frame: &mut Frame) {
        self.compose_playfield(bus, frame);
        for region in &STRIP_REGIONS {
            self.compose_strip(bus, frame, region);
        }
    }

    fn read_tile_attr(&self, bus: &mut MemoryBus, i: u16) -> (u8, u8) {
        let tile = bus.read8(CpuId::Cpu1, VRAM_TILE_CODES_BASE + i).unwrap_or(0) & 0x7F;
        let attr = bus.read8(CpuId::Cpu1, VRAM_TILE_ATTRS_BASE + i).unwrap_or(0) & 0x3F;
        (tile, attr)
    }

    fn compose_playfield(&self, bus: &mut MemoryBus, frame: &mut Frame) {
        // The grid is 32 addresses tall (matching the strip regions'
        // 32-wide rows); top-to-bottom is the contiguous axis and
        // right-to-left the outer one, so column 29 occupies 0x040..0x05F.
        for col_from_right in 0..PLAYFIELD_COLS {
            for row in 0..PLAYFIELD_ROWS {
                let i = PLAYFIELD_FIRST + (col_from_right * PLAYFIELD_ROWS + row) as u16;
                let (tile_code, attr) = self.read_tile_attr(bus, i);
                let tile = self.tiles.render_tile(tile_code, attr);
                let tile_col = PLAYFIELD_RIGHTMOST_COL - col_from_right;
                let tile_row = PLAYFIELD_FIRST_ROW + row;
                frame.blit_tile(tile, tile_col, tile_row);
            }
        }
    }

    fn compose_strip(&self, bus: &mut MemoryBus, frame: &mut Frame, region: &StripRegion) {
        for col in 0..TILES_W {
            let addr = region.base_addr - col as u16;
            let (tile_code, attr) = self.read_tile_attr(bus, addr);
            let tile = self.tiles.render_tile(tile_code, attr);
            frame.blit_tile(tile, col, region.tile_row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{build_colors, build_palettes};

    fn sample_hardware() -> VideoHardware {
        let colors = build_colors(&[0u8; 32]);
        let lookup_prom = vec![0u8; 256];
        let palettes = build_palettes(&lookup_prom, &colors).unwrap();
        let mut tile_rom = vec![0u8; 256 * 16];
        for (i, b) in tile_rom.iter_mut().enumerate() {
            *b = (i * 53 + 7) as u8;
        }
        VideoHardware::new(TileRenderer::new(tile_rom, palettes))
    }

    #[test]
    fn compose_frame_is_reproducible() {
        let hw = sample_hardware();
        let mut bus = MemoryBus::new();
        bus.write8(CpuId::Cpu1, 0x8040, 0x05).unwrap();

        let mut frame_a = Frame::new();
        let mut frame_b = Frame::new();
        hw.compose_frame(&mut bus, &mut frame_a);
        hw.compose_frame(&mut bus, &mut frame_b);
        assert!(frame_a
            .pixels
            .iter()
            .zip(frame_b.pixels.iter())
            .all(|(a, b)| a == b));
    }

    #[test]
    fn playfield_first_four_addresses_land_in_rightmost_column() {
        // S2: addresses 0x40..0x43 hold tile codes 1..4, attribute 0.
        // Top-to-bottom is the contiguous axis, so these four addresses
        // are the top four rows of the rightmost playfield column (29).
        let hw = sample_hardware();
        let mut bus = MemoryBus::new();
        for (n, code) in [1u8, 2, 3, 4].into_iter().enumerate() {
            bus.write8(CpuId::Cpu1, 0x8000 + 0x40 + n as u16, code).unwrap();
            bus.write8(CpuId::Cpu1, 0x8400 + 0x40 + n as u16, 0x00).unwrap();
        }

        let mut frame = Frame::new();
        hw.compose_frame(&mut bus, &mut frame);

        let expected_rows = [2usize, 3, 4, 5];
        for (n, &row) in expected_rows.iter().enumerate() {
            let code = (n + 1) as u8;
            let expected = hw.tiles.render_tile(code, 0);
            for ty in 0..TILE_H {
                for tx in 0..TILE_W {
                    let x = PLAYFIELD_RIGHTMOST_COL * TILE_W + tx;
                    let y = row * TILE_H + ty;
                    assert_eq!(frame.pixel(x, y), expected.pixel(tx, ty));
                }
            }
        }
    }

    #[test]
    fn strip_regions_fill_all_32_columns_of_their_row() {
        let hw = sample_hardware();
        let mut bus = MemoryBus::new();
        // Strip "top row A" spans addresses 0x3C0..=0x3DF.
        for a in 0x3C0u16..=0x3DF {
            bus.write8(CpuId::Cpu1, 0x8000 + a, 0x07).unwrap();
        }
        let mut frame = Frame::new();
        hw.compose_frame(&mut bus, &mut frame);
        let expected = hw.tiles.render_tile(0x07, 0);
        for col in 0..TILES_W {
            let x = col * TILE_W;
            assert_eq!(frame.pixel(x, 0), expected.pixel(0, 0));
        }
    }
}
