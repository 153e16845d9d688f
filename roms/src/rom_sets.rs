//! The four recognised Galaga ROM sets (spec.md §6):
//! `galaga`, `galagao`, `galagamw`, `galagamk`.
//!
//! ROM file I/O and CRC32 verification are explicitly out of scope
//! for the core (spec.md §1); filenames here are representative
//! MAME-style identifiers for each logical ROM, not a verified MAME
//! checksum database, so every entry's `crc32` is `None`. A caller
//! that has real checksums can build its own [`RomRegion`] tables the
//! same way.

use galaga_core::bus::{CPU23_ROM_SIZE, CPU1_ROM_SIZE};

use crate::rom_loader::{RomEntry, RomRegion};

pub const TILE_ROM_SIZE: usize = 0x1000;
pub const SPRITE_ROM_SIZE: usize = 0x1000;
pub const COLOR_PROM_SIZE: usize = 32;
pub const LOOKUP_PROM_SIZE: usize = 256;
pub const CONTROL_PROM_SIZE: usize = 256;
pub const MCU_ROM_SIZE: usize = 0x400;

/// Which of the four recognised ROM sets to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalagaRomSet {
    Galaga,
    Galagao,
    Galagamw,
    Galagamk,
}

impl GalagaRomSet {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "galaga" => Some(Self::Galaga),
            "galagao" => Some(Self::Galagao),
            "galagamw" => Some(Self::Galagamw),
            "galagamk" => Some(Self::Galagamk),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Galaga => "galaga",
            Self::Galagao => "galagao",
            Self::Galagamw => "galagamw",
            Self::Galagamk => "galagamk",
        }
    }
}

macro_rules! cpu1_region {
    ($a:expr, $b:expr, $c:expr, $d:expr) => {
        RomRegion {
            size: CPU1_ROM_SIZE,
            entries: &[
                RomEntry {
                    name: $a,
                    alt_name: None,
                    size: 0x1000,
                    offset: 0x0000,
                    crc32: None,
                    description: "CPU1 code block 1/4",
                },
                RomEntry {
                    name: $b,
                    alt_name: None,
                    size: 0x1000,
                    offset: 0x1000,
                    crc32: None,
                    description: "CPU1 code block 2/4",
                },
                RomEntry {
                    name: $c,
                    alt_name: None,
                    size: 0x1000,
                    offset: 0x2000,
                    crc32: None,
                    description: "CPU1 code block 3/4",
                },
                RomEntry {
                    name: $d,
                    alt_name: None,
                    size: 0x1000,
                    offset: 0x3000,
                    crc32: None,
                    description: "CPU1 code block 4/4",
                },
            ],
        }
    };
}

/// All ROM regions for one recognised set. Each field can be loaded
/// independently with [`RomRegion::load`]/`load_skip_checksums`.
pub struct GalagaRegions {
    pub cpu1: RomRegion,
    pub cpu2: RomRegion,
    pub cpu3: RomRegion,
    pub tiles: RomRegion,
    pub sprite_low: RomRegion,
    pub sprite_high: RomRegion,
    pub color_prom: RomRegion,
    pub lookup_prom_char: RomRegion,
    pub lookup_prom_sprite: RomRegion,
    pub control_prom_1: RomRegion,
    pub control_prom_2: RomRegion,
    pub mcu_51xx: RomRegion,
    pub mcu_54xx: RomRegion,
}

fn single(name: &'static str, size: usize, description: &'static str) -> RomRegion {
    RomRegion {
        size,
        entries: Box::leak(Box::new([RomEntry {
            name,
            alt_name: None,
            size,
            offset: 0,
            crc32: None,
            description,
        }])),
    }
}

pub fn regions_for(set: GalagaRomSet) -> GalagaRegions {
    let cpu1 = match set {
        GalagaRomSet::Galaga => cpu1_region!("3200a.1m", "3200b.1m", "3200c.1m", "3200d.1m"),
        GalagaRomSet::Galagao => cpu1_region!("gg1_1.3p", "gg1_2.3m", "gg1_3.2m", "gg1_4.2l"),
        GalagaRomSet::Galagamw => cpu1_region!("gg1-1.3p", "gg1-2.3m", "gg1-3.2m", "gg1-4.2l"),
        GalagaRomSet::Galagamk => cpu1_region!("gg1-1.3p", "gg1-2.3m", "gg1-3.2m", "mk2-4.2l"),
    };

    GalagaRegions {
        cpu1,
        cpu2: single("3200e.4l", CPU23_ROM_SIZE, "CPU2 code"),
        cpu3: single("3200f.4f", CPU23_ROM_SIZE, "CPU3 code"),
        tiles: single("2600t.5f", TILE_ROM_SIZE, "tile/char graphics"),
        sprite_low: single("2600u.5h", SPRITE_ROM_SIZE, "sprite graphics low plane"),
        sprite_high: single("2600v.5k", SPRITE_ROM_SIZE, "sprite graphics high plane"),
        color_prom: single("prom-5.1n", COLOR_PROM_SIZE, "color PROM"),
        lookup_prom_char: single("prom-4.2n", LOOKUP_PROM_SIZE, "char lookup PROM"),
        lookup_prom_sprite: single("prom-3.1c", LOOKUP_PROM_SIZE, "sprite lookup PROM"),
        control_prom_1: single("prom-1.1d", CONTROL_PROM_SIZE, "control PROM 1"),
        control_prom_2: single("prom-2.5c", CONTROL_PROM_SIZE, "control PROM 2"),
        mcu_51xx: single("51xx.bin", MCU_ROM_SIZE, "Namco 51XX custom MCU"),
        mcu_54xx: single("54xx.bin", MCU_ROM_SIZE, "Namco 54XX custom MCU"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognises_all_four_sets() {
        for name in ["galaga", "galagao", "galagamw", "galagamk"] {
            assert_eq!(GalagaRomSet::parse(name).unwrap().name(), name);
        }
    }

    #[test]
    fn parse_rejects_unknown_name() {
        assert!(GalagaRomSet::parse("pacman").is_none());
    }

    #[test]
    fn cpu1_region_spans_four_4kib_blocks() {
        let regions = regions_for(GalagaRomSet::Galaga);
        assert_eq!(regions.cpu1.size, CPU1_ROM_SIZE);
        assert_eq!(regions.cpu1.entries.len(), 4);
    }

    #[test]
    fn single_file_regions_have_expected_sizes() {
        let regions = regions_for(GalagaRomSet::Galaga);
        assert_eq!(regions.cpu2.size, CPU23_ROM_SIZE);
        assert_eq!(regions.color_prom.size, COLOR_PROM_SIZE);
        assert_eq!(regions.mcu_51xx.size, MCU_ROM_SIZE);
    }
}
