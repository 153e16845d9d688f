//! DIP-switch configuration object and its JSON file format (spec.md
//! §6: "DIP switch file... JSON deserialising into the DIP-switch
//! configuration object").

use serde::{Deserialize, Serialize};

use galaga_core::bus::DipSwitches;

/// A self-describing DIP-switch override: named fields for the
/// documented bank pairs rather than a raw byte array, so a JSON
/// override file can be hand-edited meaningfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DipSwitchConfig {
    pub coinage: u8,
    pub lives: u8,
    pub bonus_life: u8,
    pub difficulty: u8,
    pub freeze: bool,
    pub demo_sounds: bool,
    pub cabinet_cocktail: bool,
    pub rack_test: bool,
}

impl Default for DipSwitchConfig {
    fn default() -> Self {
        Self {
            coinage: 0,
            lives: 0,
            bonus_life: 0,
            difficulty: 0,
            freeze: false,
            demo_sounds: true,
            cabinet_cocktail: false,
            rack_test: false,
        }
    }
}

impl DipSwitchConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Pack the named fields into the raw 8-bank array the bus reads
    /// back at 0x6800-0x6807.
    pub fn to_banks(&self) -> DipSwitches {
        let mut banks = [0u8; 8];
        banks[0] = self.coinage & 0x03;
        banks[1] = self.lives & 0x03;
        banks[2] = self.bonus_life & 0x03;
        banks[3] = self.difficulty & 0x03;
        banks[4] = if self.freeze { 0 } else { 0b0000_0010 };
        banks[5] = self.demo_sounds as u8;
        banks[6] = self.cabinet_cocktail as u8;
        banks[7] = self.rack_test as u8;
        DipSwitches { banks }
    }
}
