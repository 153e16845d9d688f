pub mod annotations;
pub mod dip;
pub mod rom_loader;
pub mod rom_path;
pub mod rom_sets;

pub use rom_loader::{RomEntry, RomLoadError, RomRegion, RomSet};
pub use rom_sets::{regions_for, GalagaRegions, GalagaRomSet};
