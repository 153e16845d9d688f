use clap::Parser;

use galaga_core::bus::MemoryBus;
use galaga_core::control::Breakpoint;
use galaga_core::cpu::StubCpu;
use galaga_core::pcb::PcbLoop;
use galaga_core::snapshot::EmulatorState;
use galaga_core::video::VideoHardware;
use galaga_core::{bus::CpuId, palette, tile::TileRenderer};

use galaga_roms::dip::DipSwitchConfig;
use galaga_roms::rom_path::load_rom_set;
use galaga_roms::rom_sets::{self, GalagaRomSet};
use galaga_roms::{annotations, RomLoadError};

mod bmp;
mod config;
mod host;
mod video;

use config::Config;

/// Per-crate configuration/startup failures, mapped to a non-zero
/// exit code per spec.md §6.
#[derive(Debug)]
enum AppError {
    UnknownRomSet(String),
    Rom(RomLoadError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Annotation(annotations::AnnotationParseError),
    Emu(galaga_core::error::EmuError),
    Sdl(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRomSet(name) => write!(f, "unknown ROM set: {name}"),
            Self::Rom(e) => write!(f, "ROM loading failed: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Annotation(e) => write!(f, "annotation file error: {e}"),
            Self::Emu(e) => write!(f, "{e}"),
            Self::Sdl(e) => write!(f, "SDL2 error: {e}"),
        }
    }
}

impl From<RomLoadError> for AppError {
    fn from(e: RomLoadError) -> Self {
        Self::Rom(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<annotations::AnnotationParseError> for AppError {
    fn from(e: annotations::AnnotationParseError) -> Self {
        Self::Annotation(e)
    }
}

impl From<galaga_core::error::EmuError> for AppError {
    fn from(e: galaga_core::error::EmuError) -> Self {
        Self::Emu(e)
    }
}

fn main() {
    env_logger::init();
    let config = Config::parse();

    match run(config) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            log::error!("{e}");
            eprintln!("galaga: {e}");
            std::process::exit(1);
        }
    }
}

fn run(config: Config) -> Result<(), AppError> {
    let rom_set_kind = GalagaRomSet::parse(&config.rom_set)
        .ok_or_else(|| AppError::UnknownRomSet(config.rom_set.clone()))?;

    let rom_set = load_rom_set(rom_set_kind.name(), &config.rom_path)?;
    let regions = rom_sets::regions_for(rom_set_kind);

    let load = |region: &galaga_roms::RomRegion| -> Result<Vec<u8>, AppError> {
        if config.skip_checksums {
            match region.load(&rom_set) {
                Ok(data) => Ok(data),
                Err(RomLoadError::RomChecksumMismatch { file, expected, actual }) => {
                    log::warn!(
                        "{file}: CRC32 mismatch (expected 0x{expected:08X}, got 0x{actual:08X}), continuing (skip_checksums)"
                    );
                    Ok(region.load_skip_checksums(&rom_set)?)
                }
                Err(e) => Err(e.into()),
            }
        } else {
            Ok(region.load(&rom_set)?)
        }
    };

    let cpu1_rom = load(&regions.cpu1)?;
    let cpu2_rom = load(&regions.cpu2)?;
    let cpu3_rom = load(&regions.cpu3)?;
    let tile_rom = load(&regions.tiles)?;
    let color_prom = load(&regions.color_prom)?;
    let lookup_prom_char = load(&regions.lookup_prom_char)?;

    let mut bus = MemoryBus::new();
    bus.writable_rom = config.writable_rom;
    bus.load_cpu1_rom(&cpu1_rom);
    bus.load_cpu2_rom(&cpu2_rom);
    bus.load_cpu3_rom(&cpu3_rom);

    if let Some(dip_path) = config.effective_dip_switches_path() {
        let text = std::fs::read_to_string(&dip_path)?;
        let dip_config = DipSwitchConfig::from_json(&text)?;
        bus.set_dip_switches(dip_config.to_banks());
    }

    for (opt_path, label) in [
        (&config.annotations_cpu1, "cpu1"),
        (&config.annotations_cpu2, "cpu2"),
        (&config.annotations_cpu3, "cpu3"),
    ] {
        if let Some(path) = opt_path {
            let text = std::fs::read_to_string(path)?;
            let map = annotations::parse_annotations(&text)?;
            log::info!("loaded {} annotation(s) for {label}", map.len());
        }
    }

    let color_prom_array: [u8; 32] = color_prom
        .as_slice()
        .try_into()
        .map_err(|_| AppError::Io(std::io::Error::other("color PROM is not 32 bytes")))?;
    let colors = palette::build_colors(&color_prom_array);
    let palettes = palette::build_palettes(&lookup_prom_char, &colors)?;
    let tiles = TileRenderer::new(tile_rom, palettes);
    let video_hw = VideoHardware::new(tiles);

    // The Z80 instruction-set core is out of scope for this system;
    // `StubCpu` is the only CpuEngine implementation in the workspace
    // and stands in for the real per-CPU stepping engines.
    let cpu1 = StubCpu::new(4);
    let cpu2 = StubCpu::new(4);
    let cpu3 = StubCpu::new(4);

    let mut pcb = PcbLoop::new(bus, cpu1, cpu2, cpu3, video_hw);

    if let Some(state_path) = &config.load_state_path {
        let text = std::fs::read_to_string(state_path)?;
        let state = EmulatorState::from_json(&text)?;
        pcb.restore_state(&state);
    }

    let mut breakpoints = Vec::new();
    if config.debug {
        for &addr in &config.r#break {
            for cpu in [CpuId::Cpu1, CpuId::Cpu2, CpuId::Cpu3] {
                breakpoints.push(Breakpoint { cpu, addr });
            }
        }
        for &addr in &config.break_cpu1 {
            breakpoints.push(Breakpoint { cpu: CpuId::Cpu1, addr });
        }
        for &addr in &config.break_cpu2 {
            breakpoints.push(Breakpoint { cpu: CpuId::Cpu2, addr });
        }
        for &addr in &config.break_cpu3 {
            breakpoints.push(Breakpoint { cpu: CpuId::Cpu3, addr });
        }
    }

    if config.reverse_step {
        log::warn!("reverse_step is not implemented for multi-CPU systems; ignoring");
    }

    let sdl_context = sdl2::init().map_err(AppError::Sdl)?;
    host::run(pcb, sdl_context, config.scale, None, breakpoints).map_err(AppError::Sdl)?;

    Ok(())
}
