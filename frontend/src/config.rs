//! Process configuration (spec.md §6's configuration table), parsed
//! from the command line with `clap`, matching the dependency the
//! teacher's own `Cargo.toml` already carried.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "galaga", about = "Galaga PCB hardware emulation core")]
pub struct Config {
    /// Directory (or .zip) to load the ROM set from.
    #[arg(long)]
    pub rom_path: PathBuf,

    /// One of galaga/galagao/galagamw/galagamk.
    #[arg(long, default_value = "galaga")]
    pub rom_set: String,

    /// JSON file with DIP-switch overrides. Defaults to
    /// `./dip-switches.json` if that file exists and the flag is absent.
    #[arg(long)]
    pub dip_switches_path: Option<PathBuf>,

    /// Snapshot file to resume from.
    #[arg(long)]
    pub load_state_path: Option<PathBuf>,

    /// Downgrade CRC32 mismatch from fatal to a logged warning.
    #[arg(long, default_value_t = false)]
    pub skip_checksums: bool,

    /// Permit writes to 0x0000-0x3FFF.
    #[arg(long, default_value_t = false)]
    pub writable_rom: bool,

    /// Enable breakpoint/single-step debug instrumentation.
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Hex breakpoint address(es) shared across all three CPUs.
    #[arg(long, value_parser = parse_hex_u16)]
    pub r#break: Vec<u16>,

    /// Hex breakpoint address(es), CPU1 only.
    #[arg(long = "break-cpu1", value_parser = parse_hex_u16)]
    pub break_cpu1: Vec<u16>,

    /// Hex breakpoint address(es), CPU2 only.
    #[arg(long = "break-cpu2", value_parser = parse_hex_u16)]
    pub break_cpu2: Vec<u16>,

    /// Hex breakpoint address(es), CPU3 only.
    #[arg(long = "break-cpu3", value_parser = parse_hex_u16)]
    pub break_cpu3: Vec<u16>,

    /// Record snapshots per instruction. Not implemented for multi-CPU;
    /// accepted for compatibility and left inert.
    #[arg(long, default_value_t = false)]
    pub reverse_step: bool,

    /// Disassembly annotation file for CPU1.
    #[arg(long)]
    pub annotations_cpu1: Option<PathBuf>,

    /// Disassembly annotation file for CPU2.
    #[arg(long)]
    pub annotations_cpu2: Option<PathBuf>,

    /// Disassembly annotation file for CPU3.
    #[arg(long)]
    pub annotations_cpu3: Option<PathBuf>,

    /// Window scale factor.
    #[arg(long, default_value_t = 3)]
    pub scale: u32,
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u16::from_str_radix(s, 16).map_err(|e| e.to_string())
}

impl Config {
    /// Resolve the effective DIP-switch file path: the explicit flag,
    /// or `./dip-switches.json` if present.
    pub fn effective_dip_switches_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.dip_switches_path {
            return Some(path.clone());
        }
        let default = PathBuf::from("./dip-switches.json");
        default.exists().then_some(default)
    }
}
