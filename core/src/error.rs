//! Error taxonomy for the board core.
//!
//! Mirrors the manual-enum-plus-`Display` idiom used throughout this
//! workspace (see `galaga_roms::rom_loader::RomLoadError`) rather than
//! reaching for `anyhow`/`thiserror`.

use std::fmt;

use crate::bus::CpuId;

/// A bus operation, for diagnostics on an unmapped or read-only access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Read,
    Write,
}

impl fmt::Display for BusOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Errors surfaced by the bus, the PCB loop, and the video/palette
/// pipeline. See `spec.md` §7 for the intended recovery policy of each
/// variant: everything here is fatal except `Unimplemented`, which is
/// logged and answered with a safe default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmuError {
    /// Bus access fell outside every decoded range (fail-closed decoder).
    UnmappedAddress { cpu: CpuId, addr: u16, op: BusOp },

    /// A write landed in ROM space without the writable-ROM override set.
    ReadOnlyWrite { cpu: CpuId, addr: u16 },

    /// A register is recognised but not implemented. Non-fatal: the
    /// caller logs this and returns a safe default.
    Unimplemented {
        subsystem: &'static str,
        addr: u16,
        value: Option<u8>,
    },

    /// The CPU stepping engine reported an internal invariant violation.
    DeviceFault { cpu: CpuId, detail: String },

    /// The PROM backing a palette table was not a multiple of 4 bytes.
    MalformedPalettePRom { len: usize },
}

impl fmt::Display for EmuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappedAddress { cpu, addr, op } => {
                write!(f, "{cpu}: unmapped {op} at 0x{addr:04X}")
            }
            Self::ReadOnlyWrite { cpu, addr } => {
                write!(f, "{cpu}: write to read-only ROM at 0x{addr:04X}")
            }
            Self::Unimplemented {
                subsystem,
                addr,
                value,
            } => match value {
                Some(v) => write!(
                    f,
                    "unimplemented {subsystem} register at 0x{addr:04X} (wrote 0x{v:02X})"
                ),
                None => write!(f, "unimplemented {subsystem} register at 0x{addr:04X} (read)"),
            },
            Self::DeviceFault { cpu, detail } => write!(f, "{cpu}: device fault: {detail}"),
            Self::MalformedPalettePRom { len } => write!(
                f,
                "palette lookup PROM length {len} is not a multiple of 4"
            ),
        }
    }
}

impl std::error::Error for EmuError {}

impl EmuError {
    /// True for the one variant that the bus recovers from locally
    /// (logs and returns a default) instead of propagating to the loop.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unimplemented { .. })
    }
}
