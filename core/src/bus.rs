//! The shared memory-mapped bus (spec.md §4.B).
//!
//! One [`MemoryBus`] instance serves all three CPUs; the active decoder
//! is parameterised by [`CpuId`] so a single address-decode table can
//! express the per-CPU ROM-mirroring quirks in §3's memory map.

use std::fmt;

use crate::error::{BusOp, EmuError};

/// Which of the board's three Z80s is making the access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuId {
    Cpu1,
    Cpu2,
    Cpu3,
}

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu1 => write!(f, "CPU1"),
            Self::Cpu2 => write!(f, "CPU2"),
            Self::Cpu3 => write!(f, "CPU3"),
        }
    }
}

pub const CPU1_ROM_SIZE: usize = 0x4000; // 16 KiB: four concatenated 4 KiB blocks
pub const CPU23_ROM_SIZE: usize = 0x1000; // 4 KiB
const SHARED_SIZE: usize = 0x1_0000; // 64 KiB: VRAM + shared RAM at their mapped offsets

const VRAM_TILE_CODES: std::ops::RangeInclusive<u16> = 0x8000..=0x83FF;
const VRAM_TILE_ATTRS: std::ops::RangeInclusive<u16> = 0x8400..=0x87FF;
const SHARED_RAM_1: std::ops::RangeInclusive<u16> = 0x8800..=0x8BFF;
const SHARED_RAM_2: std::ops::RangeInclusive<u16> = 0x9000..=0x93FF;
const SHARED_RAM_3: std::ops::RangeInclusive<u16> = 0x9800..=0x9BFF;

/// DIP switch bank pairs latched at startup/config time, read back at
/// 0x6800-0x6807. Bit 0 of each pair is SW B, bit 1 is SW A.
#[derive(Debug, Clone, Copy)]
pub struct DipSwitches {
    pub banks: [u8; 8],
}

impl Default for DipSwitches {
    fn default() -> Self {
        // All zero except 0x6804 (SWB5 "Freeze"), which reads as Off.
        let mut banks = [0u8; 8];
        banks[4] = 0b0000_0010;
        Self { banks }
    }
}

/// The shared Galaga PCB memory bus: per-CPU ROM images, the 64 KiB
/// shared VRAM/RAM array, and the latch/DIP/06XX register windows.
pub struct MemoryBus {
    cpu1_rom: [u8; CPU1_ROM_SIZE],
    cpu2_rom: [u8; CPU23_ROM_SIZE],
    cpu3_rom: [u8; CPU23_ROM_SIZE],
    memory: [u8; SHARED_SIZE],

    dip: DipSwitches,

    /// Permit writes to 0x0000-0x3FFF (config override, spec.md §6).
    pub writable_rom: bool,

    // 74LS-style addressable latches at 0x6820-0x6823.
    pub cpu1_irq_enabled: bool,
    pub cpu2_irq_enabled: bool,
    pub cpu3_irq_enabled: bool,
    pub halt_cpu2: bool,
    pub halt_cpu3: bool,

    /// Last byte written to device port 0 (CPU1 IM2 vector low byte).
    pub port0_last_write: u8,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self {
            cpu1_rom: [0; CPU1_ROM_SIZE],
            cpu2_rom: [0; CPU23_ROM_SIZE],
            cpu3_rom: [0; CPU23_ROM_SIZE],
            memory: [0; SHARED_SIZE],
            dip: DipSwitches::default(),
            writable_rom: false,
            cpu1_irq_enabled: false,
            cpu2_irq_enabled: false,
            cpu3_irq_enabled: false,
            halt_cpu2: true,
            halt_cpu3: true,
            port0_last_write: 0,
        }
    }

    pub fn set_dip_switches(&mut self, dip: DipSwitches) {
        self.dip = dip;
    }

    pub fn dip_switches(&self) -> DipSwitches {
        self.dip
    }

    /// Load a 16 KiB CPU1 program image (four concatenated 4 KiB blocks).
    pub fn load_cpu1_rom(&mut self, data: &[u8]) {
        let n = data.len().min(CPU1_ROM_SIZE);
        self.cpu1_rom[..n].copy_from_slice(&data[..n]);
    }

    pub fn load_cpu2_rom(&mut self, data: &[u8]) {
        let n = data.len().min(CPU23_ROM_SIZE);
        self.cpu2_rom[..n].copy_from_slice(&data[..n]);
    }

    pub fn load_cpu3_rom(&mut self, data: &[u8]) {
        let n = data.len().min(CPU23_ROM_SIZE);
        self.cpu3_rom[..n].copy_from_slice(&data[..n]);
    }

    /// Direct access to the 64 KiB shared array, used by the video
    /// hardware to walk VRAM without going through the fallible
    /// per-CPU decoder (reads are always well-formed there).
    pub fn shared_memory(&self) -> &[u8; SHARED_SIZE] {
        &self.memory
    }

    pub fn shared_memory_mut(&mut self) -> &mut [u8; SHARED_SIZE] {
        &mut self.memory
    }

    pub fn read8(&mut self, cpu: CpuId, addr: u16) -> Result<u8, EmuError> {
        match addr {
            0x0000..=0x3FFF => self.read_rom(cpu, addr),

            0x6800..=0x6807 => Ok(self.dip.banks[(addr - 0x6800) as usize]),

            0x7000..=0x7100 => {
                // Namco 51XX/54XX bus interface, stubbed: 0x10 lets CPU1's
                // I/O wait-loop progress. See spec.md §9.
                Ok(0x10)
            }

            a if VRAM_TILE_CODES.contains(&a)
                || VRAM_TILE_ATTRS.contains(&a)
                || SHARED_RAM_1.contains(&a)
                || SHARED_RAM_2.contains(&a)
                || SHARED_RAM_3.contains(&a) =>
            {
                Ok(self.memory[a as usize])
            }

            _ => Err(EmuError::UnmappedAddress {
                cpu,
                addr,
                op: BusOp::Read,
            }),
        }
    }

    pub fn write8(&mut self, cpu: CpuId, addr: u16, value: u8) -> Result<(), EmuError> {
        match addr {
            0x0000..=0x3FFF => {
                if !self.writable_rom {
                    return Err(EmuError::ReadOnlyWrite { cpu, addr });
                }
                self.write_rom(addr, value);
                Ok(())
            }

            0x6800..=0x681F => {
                log::trace!("sound register 0x{addr:04X} <- 0x{value:02X} (stub)");
                Ok(())
            }

            0x6820 => {
                self.cpu1_irq_enabled = value != 0;
                Ok(())
            }
            0x6821 => {
                self.cpu2_irq_enabled = value != 0;
                Ok(())
            }
            0x6822 => {
                // Inverted: writing 0 enables CPU3's NMI, non-zero disables it.
                self.cpu3_irq_enabled = value == 0;
                Ok(())
            }
            0x6823 => {
                // 0 = hold halted, non-zero = release.
                self.halt_cpu2 = value == 0;
                self.halt_cpu3 = value == 0;
                Ok(())
            }
            0x6824..=0x6827 => {
                log::warn!("unimplemented latch 0x{addr:04X} <- 0x{value:02X}");
                Ok(())
            }

            0x6830 => Ok(()), // watchdog reset: no-op

            0x7000..=0x7100 => {
                log::trace!("06XX bus write 0x{addr:04X} <- 0x{value:02X} (stub)");
                Ok(())
            }

            a if VRAM_TILE_CODES.contains(&a)
                || VRAM_TILE_ATTRS.contains(&a)
                || SHARED_RAM_1.contains(&a)
                || SHARED_RAM_2.contains(&a)
                || SHARED_RAM_3.contains(&a) =>
            {
                self.memory[a as usize] = value;
                Ok(())
            }

            0xA000..=0xA005 => {
                log::trace!("starfield control 0x{addr:04X} <- 0x{value:02X} (stub)");
                Ok(())
            }
            0xA007 => {
                log::trace!("flip-screen <- 0x{value:02X} (stub)");
                Ok(())
            }

            _ => Err(EmuError::UnmappedAddress {
                cpu,
                addr,
                op: BusOp::Write,
            }),
        }
    }

    pub fn read16(&mut self, cpu: CpuId, addr: u16) -> Result<u16, EmuError> {
        let lo = self.read8(cpu, addr)?;
        let hi = self.read8(cpu, addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub fn write16(&mut self, cpu: CpuId, addr: u16, value: u16) -> Result<(), EmuError> {
        let [lo, hi] = value.to_le_bytes();
        self.write8(cpu, addr, lo)?;
        self.write8(cpu, addr.wrapping_add(1), hi)?;
        Ok(())
    }

    fn read_rom(&self, cpu: CpuId, addr: u16) -> Result<u8, EmuError> {
        match cpu {
            CpuId::Cpu1 => Ok(self.cpu1_rom[addr as usize]),
            CpuId::Cpu2 => {
                if (addr as usize) < CPU23_ROM_SIZE {
                    Ok(self.cpu2_rom[addr as usize])
                } else {
                    log::warn!("CPU2 ROM read above 0x0FFF at 0x{addr:04X}");
                    Ok(0x00)
                }
            }
            CpuId::Cpu3 => {
                if (addr as usize) < CPU23_ROM_SIZE {
                    Ok(self.cpu3_rom[addr as usize])
                } else {
                    Err(EmuError::DeviceFault {
                        cpu,
                        detail: format!("CPU3 ROM read above 0x0FFF at 0x{addr:04X}"),
                    })
                }
            }
        }
    }

    fn write_rom(&mut self, addr: u16, value: u8) {
        // writable_rom is already checked by the caller; this only
        // exists so the override has somewhere consistent to land.
        // Which backing array to hit depends on which CPU is
        // writing, but since this override exists purely for test/dev
        // tooling (§6) we mirror the write into CPU1's image, which is
        // what every real ROM-resident debugger session targets.
        self.cpu1_rom[addr as usize] = value;
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}
