//! Emulator state snapshot (spec.md §4.G/§3): everything needed to
//! resume a session except the ROM images, which the host re-loads
//! from the ROM set on restore.

use serde::{Deserialize, Serialize};

use crate::bus::{CpuId, DipSwitches, MemoryBus};
use crate::cpu::CpuEngine;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DipSwitchesSnapshot {
    pub banks: [u8; 8],
}

impl From<DipSwitches> for DipSwitchesSnapshot {
    fn from(dip: DipSwitches) -> Self {
        Self { banks: dip.banks }
    }
}

impl From<DipSwitchesSnapshot> for DipSwitches {
    fn from(snap: DipSwitchesSnapshot) -> Self {
        DipSwitches { banks: snap.banks }
    }
}

/// CPU-state snapshot taken through [`crate::cpu::CpuEngine`]'s
/// register surface: the bus's own latched enable bit, the halted
/// flag, and the engine's opaque register/flag blob (registers, IFF1/
/// IFF2, interrupt mode — spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CpuLatchState {
    pub irq_enabled: bool,
    pub halted: bool,
    pub registers: Vec<u8>,
}

/// A point-in-time snapshot of everything mutable on the board,
/// excluding the three immutable ROM images (§3's explicit exclusion:
/// ROMs are re-supplied from the ROM set, not serialized).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorState {
    pub shared_memory: Vec<u8>,
    pub dip: DipSwitchesSnapshot,
    pub writable_rom: bool,
    pub cpu1: CpuLatchState,
    pub cpu2: CpuLatchState,
    pub cpu3: CpuLatchState,
    pub port0_last_write: u8,
    pub total_cycles: u64,
    pub total_opcodes: u64,
    pub cycles_since_interrupt: u32,
}

impl EmulatorState {
    #[allow(clippy::too_many_arguments)]
    pub fn capture<C1: CpuEngine, C2: CpuEngine, C3: CpuEngine>(
        bus: &MemoryBus,
        cpu1: &C1,
        cpu2: &C2,
        cpu3: &C3,
        total_cycles: u64,
        total_opcodes: u64,
        cycles_since_interrupt: u32,
    ) -> Self {
        Self {
            shared_memory: bus.shared_memory().to_vec(),
            dip: bus.dip_switches().into(),
            writable_rom: bus.writable_rom,
            cpu1: CpuLatchState {
                irq_enabled: bus.cpu1_irq_enabled,
                halted: false,
                registers: cpu1.save_registers(),
            },
            cpu2: CpuLatchState {
                irq_enabled: bus.cpu2_irq_enabled,
                halted: bus.halt_cpu2,
                registers: cpu2.save_registers(),
            },
            cpu3: CpuLatchState {
                irq_enabled: bus.cpu3_irq_enabled,
                halted: bus.halt_cpu3,
                registers: cpu3.save_registers(),
            },
            port0_last_write: bus.port0_last_write,
            total_cycles,
            total_opcodes,
            cycles_since_interrupt,
        }
    }

    /// Restore onto a bus whose ROM images are already loaded by the
    /// caller; this never touches `cpu1_rom`/`cpu2_rom`/`cpu3_rom`.
    pub fn restore<C1: CpuEngine, C2: CpuEngine, C3: CpuEngine>(
        &self,
        bus: &mut MemoryBus,
        cpu1: &mut C1,
        cpu2: &mut C2,
        cpu3: &mut C3,
    ) {
        bus.shared_memory_mut().copy_from_slice(&self.shared_memory);
        bus.set_dip_switches(self.dip.clone().into());
        bus.writable_rom = self.writable_rom;
        bus.cpu1_irq_enabled = self.cpu1.irq_enabled;
        bus.cpu2_irq_enabled = self.cpu2.irq_enabled;
        bus.cpu3_irq_enabled = self.cpu3.irq_enabled;
        bus.halt_cpu2 = self.cpu2.halted;
        bus.halt_cpu3 = self.cpu3.halted;
        bus.port0_last_write = self.port0_last_write;
        cpu1.load_registers(&self.cpu1.registers);
        cpu2.load_registers(&self.cpu2.registers);
        cpu3.load_registers(&self.cpu3.registers);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
