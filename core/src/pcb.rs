//! The PCB loop and interrupt controller (spec.md §4.F): the single
//! worker thread that interleaves the three CPU stepping engines,
//! throttles to 60 Hz using only CPU1's cycle count, and composes a
//! frame once per VBLANK.

use std::thread;
use std::time::{Duration, Instant};

use crate::bus::MemoryBus;
use crate::control::{DebugChannel, DebugCommand, FrameMailbox, LoopControl};
use crate::cpu::CpuEngine;
use crate::video::{Frame, VideoHardware};

pub const CPU_HZ: u32 = 3_072_000;
const FRAME_INTERVAL: Duration = Duration::from_nanos(16_666_667); // 16.6 ms

/// Per-CPU Running/Halted state (spec.md §4.F). CPU1 has no halt
/// state of its own; it always runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuRunState {
    Running,
    Halted,
}

/// A one-shot single-step latch plus a breakpoint set, driven by the
/// debug command channel (spec.md §6/§9, SPEC_FULL §2).
#[derive(Default)]
struct Debugger {
    breakpoints: Vec<crate::control::Breakpoint>,
    waiting: bool,
    step_once: bool,
}

impl Debugger {
    fn apply(&mut self, cmd: DebugCommand) {
        match cmd {
            DebugCommand::SetBreakpoint(bp) => {
                if !self.breakpoints.contains(&bp) {
                    self.breakpoints.push(bp);
                }
            }
            DebugCommand::ClearBreakpoint(bp) => self.breakpoints.retain(|b| *b != bp),
            DebugCommand::StepOnce => {
                self.step_once = true;
                self.waiting = false;
            }
            DebugCommand::Continue => self.waiting = false,
        }
    }

    /// Pre-step hook: latch `waiting` if CPU1's PC matches a breakpoint.
    fn run_pre_step_hooks(&mut self, cpu1_pc: u16) {
        use crate::bus::CpuId;
        if self
            .breakpoints
            .iter()
            .any(|bp| bp.cpu == CpuId::Cpu1 && bp.addr == cpu1_pc)
        {
            self.waiting = true;
        }
    }

    /// Post-step hook: a single-step request only buys one instruction.
    fn run_post_step_hooks(&mut self) {
        if self.step_once {
            self.step_once = false;
            self.waiting = true;
        }
    }
}

/// The running PCB: the three CPU engines, the shared bus, the video
/// pipeline, and the halt/interrupt bookkeeping from spec.md §4.F.
pub struct PcbLoop<C1, C2, C3> {
    pub bus: MemoryBus,
    cpu1: C1,
    cpu2: C2,
    cpu3: C3,
    video: VideoHardware,

    cpu2_state: CpuRunState,
    cpu3_state: CpuRunState,

    cycles_in_window: u32,
    cycles_since_interrupt: u32,
    total_cycles: u64,
    total_opcodes: u64,

    debugger: Debugger,
}

impl<C1: CpuEngine, C2: CpuEngine, C3: CpuEngine> PcbLoop<C1, C2, C3> {
    pub fn new(bus: MemoryBus, cpu1: C1, cpu2: C2, cpu3: C3, video: VideoHardware) -> Self {
        Self {
            bus,
            cpu1,
            cpu2,
            cpu3,
            video,
            cpu2_state: CpuRunState::Halted,
            cpu3_state: CpuRunState::Halted,
            cycles_in_window: 0,
            cycles_since_interrupt: 0,
            total_cycles: 0,
            total_opcodes: 0,
            debugger: Debugger::default(),
        }
    }

    /// Capture every mutable bus and CPU-engine value (spec.md §3/§4.G)
    /// as a point-in-time snapshot. ROM images are excluded.
    pub fn capture_state(&self) -> crate::snapshot::EmulatorState {
        crate::snapshot::EmulatorState::capture(
            &self.bus,
            &self.cpu1,
            &self.cpu2,
            &self.cpu3,
            self.total_cycles,
            self.total_opcodes,
            self.cycles_since_interrupt,
        )
    }

    /// Restore a snapshot produced by `capture_state` onto this loop.
    /// The bus's ROM images must already be loaded by the caller.
    pub fn restore_state(&mut self, state: &crate::snapshot::EmulatorState) {
        state.restore(&mut self.bus, &mut self.cpu1, &mut self.cpu2, &mut self.cpu3);
        self.total_cycles = state.total_cycles;
        self.total_opcodes = state.total_opcodes;
        self.cycles_since_interrupt = state.cycles_since_interrupt;
    }

    fn sync_halt_states_from_latch(&mut self) {
        if !self.bus.halt_cpu2 {
            self.cpu2_state = CpuRunState::Running;
        }
        if !self.bus.halt_cpu3 {
            self.cpu3_state = CpuRunState::Running;
        }
    }

    /// Run one iteration of the loop body (everything between two
    /// `while not cancelled` checks); returns the cycles CPU1 consumed.
    pub fn step_once(&mut self) -> u32 {
        self.debugger.run_pre_step_hooks(self.cpu1.pc());

        let c1 = self.cpu1.step();

        self.sync_halt_states_from_latch();
        if self.cpu2_state == CpuRunState::Running {
            self.cpu2.step();
        }
        if self.cpu3_state == CpuRunState::Running {
            self.cpu3.step();
        }

        self.cycles_in_window = self.cycles_in_window.saturating_add(c1);
        self.total_cycles += c1 as u64;
        self.total_opcodes += 1;
        self.debugger.run_post_step_hooks();

        self.handle_interrupts(c1, None);
        c1
    }

    /// Applies §4.F's `handle_interrupts(c1)`. `sink` receives a
    /// composed frame whenever a VBLANK boundary is crossed.
    fn handle_interrupts(&mut self, c1: u32, sink: Option<&FrameMailbox>) {
        self.cycles_since_interrupt = self.cycles_since_interrupt.saturating_add(c1);
        let threshold = CPU_HZ / 60;
        if self.cycles_since_interrupt < threshold {
            return;
        }

        if let Some(mailbox) = sink {
            let mut frame = Frame::new();
            self.video.compose_frame(&mut self.bus, &mut frame);
            mailbox.publish(frame);
        }
        // Audio path: stubbed, out of scope (spec.md §1 Non-goals).

        if self.cpu1.interrupt_enabled() {
            self.cpu1.clear_interrupt_enable();
            self.cpu1.inject_maskable(self.bus.port0_last_write);
        }
        if self.cpu2.interrupt_enabled() {
            self.bus.halt_cpu2 = false;
            self.cpu2_state = CpuRunState::Running;
            self.cpu2.clear_interrupt_enable();
            self.cpu2.inject_maskable(0x00);
        }
        if self.cpu3.interrupt_enabled() {
            self.bus.halt_cpu3 = false;
            self.cpu3_state = CpuRunState::Running;
            self.cpu3.clear_interrupt_enable();
            self.cpu3.inject_nmi();
        }

        self.cycles_since_interrupt = 0;
    }

    /// Runs the loop body until `control` is cancelled, throttling to
    /// 60 Hz against `CPU_HZ` and publishing each composed frame into
    /// `mailbox`. Intended to be the body of the host's hardware
    /// thread (spec.md §5).
    pub fn run(&mut self, control: &LoopControl, debug_rx: &DebugChannel, mailbox: &FrameMailbox) {
        let mut window_start = Instant::now();

        while !control.is_cancelled() {
            while control.is_paused() && !control.is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
            if control.is_cancelled() {
                break;
            }

            for cmd in debug_rx.drain() {
                self.debugger.apply(cmd);
            }
            self.debugger.run_pre_step_hooks(self.cpu1.pc());
            while self.debugger.waiting && !control.is_cancelled() {
                for cmd in debug_rx.drain() {
                    self.debugger.apply(cmd);
                }
                thread::sleep(Duration::from_millis(1));
            }
            if control.is_cancelled() {
                break;
            }

            let c1 = self.cpu1.step();
            self.sync_halt_states_from_latch();
            if self.cpu2_state == CpuRunState::Running {
                self.cpu2.step();
            }
            if self.cpu3_state == CpuRunState::Running {
                self.cpu3.step();
            }
            self.cycles_in_window = self.cycles_in_window.saturating_add(c1);
            self.total_cycles += c1 as u64;
            self.total_opcodes += 1;
            self.debugger.run_post_step_hooks();

            if self.cycles_in_window >= CPU_HZ / 60 {
                let elapsed = window_start.elapsed();
                if elapsed < FRAME_INTERVAL {
                    thread::sleep(FRAME_INTERVAL - elapsed);
                }
                self.cycles_in_window = 0;
                window_start = Instant::now();
            }

            self.handle_interrupts(c1, Some(mailbox));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::CpuId;
    use crate::cpu::StubCpu;
    use crate::palette::{build_colors, build_palettes};
    use crate::tile::TileRenderer;

    fn test_video() -> VideoHardware {
        let colors = build_colors(&[0u8; 32]);
        let palettes = build_palettes(&vec![0u8; 16], &colors).unwrap();
        VideoHardware::new(TileRenderer::new(vec![0u8; 256 * 16], palettes))
    }

    fn test_loop() -> PcbLoop<StubCpu, StubCpu, StubCpu> {
        let bus = MemoryBus::new();
        let cpu1 = StubCpu::new(1000);
        let cpu2 = StubCpu::new(1000);
        let cpu3 = StubCpu::new(1000);
        PcbLoop::new(bus, cpu1, cpu2, cpu3, test_video())
    }

    #[test]
    fn cpu2_and_cpu3_stay_halted_until_6823_release() {
        let mut pcb = test_loop();
        for _ in 0..5 {
            pcb.step_once();
        }
        assert_eq!(pcb.cpu2.steps_taken, 0);
        assert_eq!(pcb.cpu3.steps_taken, 0);

        pcb.bus.write8(CpuId::Cpu1, 0x6823, 0x01).unwrap();
        pcb.step_once();
        assert_eq!(pcb.cpu2.steps_taken, 1);
        assert_eq!(pcb.cpu3.steps_taken, 1);
    }

    #[test]
    fn vblank_fires_after_enough_cpu1_cycles_and_clears_ie() {
        let mut pcb = test_loop();
        pcb.cpu1.ie = true;
        let steps_needed = (CPU_HZ / 60).div_ceil(1000) as usize;
        for _ in 0..steps_needed {
            pcb.step_once();
        }
        assert!(!pcb.cpu1.ie, "IE should have been cleared by the injected interrupt");
        assert_eq!(pcb.cpu1.maskable_injections.len(), 1);
    }

    #[test]
    fn cpu2_vblank_interrupt_uses_fixed_vector_zero() {
        let mut pcb = test_loop();
        pcb.cpu2.ie = true;
        pcb.bus.write8(CpuId::Cpu1, 0x6823, 0x01).unwrap();
        let steps_needed = (CPU_HZ / 60).div_ceil(1000) as usize;
        for _ in 0..steps_needed {
            pcb.step_once();
        }
        assert_eq!(pcb.cpu2.maskable_injections, vec![0x00]);
    }

    #[test]
    fn cpu3_vblank_interrupt_is_nmi() {
        let mut pcb = test_loop();
        pcb.cpu3.ie = true;
        pcb.bus.write8(CpuId::Cpu1, 0x6823, 0x01).unwrap();
        let steps_needed = (CPU_HZ / 60).div_ceil(1000) as usize;
        for _ in 0..steps_needed {
            pcb.step_once();
        }
        assert_eq!(pcb.cpu3.nmi_injections, 1);
    }

    #[test]
    fn cpu1_maskable_vector_low_byte_is_last_port0_write() {
        let mut pcb = test_loop();
        pcb.cpu1.ie = true;
        pcb.bus.write8(CpuId::Cpu1, 0x6800, 0x00).unwrap(); // unrelated sound write
        pcb.bus.port0_last_write = 0x7A;
        let steps_needed = (CPU_HZ / 60).div_ceil(1000) as usize;
        for _ in 0..steps_needed {
            pcb.step_once();
        }
        assert_eq!(pcb.cpu1.maskable_injections, vec![0x7A]);
    }
}
