pub mod bus;
pub mod control;
pub mod cpu;
pub mod error;
pub mod palette;
pub mod pcb;
pub mod snapshot;
pub mod tile;
pub mod video;

pub mod prelude {
    pub use crate::bus::{CpuId, DipSwitches, MemoryBus};
    pub use crate::control::{
        debug_channel, Breakpoint, DebugChannel, DebugCommand, DebugSender, FrameMailbox,
        LoopControl,
    };
    pub use crate::cpu::{CpuEngine, StubCpu};
    pub use crate::error::{BusOp, EmuError};
    pub use crate::palette::{build_colors, build_palettes, Color, Palette};
    pub use crate::pcb::{CpuRunState, PcbLoop, CPU_HZ};
    pub use crate::snapshot::EmulatorState;
    pub use crate::tile::{Tile, TileRenderer};
    pub use crate::video::{Frame, VideoHardware, FRAME_HEIGHT, FRAME_WIDTH};
}
