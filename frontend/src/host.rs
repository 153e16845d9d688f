//! Two-thread host model (spec.md §5): a hardware thread runs
//! [`PcbLoop::run`] at its own pace; the UI thread polls the frame
//! mailbox and drives the SDL2 window. The only resource crossing the
//! thread boundary is the frame buffer handoff, matching the board's
//! stated resource-ownership rule.

use std::thread;

use galaga_core::control::{Breakpoint, DebugCommand, FrameMailbox, LoopControl};
use galaga_core::cpu::StubCpu;
use galaga_core::pcb::PcbLoop;

use crate::bmp;
use crate::video::Video;

/// Spawns the hardware thread and runs the SDL2 event loop on the
/// calling thread until the window closes or the process is signalled
/// to quit. `initial_breakpoints` are queued before the hardware
/// thread starts draining the debug channel, so a breakpoint supplied
/// on the command line is armed from the first instruction.
pub fn run(
    mut pcb: PcbLoop<StubCpu, StubCpu, StubCpu>,
    sdl_context: sdl2::Sdl,
    scale: u32,
    bmp_sink: Option<std::path::PathBuf>,
    initial_breakpoints: Vec<Breakpoint>,
) -> Result<(), String> {
    let control = LoopControl::new();
    let mailbox = FrameMailbox::new();
    let (debug_tx, debug_rx) = galaga_core::control::debug_channel();

    for bp in initial_breakpoints {
        debug_tx.send(DebugCommand::SetBreakpoint(bp));
    }

    let hw_control = control.clone();
    let hw_mailbox = mailbox.clone();
    let hardware_thread = thread::spawn(move || {
        pcb.run(&hw_control, &debug_rx, &hw_mailbox);
    });

    let result = run_ui_loop(&sdl_context, scale, &control, &mailbox, bmp_sink);

    control.cancel();
    if hardware_thread.join().is_err() {
        log::error!("hardware thread panicked");
    }

    result
}

fn run_ui_loop(
    sdl_context: &sdl2::Sdl,
    scale: u32,
    control: &LoopControl,
    mailbox: &FrameMailbox,
    bmp_sink: Option<std::path::PathBuf>,
) -> Result<(), String> {
    let video_subsystem = sdl_context.video()?;
    let mut video = Video::new(
        &video_subsystem,
        "Galaga",
        galaga_core::video::FRAME_WIDTH as u32,
        galaga_core::video::FRAME_HEIGHT as u32,
        scale,
    );
    let mut event_pump = sdl_context.event_pump()?;
    let mut frames_delivered: u64 = 0;

    'running: loop {
        for event in event_pump.poll_iter() {
            if let sdl2::event::Event::Quit { .. } = event {
                break 'running;
            }
        }

        if control.is_cancelled() {
            break 'running;
        }

        if let Some(frame) = mailbox.take_latest() {
            let mut rgb = Vec::with_capacity(frame.width * frame.height * 3);
            for y in 0..frame.height {
                for x in 0..frame.width {
                    let color = frame.pixel(x, y);
                    rgb.push(color.r);
                    rgb.push(color.g);
                    rgb.push(color.b);
                }
            }
            video.present(&rgb);

            if let Some(dir) = &bmp_sink {
                let path = dir.join(format!("frame-{frames_delivered:06}.bmp"));
                if let Err(e) = std::fs::write(&path, bmp::encode(&frame)) {
                    log::warn!("failed to write frame BMP to {}: {e}", path.display());
                }
            }
            frames_delivered += 1;
        }

        thread::yield_now();
    }

    Ok(())
}
