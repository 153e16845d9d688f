//! The PCB loop's contract with its host (spec.md §5): cancellation,
//! pause, the one-slot frame mailbox, and the debug command channel.
//!
//! Grounded on this workspace's own concurrency idiom (see the
//! teacher's `Arc<Mutex<_>>` frame/audio ring and `Arc<AtomicBool>`
//! flags in `frontend/src/audio.rs`) rather than pulling in a
//! channel crate the rest of the stack doesn't already use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

use crate::bus::CpuId;
use crate::video::Frame;

/// Flags the host flips from outside the loop's thread.
#[derive(Clone)]
pub struct LoopControl {
    cancelled: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}

impl Default for LoopControl {
    fn default() -> Self {
        Self::new()
    }
}

/// A single-slot mailbox: the loop overwrites whatever frame is
/// sitting there at every VBLANK; the UI thread takes whatever is
/// latest whenever it next looks. No back-pressure, no queueing — a
/// dropped intermediate frame is the correct behaviour for a live
/// video feed.
#[derive(Clone)]
pub struct FrameMailbox {
    slot: Arc<Mutex<Option<Frame>>>,
}

impl FrameMailbox {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn publish(&self, frame: Frame) {
        *self.slot.lock().unwrap() = Some(frame);
    }

    /// Take the latest published frame, if any has arrived since the
    /// last call.
    pub fn take_latest(&self) -> Option<Frame> {
        self.slot.lock().unwrap().take()
    }
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// A breakpoint address for one CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    pub cpu: CpuId,
    pub addr: u16,
}

/// Commands the host's debug UI sends into the loop (spec.md §6/§9).
#[derive(Debug, Clone)]
pub enum DebugCommand {
    SetBreakpoint(Breakpoint),
    ClearBreakpoint(Breakpoint),
    /// Single-step: run exactly one more CPU1 step, then re-pause.
    StepOnce,
    /// Resume free-running after a breakpoint hit.
    Continue,
}

/// The loop's half of the debug command channel. Non-blocking: the
/// loop drains whatever is pending at the top of each iteration and
/// never waits on the host.
pub struct DebugChannel {
    rx: Receiver<DebugCommand>,
}

impl DebugChannel {
    pub fn drain(&self) -> Vec<DebugCommand> {
        let mut cmds = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(cmd) => cmds.push(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        cmds
    }
}

/// The host's half of the debug command channel.
#[derive(Clone)]
pub struct DebugSender {
    tx: Sender<DebugCommand>,
}

impl DebugSender {
    pub fn send(&self, cmd: DebugCommand) {
        // The loop thread owns the receiver for its whole lifetime; a
        // send failing means the loop already exited, which the host
        // observes independently via `LoopControl::is_cancelled`.
        let _ = self.tx.send(cmd);
    }
}

pub fn debug_channel() -> (DebugSender, DebugChannel) {
    let (tx, rx) = mpsc::channel();
    (DebugSender { tx }, DebugChannel { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_mailbox_yields_latest_and_then_empties() {
        let mailbox = FrameMailbox::new();
        assert!(mailbox.take_latest().is_none());
        mailbox.publish(Frame::new());
        assert!(mailbox.take_latest().is_some());
        assert!(mailbox.take_latest().is_none());
    }

    #[test]
    fn loop_control_flags_round_trip() {
        let control = LoopControl::new();
        assert!(!control.is_cancelled());
        assert!(!control.is_paused());
        control.set_paused(true);
        assert!(control.is_paused());
        control.cancel();
        assert!(control.is_cancelled());
    }

    #[test]
    fn debug_channel_drains_all_pending_commands() {
        let (tx, rx) = debug_channel();
        tx.send(DebugCommand::StepOnce);
        tx.send(DebugCommand::Continue);
        let cmds = rx.drain();
        assert_eq!(cmds.len(), 2);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn loop_control_clones_share_state() {
        let control = LoopControl::new();
        let clone = control.clone();
        clone.cancel();
        assert!(control.is_cancelled());
    }
}
