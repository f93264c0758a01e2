//! Terminal mode management.
//!
//! [`TerminalModes`] puts the terminal into raw mode with the alternate
//! screen (and mouse capture when enabled) and restores it when dropped, on
//! every exit path. [`emergency_cleanup`] is for the panic hook, where the
//! guard may never be dropped.

use crossterm::cursor::Show;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use std::io::{self, stdout};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct TerminalModes {
    mouse_capture: bool,
    active: AtomicBool,
}

impl TerminalModes {
    pub fn enable(mouse_capture: bool) -> io::Result<Self> {
        let modes = Self {
            mouse_capture,
            active: AtomicBool::new(false),
        };
        modes.enter()?;
        Ok(modes)
    }

    fn enter(&self) -> io::Result<()> {
        enable_raw_mode()?;
        if let Err(e) = crossterm::execute!(stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        if self.mouse_capture {
            if let Err(e) = crossterm::execute!(stdout(), EnableMouseCapture) {
                tracing::warn!("Mouse capture unavailable: {}", e);
            }
        }
        self.active.store(true, Ordering::SeqCst);
        tracing::debug!("Terminal modes enabled (mouse: {})", self.mouse_capture);
        Ok(())
    }

    fn leave(&self) {
        if self.mouse_capture {
            let _ = crossterm::execute!(stdout(), DisableMouseCapture);
        }
        let _ = crossterm::execute!(stdout(), LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();
        tracing::debug!("Terminal modes restored");
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn undo(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.leave();
        }
    }

    /// Hand the terminal back to the shell and stop the process. Returns
    /// once the process is continued, with the modes re-entered.
    #[cfg(unix)]
    pub fn suspend_process(&self) -> io::Result<()> {
        use nix::sys::signal::{raise, Signal};

        self.undo();
        tracing::info!("Suspending");
        raise(Signal::SIGSTOP).map_err(io::Error::from)?;
        tracing::info!("Continued");
        self.enter()
    }

    #[cfg(not(unix))]
    pub fn suspend_process(&self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for TerminalModes {
    fn drop(&mut self) {
        self.undo();
    }
}

/// Best-effort restore for the panic hook.
pub fn emergency_cleanup() {
    let _ = crossterm::execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, Show);
    let _ = disable_raw_mode();
}
