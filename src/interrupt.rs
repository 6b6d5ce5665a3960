//! Ctrl-C handling for long-running loops.
//!
//! The handler only raises a flag; recording and batch loops poll it between
//! units of work and unwind normally, so temp files are dropped and removed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// A flag that is never raised by a signal, only by [`trigger`](Self::trigger).
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a process-wide Ctrl-C handler that raises the returned flag.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let interrupt = Self::new();
        let flag = Arc::clone(&interrupt.flag);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })?;
        Ok(interrupt)
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
