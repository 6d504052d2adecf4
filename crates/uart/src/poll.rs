//! Busy-wait policies.
//!
//! Firmware has nothing to yield to, so waiting on a device means spinning on
//! its status register. The policy decides how long to spin: forever on
//! hardware, a bounded number of polls on the host.

use core::convert::Infallible;

/// Decides how to wait while a device reports itself busy.
pub trait Poll {
    type Error;

    /// Evaluate `busy` until it returns `false`.
    fn wait_while<F>(&mut self, busy: F) -> Result<(), Self::Error>
    where
        F: FnMut() -> bool;
}

/// Spin without limit. A device that never becomes ready hangs the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl Poll for Spin {
    type Error = Infallible;

    fn wait_while<F>(&mut self, mut busy: F) -> Result<(), Infallible>
    where
        F: FnMut() -> bool,
    {
        while busy() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("device still busy after {polls} polls")]
pub struct PollTimeout {
    pub polls: u32,
}

/// Spin at most `max_polls` times per wait.
#[derive(Debug, Clone, Copy)]
pub struct Bounded {
    max_polls: u32,
    polls: u64,
}

impl Bounded {
    pub const fn new(max_polls: u32) -> Self {
        Self {
            max_polls,
            polls: 0,
        }
    }

    /// Total predicate evaluations across every wait so far.
    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl Poll for Bounded {
    type Error = PollTimeout;

    fn wait_while<F>(&mut self, mut busy: F) -> Result<(), PollTimeout>
    where
        F: FnMut() -> bool,
    {
        for _ in 0..self.max_polls {
            self.polls += 1;
            if !busy() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(PollTimeout {
            polls: self.max_polls,
        })
    }
}
