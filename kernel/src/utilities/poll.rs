// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Bounded waiting on hardware status flags.
//!
//! Clock drivers start an oscillator or request a switch and then have to
//! wait for a status bit to follow. [`Poll`] abstracts that wait so drivers
//! can be driven by a simulated peripheral in tests, while [`BoundedPoll`] is
//! the busy-wait used on hardware.
//!
//! ```rust,ignore
//! let poller = BoundedPoll::new(0xFFFF);
//! rcc.enable_hsi_clock();
//! poller.poll(&mut || rcc.is_ready_hsi_clock())?;
//! ```

use crate::ErrorCode;

/// Strategy for waiting until a hardware condition holds.
pub trait Poll {
    /// Evaluate `ready` until it returns `true` or the strategy gives up.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the condition never held within the
    /// budget of the strategy.
    fn poll(&self, ready: &mut dyn FnMut() -> bool) -> Result<(), ErrorCode>;
}

/// Busy-wait that checks a condition a fixed number of times.
#[derive(Clone, Copy, Debug)]
pub struct BoundedPoll {
    attempts: usize,
}

impl BoundedPoll {
    pub const fn new(attempts: usize) -> Self {
        Self { attempts }
    }
}

impl Poll for BoundedPoll {
    fn poll(&self, ready: &mut dyn FnMut() -> bool) -> Result<(), ErrorCode> {
        for _ in 0..self.attempts {
            if ready() {
                return Ok(());
            }
        }

        Err(ErrorCode::BUSY)
    }
}
