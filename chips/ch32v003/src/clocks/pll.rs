// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PLL clock driver for the CH32V003.
//!
//! The PLL has a fixed multiplier of 2 and takes either the HSI or the HSE as
//! input, giving 48MHz from the HSI. The source selection is not glitch-free,
//! so [Pll::enable] always stops the PLL before writing it.
//!
//! # Usage
//!
//! ```rust,ignore
//! let pll = &peripherals.clocks.pll;
//! pll.enable(PllSource::HSI)?;
//! ```

use crate::rcc::PllSource;
use crate::rcc::Rcc;

use kernel::utilities::poll::Poll;
use kernel::ErrorCode;

/// Fixed PLL multiplication factor
pub const PLL_MULTIPLIER: u32 = 2;

/// Main PLL clock structure
pub struct Pll<'a, P> {
    rcc: &'a Rcc,
    poller: &'a P,
}

impl<'a, P: Poll> Pll<'a, P> {
    pub(in crate::clocks) fn new(rcc: &'a Rcc, poller: &'a P) -> Self {
        Self { rcc, poller }
    }

    /// Feed the PLL from `source`, start it and wait for it to lock.
    ///
    /// The PLL is stopped first, even when it already runs from `source`.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the PLL did not stop, or did not lock, within the poll
    /// budget. The source is left unchanged when the PLL did not stop.
    pub fn enable(&self, source: PllSource) -> Result<(), ErrorCode> {
        self.disable()?;

        self.rcc.set_pll_clock_source(source);
        self.rcc.enable_pll_clock();
        self.poller.poll(&mut || self.rcc.is_ready_pll_clock())
    }

    /// Stop the PLL.
    ///
    /// Returns immediately if the PLL is not running.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the ready flag did not clear within the poll budget. The
    /// hardware keeps the PLL running while it drives the system clock.
    pub fn disable(&self) -> Result<(), ErrorCode> {
        if !self.rcc.is_ready_pll_clock() {
            return Ok(());
        }

        self.rcc.disable_pll_clock();
        self.poller.poll(&mut || !self.rcc.is_ready_pll_clock())
    }

    /// Check whether the PLL is enabled or not.
    pub fn is_enabled(&self) -> bool {
        self.rcc.is_enabled_pll_clock()
    }

    /// Check whether the PLL is locked.
    pub fn is_ready(&self) -> bool {
        self.rcc.is_ready_pll_clock()
    }

    /// Source currently programmed in the PLL source selector.
    pub fn get_source(&self) -> PllSource {
        self.rcc.get_pll_clock_source()
    }

    /// Get the frequency in Hz of the PLL output given the frequency of its source.
    ///
    /// # Returns
    ///
    /// + [Some]\(frequency_hz\): if the PLL is locked.
    /// + [None]: if the PLL is stopped.
    pub fn get_frequency_hz(&self, source_frequency_hz: u32) -> Option<u32> {
        if self.is_ready() {
            source_frequency_hz.checked_mul(PLL_MULTIPLIER)
        } else {
            None
        }
    }
}

/// Tests for the PLL clock
///
/// This module ensures that the PLL clock works as expected. If changes are brought to the PLL
/// clock, ensure to run all the tests to see if anything is broken.
///
/// # Usage
///
/// ```rust,ignore
/// use ch32v003::clocks::pll;
///
/// pll::tests::run(&peripherals.clocks.pll);
/// ```
///
/// **NOTE:** The PLL must not drive the system clock while this runs.
pub mod tests {
    use super::*;

    use kernel::debug;

    /// Run the entire test suite.
    pub fn run<P: Poll>(pll: &Pll<P>) {
        debug!("");
        debug!("===============================================");
        debug!("Testing PLL...");

        assert_eq!(Ok(()), pll.disable());
        assert!(!pll.is_enabled());
        assert_eq!(None, pll.get_frequency_hz(24_000_000));

        assert_eq!(Ok(()), pll.enable(PllSource::HSI));
        assert!(pll.is_ready());
        assert_eq!(PllSource::HSI, pll.get_source());
        assert_eq!(Some(48_000_000), pll.get_frequency_hz(24_000_000));

        // Enabling again restarts the PLL with the same source
        assert_eq!(Ok(()), pll.enable(PllSource::HSI));
        assert!(pll.is_ready());

        assert_eq!(Ok(()), pll.disable());
        assert!(!pll.is_ready());
        assert_eq!(Ok(()), pll.disable());

        debug!("Finished testing PLL. Everything is alright!");
        debug!("===============================================");
        debug!("");
    }
}
