// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! HSE (high-speed external) clock driver for the CH32V003.
//!
//! The HSE is either a 4 to 25MHz crystal between PA1 and PA2 or an external
//! clock signal fed to PA1 in bypass mode. Its frequency cannot be measured
//! by the RCC, so the board declares it with [Hse::set_frequency_hz].
//!
//! # Usage
//!
//! ```rust,ignore
//! let hse = &peripherals.clocks.hse;
//! hse.set_frequency_hz(8_000_000);
//! hse.enable(HseMode::CRYSTAL)?;
//! ```

use crate::rcc::HseMode;
use crate::rcc::Rcc;

use core::cell::Cell;
use kernel::utilities::poll::Poll;
use kernel::ErrorCode;

/// Main HSE clock structure
pub struct Hse<'a, P> {
    rcc: &'a Rcc,
    poller: &'a P,
    hse_frequency_hz: Cell<Option<u32>>,
    mode: Cell<HseMode>,
}

impl<'a, P: Poll> Hse<'a, P> {
    pub(in crate::clocks) fn new(rcc: &'a Rcc, poller: &'a P) -> Self {
        Self {
            rcc,
            poller,
            hse_frequency_hz: Cell::new(None),
            mode: Cell::new(HseMode::CRYSTAL),
        }
    }

    /// Start the HSE clock and wait for it to stabilize.
    ///
    /// The bypass setting can only change while the oscillator is off, so `mode` is ignored when
    /// the HSE is already enabled.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the HSE clock did not become ready within the poll budget.
    /// This usually means no crystal or clock signal is connected.
    pub fn enable(&self, mode: HseMode) -> Result<(), ErrorCode> {
        if !self.rcc.is_enabled_hse_clock() {
            self.rcc.set_hse_clock_bypass(mode == HseMode::BYPASS);
            self.mode.set(mode);
        }

        self.rcc.enable_hse_clock();
        self.poller.poll(&mut || self.rcc.is_ready_hse_clock())
    }

    /// Stop the HSE clock and clear the bypass setting.
    ///
    /// Returns immediately if the clock is not running.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the ready flag did not clear within the poll budget.
    pub fn disable(&self) -> Result<(), ErrorCode> {
        if !self.rcc.is_ready_hse_clock() {
            return Ok(());
        }

        self.rcc.disable_hse_clock();
        self.poller.poll(&mut || !self.rcc.is_ready_hse_clock())
    }

    /// Check whether the HSE clock is enabled or not.
    pub fn is_enabled(&self) -> bool {
        self.rcc.is_enabled_hse_clock()
    }

    /// Check whether the HSE oscillator is stable.
    pub fn is_ready(&self) -> bool {
        self.rcc.is_ready_hse_clock()
    }

    /// Current state of the bypass bit. Always [HseMode::CRYSTAL] while the HSE is stopped.
    pub fn get_mode(&self) -> HseMode {
        if self.rcc.is_hse_clock_bypassed() {
            HseMode::BYPASS
        } else {
            HseMode::CRYSTAL
        }
    }

    /// Mode the HSE was last started in, [HseMode::CRYSTAL] if it never was.
    pub fn get_configured_mode(&self) -> HseMode {
        self.mode.get()
    }

    /// Get the frequency in Hz of the HSE clock.
    ///
    /// # Returns
    ///
    /// + [Some]\(frequency_hz\): if the HSE clock is ready and its frequency was declared.
    /// + [None]: otherwise.
    pub fn get_frequency_hz(&self) -> Option<u32> {
        if self.is_ready() {
            self.hse_frequency_hz.get()
        } else {
            None
        }
    }

    /// Declare the frequency in Hz of the crystal or clock signal.
    pub fn set_frequency_hz(&self, frequency: u32) {
        self.hse_frequency_hz.set(Some(frequency));
    }
}

/// Tests for the HSE clock
///
/// This module ensures that the HSE clock works as expected. If changes are brought to the HSE
/// clock, ensure to run all the tests to see if anything is broken.
///
/// # Usage
///
/// ```rust,ignore
/// use ch32v003::clocks::hse;
///
/// hse::tests::run(&peripherals.clocks.hse, HseMode::CRYSTAL, 24_000_000);
/// ```
///
/// If everything works as expected, the following message should be printed on the kernel console:
///
/// ```text
/// ===============================================
/// Testing HSE...
/// Finished testing HSE. Everything is alright!
/// ===============================================
/// ```
///
/// **NOTE:** The board must have an HSE fitted, and it must not drive the system clock.
pub mod tests {
    use super::*;

    use kernel::debug;

    /// Run the entire test suite.
    pub fn run<P: Poll>(hse: &Hse<P>, mode: HseMode, frequency_hz: u32) {
        debug!("");
        debug!("===============================================");
        debug!("Testing HSE...");

        // By default, the HSE clock is disabled
        assert!(!hse.is_enabled());
        assert_eq!(None, hse.get_frequency_hz());

        hse.set_frequency_hz(frequency_hz);
        assert_eq!(Ok(()), hse.enable(mode));
        assert_eq!(mode, hse.get_mode());
        assert_eq!(Some(frequency_hz), hse.get_frequency_hz());

        // Nothing should happen if the HSE clock is being enabled when already running
        assert_eq!(Ok(()), hse.enable(mode));

        assert_eq!(Ok(()), hse.disable());
        assert!(!hse.is_ready());
        assert_eq!(HseMode::CRYSTAL, hse.get_mode());
        assert_eq!(None, hse.get_frequency_hz());

        debug!("Finished testing HSE. Everything is alright!");
        debug!("===============================================");
        debug!("");
    }
}
