// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! HSI (high-speed internal) clock driver for the CH32V003.
//!
//! The HSI is a factory-trimmed 24MHz RC oscillator. It runs and drives the
//! system clock out of reset.
//!
//! # Usage
//!
//! For the purposes of brevity, any error checking has been removed. In real applications, always
//! check the return values of the [Hsi] methods.
//!
//! First, get a reference to the [Hsi] struct:
//! ```rust,ignore
//! let hsi = &peripherals.clocks.hsi;
//! ```
//!
//! ## Start the clock
//!
//! ```rust,ignore
//! hsi.enable();
//! ```
//!
//! ## Stop the clock
//!
//! ```rust,ignore
//! hsi.disable();
//! ```
//!
//! ## Get the frequency of the clock
//! ```rust,ignore
//! let hsi_frequency_hz = hsi.get_frequency_hz().unwrap();
//! ```

use crate::rcc::Rcc;

use kernel::utilities::poll::Poll;
use kernel::ErrorCode;

/// HSI frequency in Hz
pub const HSI_FREQUENCY_HZ: u32 = 24_000_000;

/// Main HSI clock structure
pub struct Hsi<'a, P> {
    rcc: &'a Rcc,
    poller: &'a P,
}

impl<'a, P: Poll> Hsi<'a, P> {
    pub(in crate::clocks) fn new(rcc: &'a Rcc, poller: &'a P) -> Self {
        Self { rcc, poller }
    }

    /// Start the HSI clock and wait for it to stabilize.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the HSI clock did not become ready within the poll
    /// budget. Recall this method to ensure the HSI clock is running.
    pub fn enable(&self) -> Result<(), ErrorCode> {
        self.rcc.enable_hsi_clock();
        self.poller.poll(&mut || self.rcc.is_ready_hsi_clock())
    }

    /// Stop the HSI clock.
    ///
    /// Returns immediately if the clock is not running.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the ready flag did not clear within the poll budget. The
    /// hardware keeps the HSI running while it drives the system clock.
    pub fn disable(&self) -> Result<(), ErrorCode> {
        if !self.rcc.is_ready_hsi_clock() {
            return Ok(());
        }

        self.rcc.disable_hsi_clock();
        self.poller.poll(&mut || !self.rcc.is_ready_hsi_clock())
    }

    /// Check whether the HSI clock is enabled or not.
    pub fn is_enabled(&self) -> bool {
        self.rcc.is_enabled_hsi_clock()
    }

    /// Check whether the HSI oscillator is stable.
    pub fn is_ready(&self) -> bool {
        self.rcc.is_ready_hsi_clock()
    }

    /// Get the frequency in Hz of the HSI clock.
    ///
    /// # Returns
    ///
    /// + [Some]\(frequency_hz\): if the HSI clock is ready.
    /// + [None]: if the HSI clock is stopped.
    pub fn get_frequency_hz(&self) -> Option<u32> {
        if self.is_ready() {
            Some(HSI_FREQUENCY_HZ)
        } else {
            None
        }
    }
}

/// Tests for the HSI clock
///
/// This module ensures that the HSI clock works as expected. If changes are brought to the HSI
/// clock, ensure to run all the tests to see if anything is broken.
///
/// # Usage
///
/// First, import the [crate::clocks::hsi] module in the desired board main file:
///
/// ```rust,ignore
/// use ch32v003::clocks::hsi;
/// ```
///
/// Then, to run the tests, put the following line in the board setup, after the debug writer is
/// registered:
///
/// ```rust,ignore
/// hsi::tests::run(&peripherals.clocks.hsi);
/// ```
///
/// The HSI must not drive the system clock while this runs, since the tests stop it.
pub mod tests {
    use super::*;

    use kernel::debug;

    /// Run the entire test suite.
    pub fn run<P: Poll>(hsi: &Hsi<P>) {
        debug!("");
        debug!("===============================================");
        debug!("Testing HSI...");

        assert_eq!(Ok(()), hsi.enable());
        assert!(hsi.is_enabled());
        assert!(hsi.is_ready());
        assert_eq!(Some(HSI_FREQUENCY_HZ), hsi.get_frequency_hz());

        assert_eq!(Ok(()), hsi.disable());
        assert!(!hsi.is_enabled());
        assert!(!hsi.is_ready());
        assert_eq!(None, hsi.get_frequency_hz());

        // Stopping a stopped clock succeeds straight away
        assert_eq!(Ok(()), hsi.disable());

        assert_eq!(Ok(()), hsi.enable());

        debug!("Finished testing HSI. Everything is alright!");
        debug!("===============================================");
        debug!("");
    }
}
