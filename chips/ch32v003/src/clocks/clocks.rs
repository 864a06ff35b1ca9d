// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! CH32V003 clock driver
//!
//! This module ties the HSI, HSE and PLL drivers together and controls the
//! system clock switch, the AHB prescaler, the clock output and the
//! peripheral clock gates.
//!
//! # Features
//!
//! - [x] Dynamic system source
//! - [x] AHB prescaler configuration
//! - [x] Support for MCO
//! - [x] Peripheral clock gating and reset
//!
//! # Limitations
//!
//! - [ ] No clock security system
//! - [ ] No ADC prescaler configuration
//!
//! # Usage [^usage_note]
//!
//! A reference to the [crate::clocks::Clocks] is needed:
//!
//! ```rust,ignore
//! let clocks = &peripherals.clocks;
//! ```
//!
//! ## Retrieve the system clock source and frequency
//!
//! ```rust,ignore
//! let sys_source = clocks.get_sys_clock_source();
//! let sys_frequency = clocks.get_sys_clock_frequency_hz();
//! debug!("System clock: {:?} at {:?}Hz", sys_source, sys_frequency);
//! ```
//!
//! ## Change the system clock source to PLL
//!
//! The PLL is started from the HSI, giving a 48MHz system clock:
//!
//! ```rust,ignore
//! clocks.set_sys_clock_source(ClockSource::PLL);
//! ```
//!
//! To run the PLL from the HSE instead:
//!
//! ```rust,ignore
//! clocks.hse.set_frequency_hz(24_000_000);
//! clocks.hse.enable(HseMode::CRYSTAL);
//! clocks.switch_to_pll(PllSource::HSE);
//! ```
//!
//! ## Set the AHB prescaler
//!
//! ```rust,ignore
//! clocks.set_ahb_prescaler(AHBPrescaler::DivideBy4);
//! // or, from a plain divider
//! clocks.set_ahb_divider(4);
//! ```
//!
//! [^usage_note]: For the purpose of brevity, any error checking has been removed.

use crate::clocks::hse::Hse;
use crate::clocks::hsi::Hsi;
use crate::clocks::phclk::PeripheralClockType;
use crate::clocks::pll::Pll;
use crate::config::CONFIG;
use crate::rcc::AHBPrescaler;
use crate::rcc::ClockSource;
use crate::rcc::MCOSource;
use crate::rcc::PllSource;
use crate::rcc::Rcc;

use kernel::debug;
use kernel::utilities::poll::Poll;
use kernel::ErrorCode;

/// Main struct for configuring on-board clocks.
pub struct Clocks<'a, P> {
    rcc: &'a Rcc,
    poller: &'a P,
    /// High speed internal clock
    pub hsi: Hsi<'a, P>,
    /// High speed external clock
    pub hse: Hse<'a, P>,
    /// Phase-locked loop clock
    pub pll: Pll<'a, P>,
}

impl<'a, P: Poll> Clocks<'a, P> {
    // The constructor must be called when the default peripherals are created
    pub fn new(rcc: &'a Rcc, poller: &'a P) -> Self {
        Self {
            rcc,
            poller,
            hsi: Hsi::new(rcc, poller),
            hse: Hse::new(rcc, poller),
            pll: Pll::new(rcc, poller),
        }
    }

    /// Start a clock source and wait until it is ready.
    ///
    /// The HSE is started in the mode it was last started in. The PLL is restarted with the source
    /// currently programmed in its source selector.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the source did not become ready within the poll budget.
    pub fn enable_source(&self, source: ClockSource) -> Result<(), ErrorCode> {
        match source {
            ClockSource::HSI => self.hsi.enable(),
            ClockSource::HSE => self.hse.enable(self.hse.get_configured_mode()),
            ClockSource::PLL => self.pll.enable(self.pll.get_source()),
        }
    }

    /// Stop a clock source.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the source did not stop within the poll budget, which is the
    /// case for the source driving the system clock.
    pub fn disable_source(&self, source: ClockSource) -> Result<(), ErrorCode> {
        match source {
            ClockSource::HSI => self.hsi.disable(),
            ClockSource::HSE => self.hse.disable(),
            ClockSource::PLL => self.pll.disable(),
        }
    }

    fn is_source_ready(&self, source: ClockSource) -> bool {
        match source {
            ClockSource::HSI => self.hsi.is_ready(),
            ClockSource::HSE => self.hse.is_ready(),
            ClockSource::PLL => self.pll.is_ready(),
        }
    }

    /// Set the system clock source
    ///
    /// The source is started first and the switch only happens once it is ready. The PLL is
    /// always fed from the HSI on this path; use [Clocks::switch_to_pll] to pick its input.
    ///
    /// Selecting the source that already drives the system clock does nothing, except for a PLL
    /// fed from the HSE, which is moved back to the HSI.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the source did not become ready, or the switch status did
    /// not follow, within the poll budget.
    pub fn set_sys_clock_source(&self, source: ClockSource) -> Result<(), ErrorCode> {
        match source {
            ClockSource::PLL => return self.switch_to_pll(PllSource::HSI),
            _ if self.is_active_and_ready(source) => return Ok(()),
            ClockSource::HSI => self.hsi.enable()?,
            ClockSource::HSE => self.hse.enable(self.hse.get_configured_mode())?,
        }

        self.switch(source)
    }

    /// Set the system clock source from a raw selector (0 HSI, 1 HSE, 2 PLL).
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::FAIL]\): the selector names no clock source. Nothing is written.
    /// + [Err]\([ErrorCode::BUSY]\): as for [Clocks::set_sys_clock_source].
    pub fn select_sys_clock(&self, selector: usize) -> Result<(), ErrorCode> {
        self.set_sys_clock_source(ClockSource::try_from(selector)?)
    }

    /// Run the system clock from the PLL, fed by `source`.
    ///
    /// The PLL input is started first. If the PLL already drives the system clock it is moved to
    /// the HSI while the PLL is reconfigured.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): the PLL input, the PLL or the switch did not settle within
    /// the poll budget.
    pub fn switch_to_pll(&self, source: PllSource) -> Result<(), ErrorCode> {
        if self.is_active_and_ready(ClockSource::PLL) {
            if self.pll.get_source() == source {
                return Ok(());
            }
            self.set_sys_clock_source(ClockSource::HSI)?;
        }

        match source {
            PllSource::HSI => self.hsi.enable()?,
            PllSource::HSE => self.hse.enable(self.hse.get_configured_mode())?,
        }
        self.pll.enable(source)?;

        self.switch(ClockSource::PLL)
    }

    fn is_active_and_ready(&self, source: ClockSource) -> bool {
        self.get_sys_clock_source() == Some(source) && self.is_source_ready(source)
    }

    // The source must be ready
    fn switch(&self, source: ClockSource) -> Result<(), ErrorCode> {
        self.rcc.set_sys_clock_source(source);
        let result = self
            .poller
            .poll(&mut || self.rcc.get_sys_clock_source() == Some(source));

        if CONFIG.trace_clocks {
            debug!("[RCC] system clock switch to {:?}: {:?}", source, result);
        }

        result
    }

    /// Get the current system clock source, as reported by the switch status
    ///
    /// # Returns
    ///
    /// + [Some]\(source\): the source driving the system clock.
    /// + [None]: the switch status holds the reserved encoding.
    pub fn get_sys_clock_source(&self) -> Option<ClockSource> {
        self.rcc.get_sys_clock_source()
    }

    /// Get the current system clock frequency in Hz
    ///
    /// [None] when the frequency of the active source is unknown.
    pub fn get_sys_clock_frequency_hz(&self) -> Option<u32> {
        match self.get_sys_clock_source()? {
            ClockSource::HSI => self.hsi.get_frequency_hz(),
            ClockSource::HSE => self.hse.get_frequency_hz(),
            ClockSource::PLL => self.get_pll_frequency_hz(),
        }
    }

    /// Get the PLL output frequency in Hz
    pub fn get_pll_frequency_hz(&self) -> Option<u32> {
        let source_frequency_hz = match self.pll.get_source() {
            PllSource::HSI => self.hsi.get_frequency_hz()?,
            PllSource::HSE => self.hse.get_frequency_hz()?,
        };
        self.pll.get_frequency_hz(source_frequency_hz)
    }

    /// Set the AHB prescaler
    ///
    /// The AHB bus, the core and both APB buses run at the system clock frequency divided by the
    /// AHB prescaler. The new divider applies immediately.
    pub fn set_ahb_prescaler(&self, prescaler: AHBPrescaler) -> Result<(), ErrorCode> {
        self.rcc.set_ahb_prescaler(prescaler);

        if CONFIG.trace_clocks {
            debug!("[RCC] AHB prescaler set to {:?}", prescaler);
        }

        Ok(())
    }

    /// Set the AHB prescaler from a plain divider.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::FAIL]\): `divider` is not one of 1, 2, 4, 8, 16, 64, 128, 256 or 512.
    /// The prescaler is left unchanged.
    pub fn set_ahb_divider(&self, divider: usize) -> Result<(), ErrorCode> {
        self.set_ahb_prescaler(AHBPrescaler::try_from(divider)?)
    }

    /// Get the current configured AHB prescaler
    pub fn get_ahb_prescaler(&self) -> AHBPrescaler {
        self.rcc.get_ahb_prescaler()
    }

    /// Get the frequency of the AHB in Hz
    pub fn get_ahb_frequency_hz(&self) -> Option<u32> {
        let divider: usize = self.get_ahb_prescaler().into();
        Some(self.get_sys_clock_frequency_hz()? / divider as u32)
    }

    /// Route a clock to the MCO pin.
    ///
    /// PC4 must also be configured as an alternate function output for the clock to appear on
    /// the pin.
    pub fn set_mco_clock_source(&self, source: MCOSource) -> Result<(), ErrorCode> {
        self.rcc.set_mco_clock_source(source);
        Ok(())
    }

    /// Get the clock routed to the MCO pin
    pub fn get_mco_clock_source(&self) -> MCOSource {
        self.rcc.get_mco_clock_source()
    }

    /// Enable the clock of a peripheral.
    ///
    /// The peripheral registers should be configured only after this call.
    pub fn enable_peripheral_clock(&self, clock: PeripheralClockType) -> Result<(), ErrorCode> {
        self.rcc.enable_peripheral_clock(clock);
        Ok(())
    }

    /// Gate the clock of a peripheral.
    pub fn disable_peripheral_clock(&self, clock: PeripheralClockType) -> Result<(), ErrorCode> {
        self.rcc.disable_peripheral_clock(clock);
        Ok(())
    }

    /// Put a peripheral in reset.
    ///
    /// The peripheral stays in reset until [Clocks::release_peripheral_reset] is called. DMA1 and
    /// SRAM have no reset line and are left untouched.
    pub fn reset_peripheral(&self, clock: PeripheralClockType) -> Result<(), ErrorCode> {
        self.rcc.assert_peripheral_reset(clock);
        Ok(())
    }

    /// Let a peripheral out of reset.
    pub fn release_peripheral_reset(&self, clock: PeripheralClockType) -> Result<(), ErrorCode> {
        self.rcc.release_peripheral_reset(clock);
        Ok(())
    }
}

/// Ch32v003Clocks trait
///
/// This can be used to control clocks without the need to keep a reference of the generic
/// Clocks struct, for instance by peripherals
pub trait Ch32v003Clocks {
    /// Get RCC instance
    fn get_rcc(&self) -> &Rcc;

    /// Get current AHB clock (HCLK) frequency in Hz
    fn get_ahb_frequency_hz(&self) -> Option<u32>;
}

impl<'a, P: Poll> Ch32v003Clocks for Clocks<'a, P> {
    fn get_rcc(&self) -> &Rcc {
        self.rcc
    }

    fn get_ahb_frequency_hz(&self) -> Option<u32> {
        Clocks::get_ahb_frequency_hz(self)
    }
}

/// Tests for clocks functionalities
///
/// These tests ensure the clocks are properly working. If any changes are made to the clock
/// module, make sure to run these tests.
///
/// # Usage
///
/// First, import the [crate::clocks] module inside the board main file:
///
/// ```rust,ignore
/// use ch32v003::clocks;
/// ```
///
/// To run all the available tests, add this line once the debug writer is registered:
///
/// ```rust,ignore
/// clocks::tests::run_all(&peripherals.clocks);
/// ```
///
/// If everything works as expected, the following message should be printed on the kernel console:
///
/// ```text
/// ===============================================
/// Testing clocks...
/// ...
/// Finished testing clocks. Everything is alright!
/// ===============================================
/// ```
///
/// The suite leaves the chip on the reset clock tree: HSI system clock, undivided AHB and no
/// clock output.
pub mod tests {
    use super::*;

    use crate::clocks::hsi::HSI_FREQUENCY_HZ;

    fn set_default_configuration<P: Poll>(clocks: &Clocks<P>) {
        assert_eq!(Ok(()), clocks.set_sys_clock_source(ClockSource::HSI));
        assert_eq!(Ok(()), clocks.pll.disable());
        assert_eq!(Ok(()), clocks.set_ahb_prescaler(AHBPrescaler::DivideBy1));
        assert_eq!(Ok(()), clocks.set_mco_clock_source(MCOSource::Disabled));
        assert_eq!(Some(HSI_FREQUENCY_HZ), clocks.get_sys_clock_frequency_hz());
    }

    // Go back to the default configuration before failing, so the console keeps working
    macro_rules! check_and_panic {
        ($left:expr, $right:expr, $clocks: ident) => {
            match (&$left, &$right) {
                (left_val, right_val) => {
                    if *left_val != *right_val {
                        set_default_configuration($clocks);
                        assert_eq!($left, $right);
                    }
                }
            };
        };
    }

    /// Test for the AHB prescaler
    pub fn test_prescalers<P: Poll>(clocks: &Clocks<P>) {
        debug!("");
        debug!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        debug!("Testing prescalers...");

        for divider in [2, 4, 8, 16, 64, 128, 256, 512, 1] {
            check_and_panic!(Ok(()), clocks.set_ahb_divider(divider), clocks);
            check_and_panic!(divider, usize::from(clocks.get_ahb_prescaler()), clocks);
            check_and_panic!(
                Some(HSI_FREQUENCY_HZ / divider as u32),
                clocks.get_ahb_frequency_hz(),
                clocks
            );
        }

        // 3 and 32 have no hardware setting; the prescaler must not move
        check_and_panic!(Ok(()), clocks.set_ahb_prescaler(AHBPrescaler::DivideBy4), clocks);
        check_and_panic!(Err(ErrorCode::FAIL), clocks.set_ahb_divider(3), clocks);
        check_and_panic!(Err(ErrorCode::FAIL), clocks.set_ahb_divider(32), clocks);
        check_and_panic!(AHBPrescaler::DivideBy4, clocks.get_ahb_prescaler(), clocks);

        set_default_configuration(clocks);

        debug!("Finished testing prescalers.");
        debug!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
    }

    /// Test for the system clock switch
    pub fn test_sys_clock_switch<P: Poll>(clocks: &Clocks<P>) {
        debug!("");
        debug!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        debug!("Testing system clock switch...");

        check_and_panic!(Ok(()), clocks.set_sys_clock_source(ClockSource::PLL), clocks);
        check_and_panic!(Some(ClockSource::PLL), clocks.get_sys_clock_source(), clocks);
        check_and_panic!(PllSource::HSI, clocks.pll.get_source(), clocks);
        check_and_panic!(
            Some(HSI_FREQUENCY_HZ * 2),
            clocks.get_sys_clock_frequency_hz(),
            clocks
        );

        // Selecting the active source again is a no-op
        check_and_panic!(Ok(()), clocks.set_sys_clock_source(ClockSource::PLL), clocks);

        // Out of range selectors are refused without touching the switch
        check_and_panic!(Err(ErrorCode::FAIL), clocks.select_sys_clock(3), clocks);
        check_and_panic!(Some(ClockSource::PLL), clocks.get_sys_clock_source(), clocks);

        check_and_panic!(Ok(()), clocks.select_sys_clock(0), clocks);
        check_and_panic!(Some(ClockSource::HSI), clocks.get_sys_clock_source(), clocks);
        check_and_panic!(Ok(()), clocks.disable_source(ClockSource::PLL), clocks);
        check_and_panic!(None, clocks.get_pll_frequency_hz(), clocks);

        set_default_configuration(clocks);

        debug!("Finished testing system clock switch.");
        debug!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
    }

    /// Test for the clock output selector
    pub fn test_mco<P: Poll>(clocks: &Clocks<P>) {
        debug!("");
        debug!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        debug!("Testing MCO...");

        for source in [
            MCOSource::SYSCLK,
            MCOSource::HSI,
            MCOSource::HSE,
            MCOSource::PLL,
            MCOSource::Disabled,
        ] {
            check_and_panic!(Ok(()), clocks.set_mco_clock_source(source), clocks);
            check_and_panic!(source, clocks.get_mco_clock_source(), clocks);
        }

        debug!("Finished testing MCO.");
        debug!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
    }

    /// Run the entire test suite for all clocks
    pub fn run_all<P: Poll>(clocks: &Clocks<P>) {
        debug!("");
        debug!("===============================================");
        debug!("Testing clocks...");

        set_default_configuration(clocks);
        crate::clocks::pll::tests::run(&clocks.pll);
        test_prescalers(clocks);
        test_sys_clock_switch(clocks);
        test_mco(clocks);

        debug!("Finished testing clocks. Everything is alright!");
        debug!("===============================================");
    }
}
