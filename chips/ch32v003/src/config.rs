// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Compile-time configuration of the CH32V003 chip crate.
//!
//! Cargo features are only read here and folded into the [CONFIG] constant,
//! so every configuration path is type-checked whether the feature is enabled
//! or not. Boards describe the clock tree they want with a [ClockConfig] and
//! pass it to [crate::chip::Ch32v003DefaultPeripherals::init_clocks].

use crate::clocks::phclk::{PeripheralClockType, PCLK2};
use crate::rcc::{AHBPrescaler, ClockSource, HseMode, MCOSource, PllSource};

/// Data structure holding compile-time configuration options.
pub(crate) struct Config {
    /// Whether the clock drivers should trace source switches and bring-up
    /// steps to the debug output.
    pub(crate) trace_clocks: bool,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined.
pub(crate) const CONFIG: Config = Config {
    trace_clocks: cfg!(feature = "trace_clocks"),
};

/// Number of times a status flag is checked before an operation gives up with
/// `BUSY`. Far above the worst case oscillator start-up time at any core
/// frequency.
pub const POLL_ATTEMPTS: usize = 0xFFFF;

/// Clock tree set up at boot.
#[derive(Clone, Copy, Debug)]
pub struct ClockConfig {
    /// Source driving the system clock
    pub system_clock: ClockSource,
    /// PLL input, used when `system_clock` is the PLL
    pub pll_source: PllSource,
    /// How the HSE is connected, used when the HSE is started
    pub hse_mode: HseMode,
    /// Frequency of the crystal or external clock, if one is fitted
    pub hse_frequency_hz: Option<u32>,
    pub ahb_prescaler: AHBPrescaler,
    /// Clock routed to the MCO pin (PC4)
    pub mco_source: MCOSource,
    /// Peripherals clocked at the end of bring-up, in order
    pub peripherals: &'static [PeripheralClockType],
}

impl ClockConfig {
    /// Reset clock tree: 24MHz HSI, undivided AHB, GPIOA and AFIO clocked, no
    /// clock output.
    pub const DEFAULT: ClockConfig = ClockConfig {
        system_clock: ClockSource::HSI,
        pll_source: PllSource::HSI,
        hse_mode: HseMode::CRYSTAL,
        hse_frequency_hz: None,
        ahb_prescaler: AHBPrescaler::DivideBy1,
        mco_source: MCOSource::Disabled,
        peripherals: &[
            PeripheralClockType::APB2(PCLK2::IOPA),
            PeripheralClockType::APB2(PCLK2::AFIO),
        ],
    };
}
