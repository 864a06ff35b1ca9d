// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral clock gates and reset lines.
//!
//! Every peripheral sits on exactly one bus and owns one bit in that bus'
//! clock enable register and, for APB peripherals, one bit in the matching
//! reset register. A [PeripheralClock] is handed to the peripheral driver so
//! it can gate its own clock through [ClockInterface] without knowing about
//! the RCC.
//!
//! ```rust,ignore
//! let gpioc_clock = PeripheralClock::new(
//!     PeripheralClockType::APB2(PCLK2::IOPC),
//!     &peripherals.clocks,
//! );
//! gpioc_clock.enable();
//! ```

use crate::clocks::Ch32v003Clocks;

use kernel::platform::ClockInterface;
use kernel::ErrorCode;

pub struct PeripheralClock<'a> {
    pub clock: PeripheralClockType,
    clocks: &'a dyn Ch32v003Clocks,
}

/// Bus + Clock name for the peripherals
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PeripheralClockType {
    AHB(HCLK),
    APB2(PCLK2),
    APB1(PCLK1),
}

/// Peripherals clocked by HCLK
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum HCLK {
    DMA1,
    SRAM,
}

/// Peripherals clocked by PCLK2
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PCLK2 {
    AFIO,
    IOPA,
    IOPC,
    IOPD,
    ADC1,
    TIM1,
    SPI1,
    USART1,
}

/// Peripherals clocked by PCLK1
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PCLK1 {
    TIM2,
    WWDG,
    I2C1,
    PWR,
}

impl<'a> PeripheralClock<'a> {
    pub const fn new(clock: PeripheralClockType, clocks: &'a dyn Ch32v003Clocks) -> Self {
        Self { clock, clocks }
    }

    /// Frequency in Hz of the bus clocking this peripheral.
    ///
    /// Both APB buses run at the AHB frequency on this chip.
    pub fn get_frequency_hz(&self) -> Option<u32> {
        self.clocks.get_ahb_frequency_hz()
    }

    /// Put the peripheral in reset.
    ///
    /// The reset bit is cleared then set, and stays set: the peripheral is
    /// held in reset until [PeripheralClock::release_reset] is called. DMA1
    /// and SRAM have no reset line, so this does nothing for them.
    pub fn reset(&self) -> Result<(), ErrorCode> {
        self.clocks.get_rcc().assert_peripheral_reset(self.clock);
        Ok(())
    }

    /// Let the peripheral out of reset.
    pub fn release_reset(&self) -> Result<(), ErrorCode> {
        self.clocks.get_rcc().release_peripheral_reset(self.clock);
        Ok(())
    }

    pub fn is_in_reset(&self) -> bool {
        self.clocks.get_rcc().is_peripheral_in_reset(self.clock)
    }
}

impl ClockInterface for PeripheralClock<'_> {
    fn is_enabled(&self) -> bool {
        self.clocks.get_rcc().is_enabled_peripheral_clock(self.clock)
    }

    fn enable(&self) {
        self.clocks.get_rcc().enable_peripheral_clock(self.clock);
    }

    fn disable(&self) {
        self.clocks.get_rcc().disable_peripheral_clock(self.clock);
    }
}
