// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Chip peripherals setup.

use crate::clocks::Clocks;
use crate::config::{ClockConfig, CONFIG};
use crate::rcc::{ClockSource, PllSource, Rcc};
use crate::reset_cause::ResetStatus;

use kernel::debug;
use kernel::utilities::poll::Poll;
use kernel::ErrorCode;

pub struct Ch32v003DefaultPeripherals<'a, P> {
    pub clocks: Clocks<'a, P>,
    pub reset_status: ResetStatus<'a>,
}

impl<'a, P: Poll> Ch32v003DefaultPeripherals<'a, P> {
    pub fn new(rcc: &'a Rcc, poller: &'a P) -> Self {
        Self {
            clocks: Clocks::new(rcc, poller),
            reset_status: ResetStatus::new(rcc),
        }
    }

    /// Bring the clock tree up as described by `config`.
    ///
    /// The source is started and selected first, then the AHB prescaler, the clock output and
    /// the peripheral clocks are set, in that order. The first error is returned and the
    /// remaining steps are skipped. No peripheral runs reliably on an unconfirmed clock, so the
    /// board should halt on any error.
    pub fn init_clocks(&self, config: &ClockConfig) -> Result<(), ErrorCode> {
        let clocks = &self.clocks;

        if let Some(frequency_hz) = config.hse_frequency_hz {
            clocks.hse.set_frequency_hz(frequency_hz);
        }

        match config.system_clock {
            ClockSource::HSI => {
                clocks.hsi.enable()?;
                clocks.set_sys_clock_source(ClockSource::HSI)?;
            }
            ClockSource::HSE => {
                clocks.hse.enable(config.hse_mode)?;
                clocks.set_sys_clock_source(ClockSource::HSE)?;
            }
            ClockSource::PLL => {
                if config.pll_source == PllSource::HSE {
                    clocks.hse.enable(config.hse_mode)?;
                }
                clocks.switch_to_pll(config.pll_source)?;
            }
        }

        clocks.set_ahb_prescaler(config.ahb_prescaler)?;
        clocks.set_mco_clock_source(config.mco_source)?;
        for &peripheral in config.peripherals {
            clocks.enable_peripheral_clock(peripheral)?;
        }

        if CONFIG.trace_clocks {
            debug!(
                "[RCC] clocks up: {:?} at {:?}Hz, AHB at {:?}Hz",
                clocks.get_sys_clock_source(),
                clocks.get_sys_clock_frequency_hz(),
                clocks.get_ahb_frequency_hz()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Ch32v003DefaultPeripherals;
    use crate::clocks::phclk::{PeripheralClockType, HCLK, PCLK1};
    use crate::config::{ClockConfig, POLL_ATTEMPTS};
    use crate::rcc::{AHBPrescaler, ClockSource, HseMode, MCOSource, PllSource};
    use crate::reset_cause::ResetCause;
    use crate::testing::offsets::{AHBPCENR, APB1PCENR, APB2PCENR, CFGR0, CTLR, RSTSCKR};
    use crate::testing::{FakeRcc, SimulatedHardware};
    use kernel::utilities::poll::BoundedPoll;
    use kernel::ErrorCode;

    #[test]
    fn default_configuration_matches_the_reset_clock_tree() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        let hardware = SimulatedHardware::powered_on(fake, 16);
        let peripherals = Ch32v003DefaultPeripherals::new(&rcc, &hardware);

        assert_eq!(peripherals.init_clocks(&ClockConfig::DEFAULT), Ok(()));
        assert_eq!(
            peripherals.clocks.get_sys_clock_source(),
            Some(ClockSource::HSI)
        );
        assert_eq!(fake.read(CFGR0), 0);
        assert_eq!(fake.read(APB2PCENR), (1 << 2) | (1 << 0));
        assert_eq!(peripherals.clocks.get_ahb_frequency_hz(), Some(24_000_000));
    }

    #[test]
    fn pll_from_hse_with_divided_bus() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        let hardware = SimulatedHardware::powered_on(fake, 16);
        let peripherals = Ch32v003DefaultPeripherals::new(&rcc, &hardware);

        let config = ClockConfig {
            system_clock: ClockSource::PLL,
            pll_source: PllSource::HSE,
            hse_mode: HseMode::BYPASS,
            hse_frequency_hz: Some(16_000_000),
            ahb_prescaler: AHBPrescaler::DivideBy2,
            mco_source: MCOSource::SYSCLK,
            peripherals: &[
                PeripheralClockType::AHB(HCLK::DMA1),
                PeripheralClockType::APB1(PCLK1::TIM2),
            ],
        };
        assert_eq!(peripherals.init_clocks(&config), Ok(()));

        let clocks = &peripherals.clocks;
        assert_eq!(clocks.get_sys_clock_source(), Some(ClockSource::PLL));
        assert_eq!(clocks.pll.get_source(), PllSource::HSE);
        assert_eq!(clocks.hse.get_mode(), HseMode::BYPASS);
        assert_eq!(clocks.get_sys_clock_frequency_hz(), Some(32_000_000));
        assert_eq!(clocks.get_ahb_frequency_hz(), Some(16_000_000));
        assert_eq!(clocks.get_mco_clock_source(), MCOSource::SYSCLK);
        assert_eq!(fake.read(AHBPCENR), 1 << 0);
        assert_eq!(fake.read(APB1PCENR), 1 << 0);
    }

    #[test]
    fn bring_up_stops_at_the_first_error() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        let hardware = SimulatedHardware::powered_on(fake, 16);
        hardware.stall_source(1);
        let peripherals = Ch32v003DefaultPeripherals::new(&rcc, &hardware);

        let config = ClockConfig {
            system_clock: ClockSource::HSE,
            hse_frequency_hz: Some(8_000_000),
            ahb_prescaler: AHBPrescaler::DivideBy4,
            ..ClockConfig::DEFAULT
        };
        assert_eq!(peripherals.init_clocks(&config), Err(ErrorCode::BUSY));
        assert_eq!(fake.read(CFGR0), 0);
        assert_eq!(fake.read(APB2PCENR), 0);
        assert_eq!(
            peripherals.clocks.get_sys_clock_source(),
            Some(ClockSource::HSI)
        );
    }

    #[test]
    fn reset_status_shares_the_rcc() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        let hardware = SimulatedHardware::powered_on(fake, 16);
        fake.write(RSTSCKR, 1 << 29);
        let peripherals = Ch32v003DefaultPeripherals::new(&rcc, &hardware);

        assert_eq!(
            peripherals.reset_status.cause(),
            ResetCause::IndependentWatchdog
        );
        assert_eq!(peripherals.reset_status.clear(), Ok(()));
        assert_eq!(fake.read(RSTSCKR) & (1 << 24), 1 << 24);
    }

    #[test]
    fn bounded_poll_on_a_running_hsi() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        fake.write(CTLR, 0b11);
        let poller = BoundedPoll::new(POLL_ATTEMPTS);
        let peripherals = Ch32v003DefaultPeripherals::new(&rcc, &poller);

        assert_eq!(peripherals.init_clocks(&ClockConfig::DEFAULT), Ok(()));

        // Nothing flips HSERDY on plain memory
        let config = ClockConfig {
            system_clock: ClockSource::HSE,
            ..ClockConfig::DEFAULT
        };
        assert_eq!(peripherals.init_clocks(&config), Err(ErrorCode::BUSY));
        assert_eq!(
            peripherals.clocks.get_sys_clock_source(),
            Some(ClockSource::HSI)
        );
    }
}
