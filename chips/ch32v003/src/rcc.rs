// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Reset and clock control (RCC) register access.
//!
//! This module owns the only mapping of the RCC block. Everything else in the
//! crate goes through the `pub(crate)` methods of [Rcc], and everything outside
//! the crate goes through the drivers in [crate::clocks] and
//! [crate::reset_cause].

use crate::clocks::phclk::{PeripheralClockType, HCLK, PCLK1, PCLK2};

use kernel::utilities::registers::interfaces::{ReadWriteable, Readable};
use kernel::utilities::registers::{
    register_bitfields, Field, FieldValue, LocalRegisterCopy, ReadWrite,
};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

/// Reset and clock control
#[repr(C)]
pub(crate) struct RccRegisters {
    /// clock control register
    ctlr: ReadWrite<u32, CTLR::Register>,
    /// clock configuration register 0
    cfgr0: ReadWrite<u32, CFGR0::Register>,
    /// clock interrupt register, CSS and ready interrupts are not used
    _intr: ReadWrite<u32>,
    /// APB2 peripheral reset register
    apb2prstr: ReadWrite<u32, APB2PRSTR::Register>,
    /// APB1 peripheral reset register
    apb1prstr: ReadWrite<u32, APB1PRSTR::Register>,
    /// AHB peripheral clock enable register
    ahbpcenr: ReadWrite<u32, AHBPCENR::Register>,
    /// APB2 peripheral clock enable register
    apb2pcenr: ReadWrite<u32, APB2PCENR::Register>,
    /// APB1 peripheral clock enable register
    apb1pcenr: ReadWrite<u32, APB1PCENR::Register>,
    _reserved0: [u8; 4],
    /// control/status register
    rstsckr: ReadWrite<u32, RSTSCKR::Register>,
}

register_bitfields![u32,
    pub(crate) CTLR [
        /// Internal high-speed clock enable
        HSION OFFSET(0) NUMBITS(1) [],
        /// Internal high-speed clock ready flag
        HSIRDY OFFSET(1) NUMBITS(1) [],
        /// Internal high-speed clock trimming
        HSITRIM OFFSET(3) NUMBITS(5) [],
        /// Internal high-speed clock calibration
        HSICAL OFFSET(8) NUMBITS(8) [],
        /// External high-speed clock enable
        HSEON OFFSET(16) NUMBITS(1) [],
        /// External high-speed clock ready flag
        HSERDY OFFSET(17) NUMBITS(1) [],
        /// External high-speed clock bypass
        HSEBYP OFFSET(18) NUMBITS(1) [],
        /// Clock security system enable
        CSSON OFFSET(19) NUMBITS(1) [],
        /// PLL enable
        PLLON OFFSET(24) NUMBITS(1) [],
        /// PLL clock ready flag
        PLLRDY OFFSET(25) NUMBITS(1) []
    ],
    pub(crate) CFGR0 [
        /// System clock switch
        SW OFFSET(0) NUMBITS(2) [
            HSI = 0b00,
            HSE = 0b01,
            PLL = 0b10
        ],
        /// System clock switch status
        SWS OFFSET(2) NUMBITS(2) [
            HSI = 0b00,
            HSE = 0b01,
            PLL = 0b10
        ],
        /// AHB prescaler
        HPRE OFFSET(4) NUMBITS(4) [
            DivideBy1 = 0b0000,
            DivideBy2 = 0b1000,
            DivideBy4 = 0b1001,
            DivideBy8 = 0b1010,
            DivideBy16 = 0b1011,
            DivideBy64 = 0b1100,
            DivideBy128 = 0b1101,
            DivideBy256 = 0b1110,
            DivideBy512 = 0b1111
        ],
        /// ADC prescaler
        ADCPRE OFFSET(11) NUMBITS(5) [],
        /// PLL entry clock source
        PLLSRC OFFSET(16) NUMBITS(1) [
            HSI = 0,
            HSE = 1
        ],
        /// Microcontroller clock output
        MCO OFFSET(24) NUMBITS(3) [
            NoClock = 0b000,
            SYSCLK = 0b100,
            HSI = 0b101,
            HSE = 0b110,
            PLL = 0b111
        ]
    ],
    pub(crate) APB2PRSTR [
        AFIORST OFFSET(0) NUMBITS(1) [],
        IOPARST OFFSET(2) NUMBITS(1) [],
        IOPCRST OFFSET(4) NUMBITS(1) [],
        IOPDRST OFFSET(5) NUMBITS(1) [],
        ADC1RST OFFSET(9) NUMBITS(1) [],
        TIM1RST OFFSET(11) NUMBITS(1) [],
        SPI1RST OFFSET(12) NUMBITS(1) [],
        USART1RST OFFSET(14) NUMBITS(1) []
    ],
    pub(crate) APB1PRSTR [
        TIM2RST OFFSET(0) NUMBITS(1) [],
        WWDGRST OFFSET(11) NUMBITS(1) [],
        I2C1RST OFFSET(21) NUMBITS(1) [],
        PWRRST OFFSET(28) NUMBITS(1) []
    ],
    pub(crate) AHBPCENR [
        DMA1EN OFFSET(0) NUMBITS(1) [],
        SRAMEN OFFSET(2) NUMBITS(1) []
    ],
    pub(crate) APB2PCENR [
        AFIOEN OFFSET(0) NUMBITS(1) [],
        IOPAEN OFFSET(2) NUMBITS(1) [],
        IOPCEN OFFSET(4) NUMBITS(1) [],
        IOPDEN OFFSET(5) NUMBITS(1) [],
        ADC1EN OFFSET(9) NUMBITS(1) [],
        TIM1EN OFFSET(11) NUMBITS(1) [],
        SPI1EN OFFSET(12) NUMBITS(1) [],
        USART1EN OFFSET(14) NUMBITS(1) []
    ],
    pub(crate) APB1PCENR [
        TIM2EN OFFSET(0) NUMBITS(1) [],
        WWDGEN OFFSET(11) NUMBITS(1) [],
        I2C1EN OFFSET(21) NUMBITS(1) [],
        PWREN OFFSET(28) NUMBITS(1) []
    ],
    pub(crate) RSTSCKR [
        /// Internal low-speed clock enable
        LSION OFFSET(0) NUMBITS(1) [],
        /// Internal low-speed clock ready flag
        LSIRDY OFFSET(1) NUMBITS(1) [],
        /// Remove reset flags
        RMVF OFFSET(24) NUMBITS(1) [],
        /// External NRST pin reset flag
        PINRSTF OFFSET(26) NUMBITS(1) [],
        /// Power-on or brown-out reset flag
        PORRSTF OFFSET(27) NUMBITS(1) [],
        /// Software reset flag
        SFTRSTF OFFSET(28) NUMBITS(1) [],
        /// Independent watchdog reset flag
        IWDGRSTF OFFSET(29) NUMBITS(1) [],
        /// Window watchdog reset flag
        WWDGRSTF OFFSET(30) NUMBITS(1) [],
        /// Low-power reset flag
        LPWRRSTF OFFSET(31) NUMBITS(1) []
    ]
];

const RCC_BASE: StaticRef<RccRegisters> =
    unsafe { StaticRef::new(0x4002_1000 as *const RccRegisters) };

/// Snapshot of the control/status register, taken in a single read.
pub(crate) type ResetFlagsRegister = LocalRegisterCopy<u32, RSTSCKR::Register>;

/// Exclusive handle to the RCC block.
pub struct Rcc {
    registers: StaticRef<RccRegisters>,
}

impl Rcc {
    /// Take ownership of the RCC block.
    ///
    /// # Safety
    ///
    /// Must be called at most once. Every driver that touches the RCC borrows
    /// the returned handle, so a second handle would break the single-writer
    /// discipline the read-modify-write sequences rely on.
    pub unsafe fn new() -> Self {
        Self::with_base(RCC_BASE)
    }

    pub(crate) const fn with_base(registers: StaticRef<RccRegisters>) -> Self {
        Self { registers }
    }

    /* HSI clock */

    pub(crate) fn enable_hsi_clock(&self) {
        self.registers.ctlr.modify(CTLR::HSION::SET);
    }

    pub(crate) fn disable_hsi_clock(&self) {
        self.registers.ctlr.modify(CTLR::HSION::CLEAR);
    }

    pub(crate) fn is_enabled_hsi_clock(&self) -> bool {
        self.registers.ctlr.is_set(CTLR::HSION)
    }

    // Indicates whether the HSI oscillator is stable
    pub(crate) fn is_ready_hsi_clock(&self) -> bool {
        self.registers.ctlr.is_set(CTLR::HSIRDY)
    }

    /* HSE clock */

    pub(crate) fn enable_hse_clock(&self) {
        self.registers.ctlr.modify(CTLR::HSEON::SET);
    }

    // HSEBYP may only be written while HSEON is clear
    pub(crate) fn set_hse_clock_bypass(&self, bypass: bool) {
        self.registers.ctlr.modify(CTLR::HSEBYP.val(bypass as u32));
    }

    pub(crate) fn disable_hse_clock(&self) {
        self.registers.ctlr.modify(CTLR::HSEON::CLEAR);
        self.registers.ctlr.modify(CTLR::HSEBYP::CLEAR);
    }

    pub(crate) fn is_enabled_hse_clock(&self) -> bool {
        self.registers.ctlr.is_set(CTLR::HSEON)
    }

    pub(crate) fn is_hse_clock_bypassed(&self) -> bool {
        self.registers.ctlr.is_set(CTLR::HSEBYP)
    }

    // Indicates whether the HSE oscillator is stable
    pub(crate) fn is_ready_hse_clock(&self) -> bool {
        self.registers.ctlr.is_set(CTLR::HSERDY)
    }

    /* PLL clock */

    pub(crate) fn enable_pll_clock(&self) {
        self.registers.ctlr.modify(CTLR::PLLON::SET);
    }

    pub(crate) fn disable_pll_clock(&self) {
        self.registers.ctlr.modify(CTLR::PLLON::CLEAR);
    }

    pub(crate) fn is_enabled_pll_clock(&self) -> bool {
        self.registers.ctlr.is_set(CTLR::PLLON)
    }

    pub(crate) fn is_ready_pll_clock(&self) -> bool {
        self.registers.ctlr.is_set(CTLR::PLLRDY)
    }

    // The PLL must be disabled before its source is changed
    pub(crate) fn set_pll_clock_source(&self, source: PllSource) {
        let value = match source {
            PllSource::HSI => CFGR0::PLLSRC::HSI,
            PllSource::HSE => CFGR0::PLLSRC::HSE,
        };
        self.registers.cfgr0.modify(value);
    }

    pub(crate) fn get_pll_clock_source(&self) -> PllSource {
        match self.registers.cfgr0.read_as_enum(CFGR0::PLLSRC) {
            Some(CFGR0::PLLSRC::Value::HSE) => PllSource::HSE,
            _ => PllSource::HSI,
        }
    }

    /* System clock */

    // The source must be ready before it is selected
    pub(crate) fn set_sys_clock_source(&self, source: ClockSource) {
        self.registers.cfgr0.modify(source.switch_value());
    }

    // SWS follows SW asynchronously, so this is the only trustworthy answer
    pub(crate) fn get_sys_clock_source(&self) -> Option<ClockSource> {
        match self.registers.cfgr0.read_as_enum(CFGR0::SWS) {
            Some(CFGR0::SWS::Value::HSI) => Some(ClockSource::HSI),
            Some(CFGR0::SWS::Value::HSE) => Some(ClockSource::HSE),
            Some(CFGR0::SWS::Value::PLL) => Some(ClockSource::PLL),
            None => None,
        }
    }

    /* AHB prescaler */

    pub(crate) fn set_ahb_prescaler(&self, ahb_prescaler: AHBPrescaler) {
        self.registers.cfgr0.modify(ahb_prescaler.field_value());
    }

    pub(crate) fn get_ahb_prescaler(&self) -> AHBPrescaler {
        match self.registers.cfgr0.read_as_enum(CFGR0::HPRE) {
            Some(CFGR0::HPRE::Value::DivideBy2) => AHBPrescaler::DivideBy2,
            Some(CFGR0::HPRE::Value::DivideBy4) => AHBPrescaler::DivideBy4,
            Some(CFGR0::HPRE::Value::DivideBy8) => AHBPrescaler::DivideBy8,
            Some(CFGR0::HPRE::Value::DivideBy16) => AHBPrescaler::DivideBy16,
            Some(CFGR0::HPRE::Value::DivideBy64) => AHBPrescaler::DivideBy64,
            Some(CFGR0::HPRE::Value::DivideBy128) => AHBPrescaler::DivideBy128,
            Some(CFGR0::HPRE::Value::DivideBy256) => AHBPrescaler::DivideBy256,
            Some(CFGR0::HPRE::Value::DivideBy512) => AHBPrescaler::DivideBy512,
            // 0xxx: SYSCLK not divided
            _ => AHBPrescaler::DivideBy1,
        }
    }

    /* MCO */

    pub(crate) fn set_mco_clock_source(&self, source: MCOSource) {
        self.registers.cfgr0.modify(CFGR0::MCO::NoClock);
        let value = match source {
            MCOSource::Disabled => return,
            MCOSource::SYSCLK => CFGR0::MCO::SYSCLK,
            MCOSource::HSI => CFGR0::MCO::HSI,
            MCOSource::HSE => CFGR0::MCO::HSE,
            MCOSource::PLL => CFGR0::MCO::PLL,
        };
        self.registers.cfgr0.modify(value);
    }

    pub(crate) fn get_mco_clock_source(&self) -> MCOSource {
        match self.registers.cfgr0.read_as_enum(CFGR0::MCO) {
            Some(CFGR0::MCO::Value::SYSCLK) => MCOSource::SYSCLK,
            Some(CFGR0::MCO::Value::HSI) => MCOSource::HSI,
            Some(CFGR0::MCO::Value::HSE) => MCOSource::HSE,
            Some(CFGR0::MCO::Value::PLL) => MCOSource::PLL,
            _ => MCOSource::Disabled,
        }
    }

    /* Peripheral clocks */

    pub(crate) fn enable_peripheral_clock(&self, clock: PeripheralClockType) {
        match clock {
            PeripheralClockType::AHB(peripheral) => {
                let field = peripheral.enable_field();
                self.registers.ahbpcenr.modify(field.val(0));
                self.registers.ahbpcenr.modify(field.val(1));
            }
            PeripheralClockType::APB2(peripheral) => {
                let (_, field) = peripheral.fields();
                self.registers.apb2pcenr.modify(field.val(0));
                self.registers.apb2pcenr.modify(field.val(1));
            }
            PeripheralClockType::APB1(peripheral) => {
                let (_, field) = peripheral.fields();
                self.registers.apb1pcenr.modify(field.val(0));
                self.registers.apb1pcenr.modify(field.val(1));
            }
        }
    }

    pub(crate) fn disable_peripheral_clock(&self, clock: PeripheralClockType) {
        match clock {
            PeripheralClockType::AHB(peripheral) => {
                self.registers.ahbpcenr.modify(peripheral.enable_field().val(0));
            }
            PeripheralClockType::APB2(peripheral) => {
                self.registers.apb2pcenr.modify(peripheral.fields().1.val(0));
            }
            PeripheralClockType::APB1(peripheral) => {
                self.registers.apb1pcenr.modify(peripheral.fields().1.val(0));
            }
        }
    }

    pub(crate) fn is_enabled_peripheral_clock(&self, clock: PeripheralClockType) -> bool {
        match clock {
            PeripheralClockType::AHB(peripheral) => {
                self.registers.ahbpcenr.is_set(peripheral.enable_field())
            }
            PeripheralClockType::APB2(peripheral) => {
                self.registers.apb2pcenr.is_set(peripheral.fields().1)
            }
            PeripheralClockType::APB1(peripheral) => {
                self.registers.apb1pcenr.is_set(peripheral.fields().1)
            }
        }
    }

    // Leaves the reset bit set. AHB peripherals have no reset bit.
    pub(crate) fn assert_peripheral_reset(&self, clock: PeripheralClockType) {
        match clock {
            PeripheralClockType::AHB(_) => {}
            PeripheralClockType::APB2(peripheral) => {
                let (field, _) = peripheral.fields();
                self.registers.apb2prstr.modify(field.val(0));
                self.registers.apb2prstr.modify(field.val(1));
            }
            PeripheralClockType::APB1(peripheral) => {
                let (field, _) = peripheral.fields();
                self.registers.apb1prstr.modify(field.val(0));
                self.registers.apb1prstr.modify(field.val(1));
            }
        }
    }

    pub(crate) fn release_peripheral_reset(&self, clock: PeripheralClockType) {
        match clock {
            PeripheralClockType::AHB(_) => {}
            PeripheralClockType::APB2(peripheral) => {
                self.registers.apb2prstr.modify(peripheral.fields().0.val(0));
            }
            PeripheralClockType::APB1(peripheral) => {
                self.registers.apb1prstr.modify(peripheral.fields().0.val(0));
            }
        }
    }

    pub(crate) fn is_peripheral_in_reset(&self, clock: PeripheralClockType) -> bool {
        match clock {
            PeripheralClockType::AHB(_) => false,
            PeripheralClockType::APB2(peripheral) => {
                self.registers.apb2prstr.is_set(peripheral.fields().0)
            }
            PeripheralClockType::APB1(peripheral) => {
                self.registers.apb1prstr.is_set(peripheral.fields().0)
            }
        }
    }

    /* Reset flags */

    pub(crate) fn read_reset_flags(&self) -> ResetFlagsRegister {
        self.registers.rstsckr.extract()
    }

    // Writing RMVF clears every latched reset flag at once
    pub(crate) fn remove_reset_flags(&self) {
        self.registers.rstsckr.modify(RSTSCKR::RMVF::SET);
    }
}

impl HCLK {
    fn enable_field(self) -> Field<u32, AHBPCENR::Register> {
        match self {
            HCLK::DMA1 => AHBPCENR::DMA1EN,
            HCLK::SRAM => AHBPCENR::SRAMEN,
        }
    }
}

impl PCLK2 {
    // (reset bit, clock enable bit)
    fn fields(self) -> (Field<u32, APB2PRSTR::Register>, Field<u32, APB2PCENR::Register>) {
        match self {
            PCLK2::AFIO => (APB2PRSTR::AFIORST, APB2PCENR::AFIOEN),
            PCLK2::IOPA => (APB2PRSTR::IOPARST, APB2PCENR::IOPAEN),
            PCLK2::IOPC => (APB2PRSTR::IOPCRST, APB2PCENR::IOPCEN),
            PCLK2::IOPD => (APB2PRSTR::IOPDRST, APB2PCENR::IOPDEN),
            PCLK2::ADC1 => (APB2PRSTR::ADC1RST, APB2PCENR::ADC1EN),
            PCLK2::TIM1 => (APB2PRSTR::TIM1RST, APB2PCENR::TIM1EN),
            PCLK2::SPI1 => (APB2PRSTR::SPI1RST, APB2PCENR::SPI1EN),
            PCLK2::USART1 => (APB2PRSTR::USART1RST, APB2PCENR::USART1EN),
        }
    }
}

impl PCLK1 {
    // (reset bit, clock enable bit)
    fn fields(self) -> (Field<u32, APB1PRSTR::Register>, Field<u32, APB1PCENR::Register>) {
        match self {
            PCLK1::TIM2 => (APB1PRSTR::TIM2RST, APB1PCENR::TIM2EN),
            PCLK1::WWDG => (APB1PRSTR::WWDGRST, APB1PCENR::WWDGEN),
            PCLK1::I2C1 => (APB1PRSTR::I2C1RST, APB1PCENR::I2C1EN),
            PCLK1::PWR => (APB1PRSTR::PWRRST, APB1PCENR::PWREN),
        }
    }
}

/// Clock sources that can drive the system clock
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ClockSource {
    HSI,
    HSE,
    PLL,
}

impl ClockSource {
    fn switch_value(self) -> FieldValue<u32, CFGR0::Register> {
        match self {
            ClockSource::HSI => CFGR0::SW::HSI,
            ClockSource::HSE => CFGR0::SW::HSE,
            ClockSource::PLL => CFGR0::SW::PLL,
        }
    }
}

/// Decode a raw system clock selector, as found in board configuration.
///
/// # Errors
///
/// + [Err]\([ErrorCode::FAIL]\): the value is not 0 (HSI), 1 (HSE) or 2 (PLL).
impl TryFrom<usize> for ClockSource {
    type Error = ErrorCode;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ClockSource::HSI),
            1 => Ok(ClockSource::HSE),
            2 => Ok(ClockSource::PLL),
            _ => Err(ErrorCode::FAIL),
        }
    }
}

/// Clock sources for the PLL
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PllSource {
    HSI,
    HSE,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum HseMode {
    /// An external clock signal drives OSC_IN directly
    BYPASS,
    /// A crystal or ceramic resonator sits between OSC_IN and OSC_OUT
    CRYSTAL,
}

/// Sources for the microcontroller clock output on PC4
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum MCOSource {
    Disabled,
    SYSCLK,
    HSI,
    HSE,
    PLL,
}

/// AHB bus clock divider applied to the system clock
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AHBPrescaler {
    DivideBy1,
    DivideBy2,
    DivideBy4,
    DivideBy8,
    DivideBy16,
    DivideBy64,
    DivideBy128,
    DivideBy256,
    DivideBy512,
}

impl AHBPrescaler {
    fn field_value(self) -> FieldValue<u32, CFGR0::Register> {
        match self {
            AHBPrescaler::DivideBy1 => CFGR0::HPRE::DivideBy1,
            AHBPrescaler::DivideBy2 => CFGR0::HPRE::DivideBy2,
            AHBPrescaler::DivideBy4 => CFGR0::HPRE::DivideBy4,
            AHBPrescaler::DivideBy8 => CFGR0::HPRE::DivideBy8,
            AHBPrescaler::DivideBy16 => CFGR0::HPRE::DivideBy16,
            AHBPrescaler::DivideBy64 => CFGR0::HPRE::DivideBy64,
            AHBPrescaler::DivideBy128 => CFGR0::HPRE::DivideBy128,
            AHBPrescaler::DivideBy256 => CFGR0::HPRE::DivideBy256,
            AHBPrescaler::DivideBy512 => CFGR0::HPRE::DivideBy512,
        }
    }
}

impl From<AHBPrescaler> for usize {
    fn from(item: AHBPrescaler) -> Self {
        match item {
            AHBPrescaler::DivideBy1 => 1,
            AHBPrescaler::DivideBy2 => 2,
            AHBPrescaler::DivideBy4 => 4,
            AHBPrescaler::DivideBy8 => 8,
            AHBPrescaler::DivideBy16 => 16,
            AHBPrescaler::DivideBy64 => 64,
            AHBPrescaler::DivideBy128 => 128,
            AHBPrescaler::DivideBy256 => 256,
            AHBPrescaler::DivideBy512 => 512,
        }
    }
}

/// Map a plain divider to its prescaler setting.
///
/// # Errors
///
/// + [Err]\([ErrorCode::FAIL]\): the hardware has no setting for this divider (for example 3
/// or 32).
impl TryFrom<usize> for AHBPrescaler {
    type Error = ErrorCode;

    fn try_from(divider: usize) -> Result<Self, Self::Error> {
        match divider {
            1 => Ok(AHBPrescaler::DivideBy1),
            2 => Ok(AHBPrescaler::DivideBy2),
            4 => Ok(AHBPrescaler::DivideBy4),
            8 => Ok(AHBPrescaler::DivideBy8),
            16 => Ok(AHBPrescaler::DivideBy16),
            64 => Ok(AHBPrescaler::DivideBy64),
            128 => Ok(AHBPrescaler::DivideBy128),
            256 => Ok(AHBPrescaler::DivideBy256),
            512 => Ok(AHBPrescaler::DivideBy512),
            _ => Err(ErrorCode::FAIL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AHBPrescaler, ClockSource, MCOSource, PllSource};
    use crate::clocks::phclk::{PeripheralClockType, HCLK, PCLK1, PCLK2};
    use crate::testing::offsets::{
        AHBPCENR, APB1PCENR, APB1PRSTR, APB2PCENR, APB2PRSTR, CFGR0, CTLR,
    };
    use crate::testing::FakeRcc;
    use kernel::ErrorCode;

    #[test]
    fn control_bits_land_on_their_documented_positions() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();

        rcc.enable_hsi_clock();
        assert_eq!(fake.read(CTLR), 1 << 0);
        rcc.enable_hse_clock();
        rcc.enable_pll_clock();
        assert_eq!(fake.read(CTLR), (1 << 0) | (1 << 16) | (1 << 24));

        rcc.set_hse_clock_bypass(true);
        assert!(rcc.is_hse_clock_bypassed());
        rcc.disable_hse_clock();
        assert_eq!(fake.read(CTLR), (1 << 0) | (1 << 24));

        fake.write(CTLR, (1 << 1) | (1 << 17) | (1 << 25));
        assert!(rcc.is_ready_hsi_clock());
        assert!(rcc.is_ready_hse_clock());
        assert!(rcc.is_ready_pll_clock());
    }

    #[test]
    fn pll_source_uses_the_reference_manual_encoding() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();

        rcc.set_pll_clock_source(PllSource::HSE);
        assert_eq!(fake.read(CFGR0), 1 << 16);
        assert_eq!(rcc.get_pll_clock_source(), PllSource::HSE);

        rcc.set_pll_clock_source(PllSource::HSI);
        assert_eq!(fake.read(CFGR0), 0);
        assert_eq!(rcc.get_pll_clock_source(), PllSource::HSI);
    }

    #[test]
    fn system_clock_status_is_read_from_sws() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();

        rcc.set_sys_clock_source(ClockSource::PLL);
        assert_eq!(fake.read(CFGR0), 0b10);
        // The switch has not completed yet
        assert_eq!(rcc.get_sys_clock_source(), Some(ClockSource::HSI));

        fake.write(CFGR0, 0b10 | (0b10 << 2));
        assert_eq!(rcc.get_sys_clock_source(), Some(ClockSource::PLL));

        fake.write(CFGR0, 0b01 << 2);
        assert_eq!(rcc.get_sys_clock_source(), Some(ClockSource::HSE));

        fake.write(CFGR0, 0b11 << 2);
        assert_eq!(rcc.get_sys_clock_source(), None);
    }

    #[test]
    fn ahb_prescaler_encodings() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();

        let expected = [
            (AHBPrescaler::DivideBy1, 0b0000),
            (AHBPrescaler::DivideBy2, 0b1000),
            (AHBPrescaler::DivideBy4, 0b1001),
            (AHBPrescaler::DivideBy8, 0b1010),
            (AHBPrescaler::DivideBy16, 0b1011),
            (AHBPrescaler::DivideBy64, 0b1100),
            (AHBPrescaler::DivideBy128, 0b1101),
            (AHBPrescaler::DivideBy256, 0b1110),
            (AHBPrescaler::DivideBy512, 0b1111),
        ];
        for (prescaler, code) in expected {
            rcc.set_ahb_prescaler(prescaler);
            assert_eq!((fake.read(CFGR0) >> 4) & 0xF, code);
            assert_eq!(rcc.get_ahb_prescaler(), prescaler);
        }

        // Codes below 0b1000 leave SYSCLK undivided
        fake.write(CFGR0, 0b0101 << 4);
        assert_eq!(rcc.get_ahb_prescaler(), AHBPrescaler::DivideBy1);
    }

    #[test]
    fn divider_table_accepts_only_hardware_settings() {
        for divider in [1, 2, 4, 8, 16, 64, 128, 256, 512] {
            let prescaler = AHBPrescaler::try_from(divider).unwrap();
            assert_eq!(usize::from(prescaler), divider);
        }
        for divider in [0, 3, 5, 32, 1024] {
            assert_eq!(AHBPrescaler::try_from(divider), Err(ErrorCode::FAIL));
        }
    }

    #[test]
    fn raw_selector_outside_the_three_sources_fails() {
        assert_eq!(ClockSource::try_from(0), Ok(ClockSource::HSI));
        assert_eq!(ClockSource::try_from(1), Ok(ClockSource::HSE));
        assert_eq!(ClockSource::try_from(2), Ok(ClockSource::PLL));
        assert_eq!(ClockSource::try_from(3), Err(ErrorCode::FAIL));
    }

    #[test]
    fn mco_field_is_cleared_before_the_new_source() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();

        rcc.set_mco_clock_source(MCOSource::PLL);
        assert_eq!(fake.read(CFGR0), 0b111 << 24);
        rcc.set_mco_clock_source(MCOSource::HSI);
        assert_eq!(fake.read(CFGR0), 0b101 << 24);
        assert_eq!(rcc.get_mco_clock_source(), MCOSource::HSI);
        rcc.set_mco_clock_source(MCOSource::Disabled);
        assert_eq!(fake.read(CFGR0), 0);
        assert_eq!(rcc.get_mco_clock_source(), MCOSource::Disabled);
    }

    #[test]
    fn peripheral_enable_bits() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();

        let apb2 = [
            (PCLK2::AFIO, 0),
            (PCLK2::IOPA, 2),
            (PCLK2::IOPC, 4),
            (PCLK2::IOPD, 5),
            (PCLK2::ADC1, 9),
            (PCLK2::TIM1, 11),
            (PCLK2::SPI1, 12),
            (PCLK2::USART1, 14),
        ];
        for (peripheral, bit) in apb2 {
            fake.write(APB2PCENR, 0);
            rcc.enable_peripheral_clock(PeripheralClockType::APB2(peripheral));
            assert_eq!(fake.read(APB2PCENR), 1 << bit);
        }

        let apb1 = [
            (PCLK1::TIM2, 0),
            (PCLK1::WWDG, 11),
            (PCLK1::I2C1, 21),
            (PCLK1::PWR, 28),
        ];
        for (peripheral, bit) in apb1 {
            fake.write(APB1PCENR, 0);
            rcc.enable_peripheral_clock(PeripheralClockType::APB1(peripheral));
            assert_eq!(fake.read(APB1PCENR), 1 << bit);
        }

        rcc.enable_peripheral_clock(PeripheralClockType::AHB(HCLK::DMA1));
        rcc.enable_peripheral_clock(PeripheralClockType::AHB(HCLK::SRAM));
        assert_eq!(fake.read(AHBPCENR), (1 << 0) | (1 << 2));

        rcc.disable_peripheral_clock(PeripheralClockType::AHB(HCLK::DMA1));
        assert_eq!(fake.read(AHBPCENR), 1 << 2);
    }

    #[test]
    fn peripheral_reset_bits_stay_asserted() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();

        let spi1 = PeripheralClockType::APB2(PCLK2::SPI1);
        rcc.assert_peripheral_reset(spi1);
        assert_eq!(fake.read(APB2PRSTR), 1 << 12);
        assert!(rcc.is_peripheral_in_reset(spi1));
        // Reset leaves the clock gate alone
        assert_eq!(fake.read(APB2PCENR), 0);

        let wwdg = PeripheralClockType::APB1(PCLK1::WWDG);
        rcc.assert_peripheral_reset(wwdg);
        assert_eq!(fake.read(APB1PRSTR), 1 << 11);

        rcc.release_peripheral_reset(spi1);
        assert_eq!(fake.read(APB2PRSTR), 0);
        assert!(!rcc.is_peripheral_in_reset(spi1));
    }
}
