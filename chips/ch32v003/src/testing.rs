// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Host-side stand-ins for the RCC hardware.
//!
//! [FakeRcc] backs an [Rcc] handle with ordinary memory. [SimulatedHardware]
//! is a [Poll] strategy that, on every attempt, moves the status bits the way
//! the silicon would: a ready flag follows its enable bit for every source
//! that is wired up, and SWS follows SW once the selected source is ready.

use crate::rcc::{Rcc, RccRegisters};

use core::cell::Cell;
use kernel::utilities::poll::Poll;
use kernel::utilities::StaticRef;
use kernel::ErrorCode;
use std::boxed::Box;

/// Byte offsets of the RCC registers.
pub(crate) mod offsets {
    pub(crate) const CTLR: usize = 0x00;
    pub(crate) const CFGR0: usize = 0x04;
    pub(crate) const APB2PRSTR: usize = 0x0C;
    pub(crate) const APB1PRSTR: usize = 0x10;
    pub(crate) const AHBPCENR: usize = 0x14;
    pub(crate) const APB2PCENR: usize = 0x18;
    pub(crate) const APB1PCENR: usize = 0x1C;
    pub(crate) const RSTSCKR: usize = 0x24;
}

const RCC_WORDS: usize = 10;

/// In-memory RCC register block.
///
/// The backing words are leaked so every [Rcc] built from it can hold a
/// `'static` reference, just like the MMIO mapping.
#[derive(Clone, Copy)]
pub(crate) struct FakeRcc {
    base: *mut u32,
}

impl FakeRcc {
    pub(crate) fn new() -> Self {
        let words: &'static mut [u32; RCC_WORDS] = Box::leak(Box::new([0; RCC_WORDS]));
        Self {
            base: words.as_mut_ptr(),
        }
    }

    pub(crate) fn rcc(&self) -> Rcc {
        Rcc::with_base(unsafe { StaticRef::new(self.base as *const RccRegisters) })
    }

    pub(crate) fn read(&self, offset: usize) -> u32 {
        assert!(offset % 4 == 0 && offset / 4 < RCC_WORDS);
        unsafe { self.base.add(offset / 4).read_volatile() }
    }

    pub(crate) fn write(&self, offset: usize, value: u32) {
        assert!(offset % 4 == 0 && offset / 4 < RCC_WORDS);
        unsafe { self.base.add(offset / 4).write_volatile(value) }
    }

    /// Snapshot of every register, for "nothing was written" checks.
    pub(crate) fn snapshot(&self) -> [u32; RCC_WORDS] {
        let mut words = [0; RCC_WORDS];
        for (index, word) in words.iter_mut().enumerate() {
            *word = self.read(index * 4);
        }
        words
    }
}

/// (enable bit, ready bit) in CTLR for HSI, HSE and PLL.
const SOURCES: [(u32, u32); 3] = [(0, 1), (16, 17), (24, 25)];

/// Poll strategy that plays the part of the RCC hardware.
pub(crate) struct SimulatedHardware {
    regs: FakeRcc,
    budget: usize,
    /// Bit n set when source n (HSI, HSE, PLL) reacts to its enable bit.
    responsive: Cell<u8>,
    /// Whether SWS follows SW.
    switches: Cell<bool>,
    /// Whether the enable bit of the source reported by SWS is stuck at 1.
    protects_active: Cell<bool>,
    attempts: Cell<usize>,
}

impl SimulatedHardware {
    /// Hardware where every source and the clock switch respond.
    pub(crate) fn new(regs: FakeRcc, budget: usize) -> Self {
        Self {
            regs,
            budget,
            responsive: Cell::new(0b111),
            switches: Cell::new(true),
            protects_active: Cell::new(false),
            attempts: Cell::new(0),
        }
    }

    /// Power-on state: HSI running and selected, everything else off.
    pub(crate) fn powered_on(regs: FakeRcc, budget: usize) -> Self {
        regs.write(offsets::CTLR, 0b11);
        Self::new(regs, budget)
    }

    /// Stop reacting to the enable bit of `source` (0 HSI, 1 HSE, 2 PLL).
    pub(crate) fn stall_source(&self, source: usize) {
        self.responsive.set(self.responsive.get() & !(1 << source));
    }

    pub(crate) fn stall_switch(&self) {
        self.switches.set(false);
    }

    /// Refuse to stop the source driving the system clock, as the silicon
    /// does.
    pub(crate) fn protect_active_source(&self) {
        self.protects_active.set(true);
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.get()
    }

    fn step(&self) {
        let mut ctlr = self.regs.read(offsets::CTLR);
        let sws = ((self.regs.read(offsets::CFGR0) >> 2) & 0b11) as usize;
        if self.protects_active.get() && sws < SOURCES.len() {
            ctlr |= 1 << SOURCES[sws].0;
        }
        for (index, &(on, rdy)) in SOURCES.iter().enumerate() {
            if self.responsive.get() & (1 << index) == 0 {
                continue;
            }
            if ctlr & (1 << on) != 0 {
                ctlr |= 1 << rdy;
            } else {
                ctlr &= !(1 << rdy);
            }
        }
        self.regs.write(offsets::CTLR, ctlr);

        let cfgr0 = self.regs.read(offsets::CFGR0);
        let sw = (cfgr0 & 0b11) as usize;
        if self.switches.get() && sw < SOURCES.len() && ctlr & (1 << SOURCES[sw].1) != 0 {
            self.regs
                .write(offsets::CFGR0, (cfgr0 & !(0b11 << 2)) | ((sw as u32) << 2));
        }
    }
}

impl Poll for SimulatedHardware {
    fn poll(&self, ready: &mut dyn FnMut() -> bool) -> Result<(), ErrorCode> {
        for _ in 0..self.budget {
            self.attempts.set(self.attempts.get() + 1);
            self.step();
            if ready() {
                return Ok(());
            }
        }

        Err(ErrorCode::BUSY)
    }
}
