// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Reset and clock control for the WCH CH32V003 RISC-V MCU.
//!
//! CH32V003: <https://www.wch-ic.com/products/CH32V003.html>

#![no_std]

#[cfg(test)]
extern crate std;

pub mod chip;
pub mod clocks;
pub mod config;
pub mod rcc;
pub mod reset_cause;

#[cfg(test)]
mod testing;
