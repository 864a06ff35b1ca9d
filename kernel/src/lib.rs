// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Core support crate shared by the chip drivers.
//!
//! This crate holds the pieces every chip crate relies on: the standard
//! [`ErrorCode`], the register interface re-exports, [`StaticRef`] for MMIO
//! blocks, the [`debug!`] console macro, the [`platform::ClockInterface`]
//! trait, and the bounded-poll primitive used to wait on hardware flags.
//!
//! [`StaticRef`]: utilities::StaticRef

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod debug;
pub mod errorcode;
pub mod platform;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
