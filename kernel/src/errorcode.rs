// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Standard error enum for invoking operations

/// Standard errors in Tock.
///
/// Successful operations return `Ok(())`; this enum only carries the ways an
/// operation can fail.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition, such as an argument outside its valid
    /// domain
    FAIL = 0,
    /// Underlying system is busy; retry
    BUSY = 1,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorCode::FAIL => f.write_str("FAIL"),
            ErrorCode::BUSY => f.write_str("BUSY"),
        }
    }
}
