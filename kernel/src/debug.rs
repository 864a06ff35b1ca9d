// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for in-kernel debugging.
//!
//! The [`debug!`] macro formats a message and hands it to the debug writer
//! registered by the board. Until a board registers one, messages are
//! silently dropped, so drivers can call `debug!` before the console is up.
//!
//! ```rust,ignore
//! // In the board main.rs, once the console UART is configured:
//! unsafe { kernel::debug::set_debug_writer(uart_writer) };
//!
//! debug!("Yes the code gets here with value {}", i);
//! ```

use core::fmt::{write, Arguments, Result, Write};
use core::ptr::addr_of_mut;

/// Sink for debug output, usually a polled UART.
pub trait IoWrite {
    /// Write `buf` out and return the number of bytes consumed.
    fn write(&mut self, buf: &[u8]) -> usize;
}

static mut DEBUG_WRITER: Option<&'static mut dyn IoWrite> = None;

/// Register the sink that receives all [`debug!`] output.
///
/// # Safety
///
/// Must be called before interrupts are enabled and never concurrently with
/// a `debug!` call.
pub unsafe fn set_debug_writer(writer: &'static mut dyn IoWrite) {
    *addr_of_mut!(DEBUG_WRITER) = Some(writer);
}

struct WriterAdapter<'a> {
    inner: &'a mut (dyn IoWrite + 'static),
}

impl Write for WriterAdapter<'_> {
    fn write_str(&mut self, s: &str) -> Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let written = self.inner.write(bytes);
            if written == 0 {
                return Err(core::fmt::Error);
            }
            bytes = &bytes[written.min(bytes.len())..];
        }
        Ok(())
    }
}

/// Write a formatted line to the debug writer, if one is registered.
pub fn debug_println(args: Arguments) {
    // SAFETY: the kernel is single threaded and the writer is only swapped
    // by `set_debug_writer` during board setup.
    let writer = unsafe { (*addr_of_mut!(DEBUG_WRITER)).as_deref_mut() };
    if let Some(inner) = writer {
        let mut adapter = WriterAdapter { inner };
        let _ = write(&mut adapter, args);
        let _ = adapter.write_str("\r\n");
    }
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        $crate::debug!("TOCK_DEBUG: {}:{}", file!(), line!())
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_println(format_args!("{}", $msg))
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($fmt, $($arg)+))
    });
}
