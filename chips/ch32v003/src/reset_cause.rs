// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Reset cause decoder.
//!
//! The RCC latches one flag per reset source in RSTSCKR and keeps them until
//! they are removed with RMVF, so several flags can be set at once (a
//! watchdog reset during a brown-out also sets the power-on flag).
//! [ResetStatus::cause] reports the single most significant one.
//!
//! ```rust,ignore
//! let reset_status = &peripherals.reset_status;
//! debug!("Reset cause: {:?}", reset_status.cause());
//! reset_status.clear();
//! ```

use crate::rcc::{Rcc, ResetFlagsRegister, RSTSCKR};

use kernel::utilities::registers::Field;
use kernel::ErrorCode;

/// Cause of the last reset, most significant first.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ResetCause {
    LowPower,
    WindowWatchdog,
    IndependentWatchdog,
    Software,
    PowerOn,
    ExternalPin,
    /// No flag latched, for instance after [ResetStatus::clear]
    NoReset,
}

// Priority order of the scan in `ResetFlags::cause`
const CAUSES: [ResetCause; 6] = [
    ResetCause::LowPower,
    ResetCause::WindowWatchdog,
    ResetCause::IndependentWatchdog,
    ResetCause::Software,
    ResetCause::PowerOn,
    ResetCause::ExternalPin,
];

impl ResetCause {
    fn flag(self) -> Option<Field<u32, RSTSCKR::Register>> {
        match self {
            ResetCause::LowPower => Some(RSTSCKR::LPWRRSTF),
            ResetCause::WindowWatchdog => Some(RSTSCKR::WWDGRSTF),
            ResetCause::IndependentWatchdog => Some(RSTSCKR::IWDGRSTF),
            ResetCause::Software => Some(RSTSCKR::SFTRSTF),
            ResetCause::PowerOn => Some(RSTSCKR::PORRSTF),
            ResetCause::ExternalPin => Some(RSTSCKR::PINRSTF),
            ResetCause::NoReset => None,
        }
    }
}

/// Every reset flag latched at the time of the read.
#[derive(Clone, Copy)]
pub struct ResetFlags {
    flags: ResetFlagsRegister,
}

impl ResetFlags {
    /// Whether the flag of `cause` is latched. [ResetCause::NoReset] is contained only in an
    /// empty set.
    pub fn contains(&self, cause: ResetCause) -> bool {
        match cause.flag() {
            Some(flag) => self.flags.is_set(flag),
            None => self.is_empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Latched causes, most significant first.
    pub fn iter(&self) -> impl Iterator<Item = ResetCause> + '_ {
        CAUSES.iter().copied().filter(|&cause| self.contains(cause))
    }

    /// Most significant latched cause.
    pub fn cause(&self) -> ResetCause {
        self.iter().next().unwrap_or(ResetCause::NoReset)
    }
}

impl core::fmt::Debug for ResetFlags {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Read access to the reset flags.
pub struct ResetStatus<'a> {
    rcc: &'a Rcc,
}

impl<'a> ResetStatus<'a> {
    pub const fn new(rcc: &'a Rcc) -> Self {
        Self { rcc }
    }

    /// Cause of the last reset.
    ///
    /// The flags are read once, then scanned from the low-power flag down to the external pin
    /// flag. The first one set wins.
    pub fn cause(&self) -> ResetCause {
        self.flags().cause()
    }

    /// All latched flags, read in a single access.
    pub fn flags(&self) -> ResetFlags {
        ResetFlags {
            flags: self.rcc.read_reset_flags(),
        }
    }

    /// Remove every latched reset flag.
    pub fn clear(&self) -> Result<(), ErrorCode> {
        self.rcc.remove_reset_flags();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ResetCause, ResetStatus};
    use crate::testing::offsets::RSTSCKR;
    use crate::testing::FakeRcc;
    use std::vec::Vec;

    const LPWRRSTF: u32 = 1 << 31;
    const WWDGRSTF: u32 = 1 << 30;
    const IWDGRSTF: u32 = 1 << 29;
    const SFTRSTF: u32 = 1 << 28;
    const PORRSTF: u32 = 1 << 27;
    const PINRSTF: u32 = 1 << 26;

    #[test]
    fn power_on_wins_over_the_external_pin() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        fake.write(RSTSCKR, PORRSTF | PINRSTF);

        let status = ResetStatus::new(&rcc);
        assert_eq!(status.cause(), ResetCause::PowerOn);
        assert!(status.flags().contains(ResetCause::ExternalPin));
    }

    #[test]
    fn no_flag_means_no_reset() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        // LSI bits share the register and are not reset causes
        fake.write(RSTSCKR, 0b11);

        let status = ResetStatus::new(&rcc);
        assert_eq!(status.cause(), ResetCause::NoReset);
        assert!(status.flags().is_empty());
        assert!(status.flags().contains(ResetCause::NoReset));
    }

    #[test]
    fn each_flag_decodes_alone() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        let status = ResetStatus::new(&rcc);

        let expected = [
            (LPWRRSTF, ResetCause::LowPower),
            (WWDGRSTF, ResetCause::WindowWatchdog),
            (IWDGRSTF, ResetCause::IndependentWatchdog),
            (SFTRSTF, ResetCause::Software),
            (PORRSTF, ResetCause::PowerOn),
            (PINRSTF, ResetCause::ExternalPin),
        ];
        for (flag, cause) in expected {
            fake.write(RSTSCKR, flag);
            assert_eq!(status.cause(), cause);
            assert!(!status.flags().contains(ResetCause::NoReset));
        }
    }

    #[test]
    fn priority_order_is_fixed() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        let status = ResetStatus::new(&rcc);

        fake.write(RSTSCKR, WWDGRSTF | IWDGRSTF | PORRSTF);
        assert_eq!(status.cause(), ResetCause::WindowWatchdog);
        let latched: Vec<ResetCause> = status.flags().iter().collect();
        assert_eq!(
            latched,
            [
                ResetCause::WindowWatchdog,
                ResetCause::IndependentWatchdog,
                ResetCause::PowerOn
            ]
        );

        fake.write(RSTSCKR, LPWRRSTF | SFTRSTF | PINRSTF);
        assert_eq!(status.cause(), ResetCause::LowPower);

        fake.write(RSTSCKR, SFTRSTF | PORRSTF);
        assert_eq!(status.cause(), ResetCause::Software);
    }

    #[test]
    fn clear_sets_rmvf_only() {
        let fake = FakeRcc::new();
        let rcc = fake.rcc();
        fake.write(RSTSCKR, PINRSTF | 0b1);

        assert_eq!(ResetStatus::new(&rcc).clear(), Ok(()));
        assert_eq!(fake.read(RSTSCKR), PINRSTF | 0b1 | (1 << 24));
    }
}
