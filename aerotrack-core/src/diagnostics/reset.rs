//! Reset-cause decoding
//!
//! Raw flags are matched against [`RESET_RULES`] in order; the first rule
//! whose flag is set wins. Supervisory causes come first, power-on and the
//! external pin last.

use aerotrack_hal::{ResetCauseRegister, ResetFlags, ResetInfo, ResetReason};

/// One row of the priority table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetRule {
    /// Flag this rule matches
    pub flag: ResetFlags,
    /// Reason reported when it matches
    pub reason: ResetReason,
}

impl ResetRule {
    const fn new(flag: ResetFlags, reason: ResetReason) -> Self {
        Self { flag, reason }
    }
}

/// Decoding rules in priority order
pub const RESET_RULES: [ResetRule; 6] = [
    ResetRule::new(ResetFlags::LOW_POWER, ResetReason::WatchdogTimeout),
    ResetRule::new(ResetFlags::WINDOW_WATCHDOG, ResetReason::WatchdogTimeout),
    ResetRule::new(ResetFlags::INDEPENDENT_WATCHDOG, ResetReason::SoftwareWatchdog),
    ResetRule::new(ResetFlags::SOFTWARE, ResetReason::SoftwareRestart),
    ResetRule::new(ResetFlags::POWER_ON, ResetReason::Default),
    ResetRule::new(ResetFlags::EXTERNAL_PIN, ResetReason::ExternalPin),
];

/// Decode raw flags into exactly one reason
///
/// No flag set yields [`ResetReason::Default`].
pub fn decode(flags: ResetFlags) -> ResetReason {
    RESET_RULES
        .iter()
        .find(|rule| flags.contains(rule.flag))
        .map(|rule| rule.reason)
        .unwrap_or(ResetReason::Default)
}

/// Read, decode and clear the reset-cause register
pub fn capture<R: ResetCauseRegister>(register: &mut R) -> ResetInfo {
    let flags = register.read();
    register.clear();

    let reason = decode(flags);
    debug!("reset flags {:?} -> {:?}", flags, reason);

    ResetInfo { reason, flags }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct MockRegister {
        flags: ResetFlags,
    }

    impl ResetCauseRegister for MockRegister {
        fn read(&mut self) -> ResetFlags {
            self.flags
        }

        fn clear(&mut self) {
            self.flags = ResetFlags::empty();
        }
    }

    #[test]
    fn test_single_flags() {
        assert_eq!(
            decode(ResetFlags::INDEPENDENT_WATCHDOG),
            ResetReason::SoftwareWatchdog
        );
        assert_eq!(decode(ResetFlags::POWER_ON), ResetReason::Default);
        assert_eq!(decode(ResetFlags::EXTERNAL_PIN), ResetReason::ExternalPin);
        assert_eq!(decode(ResetFlags::SOFTWARE), ResetReason::SoftwareRestart);
        assert_eq!(
            decode(ResetFlags::WINDOW_WATCHDOG),
            ResetReason::WatchdogTimeout
        );
        assert_eq!(decode(ResetFlags::LOW_POWER), ResetReason::WatchdogTimeout);
    }

    #[test]
    fn test_no_flags_is_default() {
        assert_eq!(decode(ResetFlags::empty()), ResetReason::Default);
    }

    #[test]
    fn test_watchdog_beats_pin_reset() {
        // A watchdog reset also pulses NRST, so both flags latch
        let flags = ResetFlags::INDEPENDENT_WATCHDOG | ResetFlags::EXTERNAL_PIN;
        assert_eq!(decode(flags), ResetReason::SoftwareWatchdog);
    }

    #[test]
    fn test_capture_clears_register() {
        let mut register = MockRegister {
            flags: ResetFlags::SOFTWARE | ResetFlags::EXTERNAL_PIN,
        };

        let info = capture(&mut register);
        assert_eq!(info.reason, ResetReason::SoftwareRestart);
        assert_eq!(info.flags, ResetFlags::SOFTWARE | ResetFlags::EXTERNAL_PIN);
        assert!(register.read().is_empty());
    }

    proptest! {
        #[test]
        fn decode_follows_first_matching_rule(bits in 0u8..64) {
            let flags = ResetFlags::from_bits_truncate(bits);
            let expected = RESET_RULES
                .iter()
                .position(|rule| flags.contains(rule.flag))
                .map(|i| RESET_RULES[i].reason)
                .unwrap_or(ResetReason::Default);

            prop_assert_eq!(decode(flags), expected);

            // No earlier rule may match
            if let Some(first) = RESET_RULES.iter().position(|rule| flags.contains(rule.flag)) {
                for rule in &RESET_RULES[..first] {
                    prop_assert!(!flags.contains(rule.flag));
                }
            }
        }

        #[test]
        fn capture_always_leaves_register_clear(bits in 0u8..64) {
            let mut register = MockRegister { flags: ResetFlags::from_bits_truncate(bits) };
            let info = capture(&mut register);
            prop_assert_eq!(info.reason, decode(info.flags));
            prop_assert!(register.read().is_empty());
        }
    }
}
