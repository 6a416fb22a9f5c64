//! Cold-boot protocol
//!
//! Runs on the [`BootStage`] alone, before any other peripheral exists:
//!
//! 1. Decode and clear the reset cause, record it in the platform context
//! 2. Bump the boot counter
//! 3. Consume the stored boot action
//!
//! The boot action is one-shot. It is rewritten to `Normal` before the
//! device suspends or halts, so an interrupted sleep or an external reset
//! out of shutdown boots normally next time.

use aerotrack_hal::{BootAction, BootStage, PowerOps, ResetInfo};

use super::events::PowerEvent;
use super::machine::PowerState;
use super::store::{bump_counter, load_action, request_action};
use crate::diagnostics::reset::capture;

/// What the early boot stages observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    /// Decoded reset cause
    pub reset: ResetInfo,
    /// Boot action found in the boot store
    pub action: BootAction,
    /// Boot counter after this boot's increment
    pub boot_count: u32,
    /// Device resumed from serial deep sleep during this boot
    pub woke_from_sleep: bool,
}

/// Result of the cold-boot protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootOutcome {
    /// Continue with ordinary startup
    Ready(BootReport),
    /// Device entered the lowest-power halt; nothing else may run
    Halted(BootReport),
}

impl BootOutcome {
    /// Report regardless of outcome
    pub fn report(&self) -> &BootReport {
        match self {
            BootOutcome::Ready(report) | BootOutcome::Halted(report) => report,
        }
    }

    /// Power state the protocol left the device in
    pub fn state(&self) -> PowerState {
        match self {
            BootOutcome::Ready(_) => PowerState::Starting,
            BootOutcome::Halted(_) => PowerState::Halted,
        }
    }
}

/// Run the cold-boot protocol on the early boot parts of a freshly reset
/// device
pub fn cold_boot<B: BootStage>(early: &mut B) -> BootOutcome {
    let reset = capture(early.reset_cause());
    if !early.context_mut().record_reset(reset) {
        warn!("reset already recorded this boot");
    }

    let boot_count = bump_counter(early.boot_store());
    early.context_mut().set_boot_count(boot_count);
    info!("reset reason: {}, boot #{}", reset.reason.as_str(), boot_count);

    let action = load_action(early.boot_store());
    let mut report = BootReport {
        reset,
        action,
        boot_count,
        woke_from_sleep: false,
    };

    let mut state = PowerState::Boot.transition(PowerEvent::ActionLoaded(action));
    match state {
        PowerState::SerialDeepSleep => {
            info!("entering serial deep sleep");
            early.power().arm_serial_wake();
            request_action(early.boot_store(), BootAction::Normal);
            early.power().deep_sleep();
            early.power().drain_wake_transport();

            state = state.transition(PowerEvent::Woke);
            report.woke_from_sleep = true;
            info!("woke from serial deep sleep");
        }
        PowerState::Halted => {
            info!("shutdown requested, powering off");
            request_action(early.boot_store(), BootAction::Normal);
            early.power().power_off();
            return BootOutcome::Halted(report);
        }
        _ => {}
    }

    debug!("boot protocol done, state {:?}", state);
    BootOutcome::Ready(report)
}

#[cfg(test)]
mod tests {
    use aerotrack_hal::{BootIndex, BootStore, PlatformContext, ResetCauseRegister, ResetFlags};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Cleared,
        Armed,
        Slept(u32),
        Drained,
        PoweredOff(u32),
    }

    #[derive(Default)]
    struct MockEarly {
        context: PlatformContext,
        flags: u8,
        regs: [u32; 3],
        ops: [Option<Op>; 8],
        len: usize,
    }

    impl MockEarly {
        fn with_action(action: BootAction) -> Self {
            let mut early = Self::default();
            early.regs[BootIndex::Action.as_usize()] = action.as_u32();
            early
        }

        fn push(&mut self, op: Op) {
            self.ops[self.len] = Some(op);
            self.len += 1;
        }

        fn ops(&self) -> &[Option<Op>] {
            &self.ops[..self.len]
        }

        fn action(&self) -> u32 {
            self.regs[BootIndex::Action.as_usize()]
        }
    }

    impl ResetCauseRegister for MockEarly {
        fn read(&mut self) -> ResetFlags {
            ResetFlags::from_bits_truncate(self.flags)
        }

        fn clear(&mut self) {
            self.flags = 0;
            self.push(Op::Cleared);
        }
    }

    impl BootStore for MockEarly {
        fn read(&mut self, index: BootIndex) -> u32 {
            self.regs[index.as_usize()]
        }

        fn write(&mut self, index: BootIndex, value: u32) {
            self.regs[index.as_usize()] = value;
        }
    }

    impl PowerOps for MockEarly {
        fn arm_serial_wake(&mut self) {
            self.push(Op::Armed);
        }

        fn deep_sleep(&mut self) {
            let action = self.action();
            self.push(Op::Slept(action));
        }

        fn drain_wake_transport(&mut self) {
            self.push(Op::Drained);
        }

        fn power_off(&mut self) {
            let action = self.action();
            self.push(Op::PoweredOff(action));
        }
    }

    impl BootStage for MockEarly {
        type ResetCause = Self;
        type BootStore = Self;
        type Power = Self;

        fn context(&self) -> &PlatformContext {
            &self.context
        }

        fn context_mut(&mut self) -> &mut PlatformContext {
            &mut self.context
        }

        fn reset_cause(&mut self) -> &mut Self {
            self
        }

        fn boot_store(&mut self) -> &mut Self {
            self
        }

        fn power(&mut self) -> &mut Self {
            self
        }
    }

    #[test]
    fn test_normal_boot_records_context() {
        let mut early = MockEarly::default();
        early.flags = ResetFlags::SOFTWARE.bits();

        let outcome = cold_boot(&mut early);
        assert_eq!(outcome.state(), PowerState::Starting);
        assert_eq!(outcome.report().boot_count, 1);
        assert_eq!(early.context().boot_count(), 1);
        assert_eq!(
            early.context().reset_reason(),
            aerotrack_hal::ResetReason::SoftwareRestart
        );
        assert_eq!(early.ops(), &[Some(Op::Cleared)]);
    }

    #[test]
    fn test_serial_sleep_consumes_action_before_sleeping() {
        let mut early = MockEarly::with_action(BootAction::SerialDeepSleep);

        let outcome = cold_boot(&mut early);
        assert!(outcome.report().woke_from_sleep);
        assert!(outcome.state().peripherals_allowed());
        assert_eq!(
            early.ops(),
            &[
                Some(Op::Cleared),
                Some(Op::Armed),
                Some(Op::Slept(BootAction::Normal.as_u32())),
                Some(Op::Drained),
            ]
        );
    }

    #[test]
    fn test_shutdown_halts_without_peripherals() {
        let mut early = MockEarly::with_action(BootAction::Shutdown);

        let outcome = cold_boot(&mut early);
        assert!(matches!(outcome, BootOutcome::Halted(_)));
        assert!(!outcome.state().peripherals_allowed());
        assert_eq!(
            early.ops(),
            &[
                Some(Op::Cleared),
                Some(Op::PoweredOff(BootAction::Normal.as_u32())),
            ]
        );
    }
}
