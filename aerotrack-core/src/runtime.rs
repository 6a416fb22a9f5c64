//! Superloop runtime
//!
//! Owns the active platform for the lifetime of a boot session. The
//! cold-boot protocol runs on the early boot parts; the platform is only
//! assembled once that protocol allows peripherals. The runtime then
//! services them from `tick` and performs the shutdown sequence.

use aerotrack_hal::{BatteryOps, BootStage, GnssOps, Platform, SoundOps};

use crate::boot::{cold_boot, store, BootReport, PowerEvent, PowerState};
use crate::config::{BoardConfig, Settings, Volume};
use crate::lifecycle::{finalize_all, poll_all, setup_all, PeripheralReport};
use crate::supervisor::WatchdogSupervisor;

/// Consecutive low readings before a low-battery shutdown
pub const LOW_BATTERY_SAMPLES: u8 = 3;

/// Readings below this are treated as "no battery fitted"
const BATTERY_ABSENT_VOLTS: f32 = 0.5;

/// Outcome of [`Runtime::boot`]
pub enum Startup<P: Platform> {
    /// Superloop may run
    Running(Runtime<P>),
    /// Device halted on a shutdown boot action
    Halted {
        /// The early boot parts; the platform was never assembled
        early: P::Boot,
        /// What the boot protocol observed
        report: BootReport,
    },
}

/// A booted platform plus the state the superloop needs
pub struct Runtime<P: Platform> {
    platform: P,
    board: &'static BoardConfig,
    settings: Settings,
    state: PowerState,
    watchdog: WatchdogSupervisor,
    boot: BootReport,
    peripherals: PeripheralReport,
    low_battery_samples: u8,
}

impl<P: Platform> Runtime<P> {
    /// Boot the device
    ///
    /// Runs the cold-boot protocol on `early` first. `assemble` builds the
    /// remaining drivers and is only called once the protocol leaves the
    /// device in a state where peripherals may be touched; ordinary startup
    /// (board setup, peripherals, post-init, watchdog) follows.
    pub fn boot<F>(early: P::Boot, board: &'static BoardConfig, assemble: F) -> Startup<P>
    where
        F: FnOnce(P::Boot) -> P,
    {
        Self::boot_with_watchdog(early, board, assemble, WatchdogSupervisor::default())
    }

    /// Boot with a custom watchdog supervisor
    pub fn boot_with_watchdog<F>(
        mut early: P::Boot,
        board: &'static BoardConfig,
        assemble: F,
        mut watchdog: WatchdogSupervisor,
    ) -> Startup<P>
    where
        F: FnOnce(P::Boot) -> P,
    {
        let outcome = cold_boot(&mut early);
        let report = *outcome.report();
        if !outcome.state().peripherals_allowed() {
            return Startup::Halted { early, report };
        }

        let mut platform = assemble(early);

        let id = platform.identity();
        info!("{} platform, board {}", id.name, board.name);

        platform.setup();

        let mut settings = Settings::default();
        let peripherals = setup_all(&mut platform, board, &mut settings);

        platform.post_init();
        watchdog.arm(platform.watchdog());

        let state = PowerState::Starting.transition(PowerEvent::SetupComplete);
        info!(
            "chip id {}, free heap {} bytes",
            platform.chip_id(),
            platform.free_heap()
        );

        Startup::Running(Self {
            platform,
            board,
            settings,
            state,
            watchdog,
            boot: report,
            peripherals,
            low_battery_samples: 0,
        })
    }

    /// One superloop iteration
    pub fn tick(&mut self) {
        self.platform.poll();
        poll_all(&mut self.platform);
        if self.state.watchdog_serviced() {
            self.watchdog.service(self.platform.watchdog());
        }
    }

    /// Sample the battery; returns `true` once it has stayed below the
    /// board's cutoff for [`LOW_BATTERY_SAMPLES`] consecutive readings
    pub fn battery_exhausted(&mut self) -> bool {
        let Some(cutoff) = self.board.low_battery_volts else {
            return false;
        };

        let volts = self.platform.battery().voltage();
        if volts > BATTERY_ABSENT_VOLTS && volts < cutoff {
            self.low_battery_samples = self.low_battery_samples.saturating_add(1);
        } else {
            self.low_battery_samples = 0;
        }
        self.low_battery_samples >= LOW_BATTERY_SAMPLES
    }

    /// Battery voltage in volts
    pub fn battery_voltage(&mut self) -> f32 {
        self.platform.battery().voltage()
    }

    /// Play the buzzer self-test unless the volume is off
    ///
    /// Returns `true` when the melody was played.
    pub fn sound_test(&mut self, variant: u8) -> bool {
        if self.settings.volume == Volume::Off {
            return false;
        }
        self.platform.sound().play_test(variant);
        true
    }

    /// Tick count of the most recent PPS edge
    pub fn pps_marker(&self) -> u32 {
        self.platform.gnss().pps_marker()
    }

    /// Approximate free memory in bytes
    pub fn free_heap(&self) -> u32 {
        self.platform.free_heap()
    }

    /// Power down: quiesce everything, persist the board's shutdown action
    /// and reset
    ///
    /// Returns the platform for simulated targets; on hardware the reset
    /// does not return.
    pub fn shutdown(mut self, message: &str) -> P {
        info!("shutdown: {}", message);
        self.state = self.state.transition(PowerEvent::ShutdownRequested);

        self.watchdog.suspend(self.platform.watchdog());
        finalize_all(&mut self.platform, message);
        self.platform.finalize();

        let action = self.board.shutdown_action();
        store::request_action(self.platform.boot_stage_mut().boot_store(), action);
        info!("next boot action: {:?}", action);

        self.state = self.state.transition(PowerEvent::ResetIssued);
        self.platform.reset();
        self.platform
    }

    /// Plain software restart without a boot action
    pub fn restart(mut self) -> P {
        info!("restart requested");
        self.watchdog.suspend(self.platform.watchdog());
        self.state = self.state.transition(PowerEvent::ResetIssued);
        self.platform.reset();
        self.platform
    }

    /// Current power state
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// What the boot protocol observed
    pub fn boot_report(&self) -> &BootReport {
        &self.boot
    }

    /// What peripheral setup found
    pub fn peripherals(&self) -> &PeripheralReport {
        &self.peripherals
    }

    /// Active user settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Active board parameters
    pub fn board(&self) -> &'static BoardConfig {
        self.board
    }

    /// Watchdog supervisor
    pub fn watchdog(&self) -> &WatchdogSupervisor {
        &self.watchdog
    }

    /// The platform
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The platform, mutably
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}
