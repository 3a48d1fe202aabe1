//! The control core: a single aggregate owning both pipes, the tub model,
//! the quality monitor, the salt subsystem, and the profile store.
//!
//! One instance is constructed at process start and shared behind a lock;
//! every externally triggered operation and the periodic tick serialize
//! through it. Notifications are appended to a bounded buffer and drained by
//! the caller after the lock is released, so emission never blocks the tick
//! or the command path.

use crate::config::SimConfig;
use crate::error::{ControlError, ControlResult};
use crate::fixtures::bathtub::{AdvanceOutcome, BathtubSnapshot};
use crate::fixtures::salt::SaltSnapshot;
use crate::fixtures::{
    BathtubModel, PipeBank, PipeKind, PipeState, QualityMonitor, SaltSystem, WaterQuality,
};
use crate::profile::{ProfileStore, UserProfile};
use crate::protocol::Notification;
use crate::validate;
use heapless::Vec as BoundedVec;
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::info;

const MAX_PENDING_NOTIFICATIONS: usize = 16;

pub type NotificationBatch = BoundedVec<Notification, MAX_PENDING_NOTIFICATIONS>;

/// Full state snapshot for status queries.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub bath: PipeState,
    pub shower: PipeState,
    pub bathtub: BathtubSnapshot,
    pub salt: SaltSnapshot,
    pub water_quality: Option<WaterQuality>,
    pub default_temperature_c: f64,
    pub active_profile: Option<String>,
    pub profile_count: usize,
}

pub struct BathController {
    config: SimConfig,
    pipes: PipeBank,
    bathtub: BathtubModel,
    quality: QualityMonitor,
    salt: SaltSystem,
    profiles: ProfileStore,
    default_temperature_c: f64,
    notifications: NotificationBatch,
}

impl BathController {
    pub fn new(config: SimConfig, profiles: ProfileStore) -> Self {
        let bathtub = BathtubModel::new(config.limits.tub_capacity_l);
        let default_temperature_c = config.default_temperature_c;
        Self {
            config,
            pipes: PipeBank::new(),
            bathtub,
            quality: QualityMonitor::new(),
            salt: SaltSystem::new(),
            profiles,
            default_temperature_c,
            notifications: BoundedVec::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // ---- pipe control -------------------------------------------------

    /// Validates and applies a pipe state. No partial state on failure.
    pub fn set_pipe_state(&mut self, kind: PipeKind, state: PipeState) -> ControlResult<()> {
        validate::check_pipe_state(kind, &state, &self.config.limits)?;
        self.apply_pipe_state(kind, state);
        Ok(())
    }

    /// Convenience entry for the wire adapters: missing debit defaults to
    /// the pipe's ceiling, missing temperature to the default temperature.
    pub fn set_pipe(
        &mut self,
        kind: PipeKind,
        on: bool,
        debit_lps: Option<f64>,
        temperature_c: Option<f64>,
    ) -> ControlResult<()> {
        let state = if on {
            let debit = debit_lps.unwrap_or(match kind {
                PipeKind::Bath => self.config.limits.max_bath_debit_lps,
                PipeKind::Shower => self.config.limits.max_shower_debit_lps,
            });
            let temperature = temperature_c.unwrap_or(self.default_temperature_c);
            PipeState::open(temperature, debit)
        } else {
            PipeState::OFF
        };
        self.set_pipe_state(kind, state)
    }

    /// The single internal mutation path: stores an already-validated state,
    /// clears the fill target on any off-transition, and queues the display
    /// notification.
    fn apply_pipe_state(&mut self, kind: PipeKind, state: PipeState) {
        self.pipes.store(kind, state);
        if state.on {
            self.notify(Notification::PipeOpened {
                pipe: kind,
                debit_lps: state.debit_lps,
                temperature_c: state.temperature_c,
            });
        } else {
            // Turning either pipe off cancels an in-flight preparation.
            self.bathtub.clear_fill_target();
            self.notify(Notification::PipeClosed { pipe: kind });
        }
    }

    /// Shuts both pipes through the non-validating path. Used only by the
    /// tick's autonomous shutoffs; the off state is always valid.
    fn shut_all_pipes(&mut self, reason: &str) {
        let mut any = false;
        for kind in [PipeKind::Bath, PipeKind::Shower] {
            if self.pipes.force_off(kind) {
                self.notify(Notification::PipeClosed { pipe: kind });
                any = true;
            }
        }
        if any {
            self.bathtub.clear_fill_target();
            info!("pipes shut off: {}", reason);
        }
    }

    pub fn pipe_state(&self, kind: PipeKind) -> PipeState {
        self.pipes.get(kind)
    }

    pub fn bath_state(&self) -> PipeState {
        self.pipes.get(PipeKind::Bath)
    }

    pub fn shower_state(&self) -> PipeState {
        self.pipes.get(PipeKind::Shower)
    }

    // ---- simulation tick ----------------------------------------------

    /// Advances the simulation by one tick. Evaluation order matters:
    /// capacity shutoff, then the volume notification, then quality
    /// shutoff, then fill-target shutoff, then the salt pump gate. A tick
    /// can only ever turn things off.
    pub fn tick(&mut self) {
        let dt_s = self.config.tick_period_ms as f64 / 1000.0;
        let inflow = self.pipes.total_inflow_lps();
        let pipes_open = self.pipes.any_on();

        let outcome = self.bathtub.advance(
            inflow,
            self.config.limits.drain_speed_lps,
            dt_s,
            pipes_open,
        );
        if outcome == AdvanceOutcome::CapacityReached {
            self.shut_all_pipes("tub filled to capacity");
        }

        self.notify(Notification::CurrentVolume(self.bathtub.current_volume_l()));

        if self.quality.demands_shutoff(&self.config.limits.quality) {
            self.shut_all_pipes("water quality out of bounds");
        }

        if self.bathtub.target_reached() {
            self.shut_all_pipes("fill target reached");
            self.bathtub.clear_fill_target();
            self.notify(Notification::TargetReached);
        }

        let fill_ratio = self.bathtub.current_volume_l() / self.bathtub.capacity_l();
        if self
            .salt
            .enforce(fill_ratio, self.config.limits.min_pump_volume_ratio)
        {
            info!("salt pump forced off");
        }
    }

    // ---- bathtub ------------------------------------------------------

    pub fn current_volume(&self) -> f64 {
        self.bathtub.current_volume_l()
    }

    pub fn bathtub_snapshot(&self) -> BathtubSnapshot {
        self.bathtub.snapshot()
    }

    pub fn toggle_stopper(&mut self, closed: bool) {
        self.bathtub.set_stopper(closed);
    }

    /// Prepares a bath for a body of the given weight at the given water
    /// temperature. Returns the estimated fill time in seconds.
    pub fn prepare_bath(&mut self, weight_kg: f64, temperature_c: f64) -> ControlResult<u64> {
        if self.bathtub.fill_target_l().is_some() {
            return Err(ControlError::AlreadyPreparing);
        }
        let capacity = self.bathtub.capacity_l();
        let target_l = weight_kg / self.config.limits.body_density_kg_per_l;
        if target_l > capacity {
            return Err(ControlError::TargetExceedsCapacity {
                target_l,
                capacity_l: capacity,
            });
        }
        let volume = self.bathtub.current_volume_l();
        if target_l <= volume {
            return Err(ControlError::AlreadyFull {
                target_l,
                volume_l: volume,
            });
        }

        // Validate the pipe request before committing anything.
        let max_debit = self.config.limits.max_bath_debit_lps;
        let state = PipeState::open(temperature_c, max_debit);
        validate::check_pipe_state(PipeKind::Bath, &state, &self.config.limits)?;

        self.apply_pipe_state(PipeKind::Bath, state);
        self.bathtub.set_fill_target(target_l);

        Ok(((target_l - volume) / max_debit).ceil() as u64)
    }

    /// Temperature-less overload: uses the default temperature.
    pub fn prepare_bath_default(&mut self, weight_kg: f64) -> ControlResult<u64> {
        self.prepare_bath(weight_kg, self.default_temperature_c)
    }

    /// Profile-based overload: uses the active profile's weight and
    /// preferred bath temperature.
    pub fn prepare_bath_for_active_profile(&mut self) -> ControlResult<u64> {
        let profile = self.profiles.get_active()?;
        self.prepare_bath(profile.weight_kg, profile.bath_temperature_c)
    }

    // ---- sensors ------------------------------------------------------

    /// Stores the latest quality sample. Enforcement is deferred to the
    /// next tick.
    pub fn set_water_quality(&mut self, sample: WaterQuality) {
        self.quality.record(sample);
    }

    pub fn water_quality(&self) -> Option<WaterQuality> {
        self.quality.sample()
    }

    /// Clamps into the configured window rather than erroring: the sensor
    /// has no return channel.
    pub fn set_default_temperature(&mut self, temperature_c: f64) {
        self.default_temperature_c = temperature_c.clamp(
            self.config.limits.min_temperature_c,
            self.config.limits.max_temperature_c,
        );
    }

    pub fn default_temperature(&self) -> f64 {
        self.default_temperature_c
    }

    pub fn set_salt_remaining(&mut self, fraction: f64) {
        self.salt.set_remaining(fraction);
    }

    pub fn toggle_pump(&mut self, on: bool) -> ControlResult<()> {
        let fill_ratio = self.bathtub.current_volume_l() / self.bathtub.capacity_l();
        self.salt
            .set_pump(on, fill_ratio, self.config.limits.min_pump_volume_ratio)
    }

    pub fn salt_snapshot(&self) -> SaltSnapshot {
        self.salt.snapshot()
    }

    // ---- profiles -----------------------------------------------------

    pub fn add_profile(&mut self, name: &str, profile: UserProfile) -> ControlResult<()> {
        validate::check_profile(&profile, &self.config.limits)?;
        self.profiles.add(name, profile)
    }

    pub fn edit_profile(&mut self, name: &str, profile: UserProfile) -> ControlResult<()> {
        validate::check_profile(&profile, &self.config.limits)?;
        self.profiles.edit(name, profile)
    }

    pub fn remove_profile(&mut self, name: &str) -> ControlResult<UserProfile> {
        self.profiles.remove(name)
    }

    pub fn set_active_profile(&mut self, name: &str) -> ControlResult<()> {
        self.profiles.set_active(name)
    }

    pub fn get_profile(&self, name: &str) -> ControlResult<UserProfile> {
        self.profiles.get(name)
    }

    pub fn get_active_profile(&self) -> ControlResult<UserProfile> {
        self.profiles.get_active()
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.names()
    }

    /// Flushes the profile map to the flat file (shutdown path).
    pub fn dump_profiles(&self, path: &Path) -> io::Result<()> {
        self.profiles.dump(path)
    }

    // ---- notifications and status --------------------------------------

    fn notify(&mut self, notification: Notification) {
        if self.notifications.push(notification).is_err() {
            // Buffer full: drop the oldest so recent events survive until
            // the next drain.
            self.notifications.remove(0);
            let _ = self.notifications.push(notification);
        }
    }

    /// Drains pending notifications. The server calls this after releasing
    /// the lock and relays the batch to its subscribers.
    pub fn take_notifications(&mut self) -> NotificationBatch {
        core::mem::take(&mut self.notifications)
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            bath: self.bath_state(),
            shower: self.shower_state(),
            bathtub: self.bathtub.snapshot(),
            salt: self.salt.snapshot(),
            water_quality: self.quality.sample(),
            default_temperature_c: self.default_temperature_c,
            active_profile: self.profiles.active_name().map(str::to_string),
            profile_count: self.profiles.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> BathController {
        BathController::new(SimConfig::default(), ProfileStore::new())
    }

    #[test]
    fn starts_idle() {
        let ctl = controller();
        assert!(!ctl.bath_state().on);
        assert!(!ctl.shower_state().on);
        assert_eq!(ctl.current_volume(), 0.0);
        assert!(ctl.bathtub_snapshot().stopper_closed);
        assert_eq!(ctl.default_temperature(), 20.0);
        assert!(ctl.water_quality().is_none());
    }

    #[test]
    fn set_pipe_fills_in_defaults() {
        let mut ctl = controller();
        ctl.set_pipe(PipeKind::Shower, true, None, None).unwrap();
        let state = ctl.shower_state();
        assert!(state.on);
        assert_eq!(state.debit_lps, 0.20);
        assert_eq!(state.temperature_c, 20.0);
    }

    #[test]
    fn default_temperature_clamps() {
        let mut ctl = controller();
        ctl.set_default_temperature(80.0);
        assert_eq!(ctl.default_temperature(), 50.0);
        ctl.set_default_temperature(-3.0);
        assert_eq!(ctl.default_temperature(), 5.0);
    }

    #[test]
    fn notifications_drain_once() {
        let mut ctl = controller();
        ctl.set_pipe(PipeKind::Bath, true, Some(0.2), Some(38.0))
            .unwrap();
        let batch = ctl.take_notifications();
        assert_eq!(batch.len(), 1);
        assert!(ctl.take_notifications().is_empty());
    }
}
