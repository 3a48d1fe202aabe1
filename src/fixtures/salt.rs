use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// Snapshot of the salt subsystem.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SaltSnapshot {
    pub pump_on: bool,
    pub remaining_fraction: f64,
}

/// Salt pump and reservoir.
///
/// Enabling the pump requires salt in the reservoir and at least a quarter
/// of the tub filled; the tick force-disables it whenever either condition
/// stops holding, regardless of who last set it.
#[derive(Debug)]
pub struct SaltSystem {
    pump_on: bool,
    remaining_fraction: f64,
}

impl SaltSystem {
    pub fn new() -> Self {
        Self {
            pump_on: false,
            remaining_fraction: 1.0,
        }
    }

    pub fn pump_on(&self) -> bool {
        self.pump_on
    }

    pub fn remaining_fraction(&self) -> f64 {
        self.remaining_fraction
    }

    /// Sensor-fed reservoir level, clamped to `[0, 1]`.
    pub fn set_remaining(&mut self, fraction: f64) {
        self.remaining_fraction = fraction.clamp(0.0, 1.0);
    }

    /// Caller-driven toggle. Disabling always succeeds.
    pub fn set_pump(&mut self, on: bool, fill_ratio: f64, min_fill_ratio: f64) -> ControlResult<()> {
        if on {
            if self.remaining_fraction == 0.0 {
                return Err(ControlError::NoSalt);
            }
            if fill_ratio < min_fill_ratio {
                return Err(ControlError::VolumeTooLow);
            }
        }
        self.pump_on = on;
        Ok(())
    }

    /// Tick-driven gate: force the pump off (never on) when its running
    /// conditions no longer hold. Returns true when it tripped.
    pub fn enforce(&mut self, fill_ratio: f64, min_fill_ratio: f64) -> bool {
        if self.pump_on && (self.remaining_fraction == 0.0 || fill_ratio < min_fill_ratio) {
            self.pump_on = false;
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> SaltSnapshot {
        SaltSnapshot {
            pump_on: self.pump_on,
            remaining_fraction: self.remaining_fraction,
        }
    }
}

impl Default for SaltSystem {
    fn default() -> Self {
        Self::new()
    }
}
