use serde::{Deserialize, Serialize};

/// Snapshot of the tub for queries and wire responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BathtubSnapshot {
    pub capacity_l: f64,
    pub current_volume_l: f64,
    pub stopper_closed: bool,
    pub fill_target_l: Option<f64>,
}

/// Bathtub volume model.
///
/// Invariant: `0 <= current_volume_l <= capacity_l`. The fill target, when
/// present, exceeded the volume at the moment it was set; it is cleared the
/// instant a pipe is shut or the target is reached.
#[derive(Debug)]
pub struct BathtubModel {
    capacity_l: f64,
    current_volume_l: f64,
    stopper_closed: bool,
    fill_target_l: Option<f64>,
}

/// Outcome of one volume advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Volume updated, no limit hit.
    Nominal,
    /// The tub filled to capacity while a pipe was still open.
    CapacityReached,
}

impl BathtubModel {
    pub fn new(capacity_l: f64) -> Self {
        debug_assert!(capacity_l > 0.0, "tub capacity must be positive");
        Self {
            capacity_l,
            current_volume_l: 0.0,
            // The stopper starts plugged: a fresh fixture holds water.
            stopper_closed: true,
            fill_target_l: None,
        }
    }

    pub fn capacity_l(&self) -> f64 {
        self.capacity_l
    }

    pub fn current_volume_l(&self) -> f64 {
        self.current_volume_l
    }

    pub fn stopper_closed(&self) -> bool {
        self.stopper_closed
    }

    pub fn set_stopper(&mut self, closed: bool) {
        self.stopper_closed = closed;
    }

    pub fn fill_target_l(&self) -> Option<f64> {
        self.fill_target_l
    }

    /// Sets the target. Callers check the preparing/capacity/full conditions
    /// before committing.
    pub fn set_fill_target(&mut self, target_l: f64) {
        debug_assert!(
            target_l > self.current_volume_l,
            "fill target {} must exceed current volume {}",
            target_l,
            self.current_volume_l
        );
        self.fill_target_l = Some(target_l);
    }

    pub fn clear_fill_target(&mut self) {
        self.fill_target_l = None;
    }

    pub fn target_reached(&self) -> bool {
        matches!(self.fill_target_l, Some(t) if self.current_volume_l >= t)
    }

    /// Advances the volume by one tick of the given inflow, draining through
    /// an open stopper, clamping to `[0, capacity]`.
    ///
    /// `pipes_open` decides whether hitting capacity is an overfill event
    /// (a pipe is still feeding the tub) or just a full, quiet tub.
    pub fn advance(
        &mut self,
        inflow_lps: f64,
        drain_speed_lps: f64,
        dt_s: f64,
        pipes_open: bool,
    ) -> AdvanceOutcome {
        let mut volume = self.current_volume_l + inflow_lps * dt_s;
        if !self.stopper_closed {
            volume -= drain_speed_lps * dt_s;
        }
        volume = volume.max(0.0);

        let outcome = if volume >= self.capacity_l && pipes_open {
            volume = self.capacity_l;
            AdvanceOutcome::CapacityReached
        } else {
            volume = volume.min(self.capacity_l);
            AdvanceOutcome::Nominal
        };
        self.current_volume_l = volume;

        debug_assert!(
            self.current_volume_l >= 0.0 && self.current_volume_l <= self.capacity_l,
            "tub volume {} outside [0, {}]",
            self.current_volume_l,
            self.capacity_l
        );

        outcome
    }

    pub fn snapshot(&self) -> BathtubSnapshot {
        BathtubSnapshot {
            capacity_l: self.capacity_l,
            current_volume_l: self.current_volume_l,
            stopper_closed: self.stopper_closed,
            fill_target_l: self.fill_target_l,
        }
    }
}
