use super::PipeKind;
use serde::{Deserialize, Serialize};

/// State of a single water source.
///
/// Invariant: a closed pipe always carries zero temperature and zero debit.
/// Setters validate this before any mutation; the force-off path restores it
/// unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeState {
    pub on: bool,
    pub temperature_c: f64,
    pub debit_lps: f64,
}

impl PipeState {
    pub const OFF: PipeState = PipeState {
        on: false,
        temperature_c: 0.0,
        debit_lps: 0.0,
    };

    pub fn open(temperature_c: f64, debit_lps: f64) -> Self {
        Self {
            on: true,
            temperature_c,
            debit_lps,
        }
    }

    /// Effective inflow contribution, liters per second.
    pub fn inflow_lps(&self) -> f64 {
        if self.on {
            self.debit_lps
        } else {
            0.0
        }
    }
}

impl Default for PipeState {
    fn default() -> Self {
        PipeState::OFF
    }
}

/// The two pipe states, owned by the control core and mutated only through
/// its validated setters or the tick's force-off path.
#[derive(Debug, Default)]
pub struct PipeBank {
    bath: PipeState,
    shower: PipeState,
}

impl PipeBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: PipeKind) -> PipeState {
        match kind {
            PipeKind::Bath => self.bath,
            PipeKind::Shower => self.shower,
        }
    }

    /// Stores an already-validated state. Callers run the validator first.
    pub fn store(&mut self, kind: PipeKind, state: PipeState) {
        debug_assert!(
            state.on || (state.temperature_c == 0.0 && state.debit_lps == 0.0),
            "off pipe stored with nonzero temperature or debit"
        );
        match kind {
            PipeKind::Bath => self.bath = state,
            PipeKind::Shower => self.shower = state,
        }
    }

    /// Shuts a pipe without validation. The off state is always valid, so
    /// the tick's autonomous shutoffs reuse this path. Returns whether the
    /// pipe was open.
    pub fn force_off(&mut self, kind: PipeKind) -> bool {
        let was_on = self.get(kind).on;
        self.store(kind, PipeState::OFF);
        was_on
    }

    /// Combined inflow of both pipes, liters per second.
    pub fn total_inflow_lps(&self) -> f64 {
        self.bath.inflow_lps() + self.shower.inflow_lps()
    }

    pub fn any_on(&self) -> bool {
        self.bath.on || self.shower.on
    }
}
