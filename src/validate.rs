//! Pure bound checks, run before any state is mutated. A failed check leaves
//! no partial state behind.

use crate::config::BathLimits;
use crate::error::{ControlError, ControlResult};
use crate::fixtures::{PipeKind, PipeState};
use crate::profile::UserProfile;

/// Checks a requested pipe state against the fixture limits.
///
/// An open pipe must respect the per-pipe debit ceiling and the water
/// temperature window; a closed pipe must carry zero temperature and debit.
pub fn check_pipe_state(
    kind: PipeKind,
    state: &PipeState,
    limits: &BathLimits,
) -> ControlResult<()> {
    if state.on {
        let max_lps = match kind {
            PipeKind::Bath => limits.max_bath_debit_lps,
            PipeKind::Shower => limits.max_shower_debit_lps,
        };
        // An open pipe must actually flow: zero or negative debit is as
        // invalid as exceeding the ceiling.
        if state.debit_lps <= 0.0 || state.debit_lps > max_lps {
            return Err(ControlError::DebitExceeded {
                pipe: kind,
                debit_lps: state.debit_lps,
                max_lps,
            });
        }
        check_temperature(state.temperature_c, limits)?;
    } else if state.temperature_c != 0.0 || state.debit_lps != 0.0 {
        return Err(ControlError::InvalidOffState { pipe: kind });
    }
    Ok(())
}

/// Checks a water temperature against the configured window.
pub fn check_temperature(temperature_c: f64, limits: &BathLimits) -> ControlResult<()> {
    if temperature_c < limits.min_temperature_c || temperature_c > limits.max_temperature_c {
        return Err(ControlError::TemperatureOutOfRange {
            temperature_c,
            min_c: limits.min_temperature_c,
            max_c: limits.max_temperature_c,
        });
    }
    Ok(())
}

/// Checks profile fields: weight bounds and both preferred temperatures.
pub fn check_profile(profile: &UserProfile, limits: &BathLimits) -> ControlResult<()> {
    if profile.weight_kg < limits.min_weight_kg || profile.weight_kg > limits.max_weight_kg {
        return Err(ControlError::WeightOutOfRange {
            weight_kg: profile.weight_kg,
            min_kg: limits.min_weight_kg,
            max_kg: limits.max_weight_kg,
        });
    }
    check_temperature(profile.bath_temperature_c, limits)?;
    check_temperature(profile.shower_temperature_c, limits)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_pipe_bounds() {
        let limits = BathLimits::default();

        // At the ceiling is accepted.
        let state = PipeState::open(38.0, 0.25);
        assert!(check_pipe_state(PipeKind::Bath, &state, &limits).is_ok());

        // The bath ceiling exceeds the shower ceiling.
        assert!(matches!(
            check_pipe_state(PipeKind::Shower, &state, &limits),
            Err(ControlError::DebitExceeded { .. })
        ));

        // An open pipe with no flow is rejected.
        let stagnant = PipeState::open(38.0, 0.0);
        assert!(matches!(
            check_pipe_state(PipeKind::Bath, &stagnant, &limits),
            Err(ControlError::DebitExceeded { .. })
        ));

        let cold = PipeState::open(4.9, 0.1);
        assert!(matches!(
            check_pipe_state(PipeKind::Bath, &cold, &limits),
            Err(ControlError::TemperatureOutOfRange { .. })
        ));

        let scalding = PipeState::open(50.1, 0.1);
        assert!(matches!(
            check_pipe_state(PipeKind::Bath, &scalding, &limits),
            Err(ControlError::TemperatureOutOfRange { .. })
        ));
    }

    #[test]
    fn off_pipe_must_carry_zeros() {
        let limits = BathLimits::default();
        assert!(check_pipe_state(PipeKind::Bath, &PipeState::OFF, &limits).is_ok());

        let leaky = PipeState {
            on: false,
            temperature_c: 0.0,
            debit_lps: 0.1,
        };
        assert!(matches!(
            check_pipe_state(PipeKind::Shower, &leaky, &limits),
            Err(ControlError::InvalidOffState { .. })
        ));

        let warm = PipeState {
            on: false,
            temperature_c: 20.0,
            debit_lps: 0.0,
        };
        assert!(matches!(
            check_pipe_state(PipeKind::Bath, &warm, &limits),
            Err(ControlError::InvalidOffState { .. })
        ));
    }

    #[test]
    fn profile_bounds() {
        let limits = BathLimits::default();
        let profile = UserProfile {
            weight_kg: 70.0,
            bath_temperature_c: 38.0,
            shower_temperature_c: 40.0,
        };
        assert!(check_profile(&profile, &limits).is_ok());

        let heavy = UserProfile {
            weight_kg: 121.0,
            ..profile
        };
        assert!(matches!(
            check_profile(&heavy, &limits),
            Err(ControlError::WeightOutOfRange { .. })
        ));

        let tepid = UserProfile {
            shower_temperature_c: 55.0,
            ..profile
        };
        assert!(matches!(
            check_profile(&tepid, &limits),
            Err(ControlError::TemperatureOutOfRange { .. })
        ));
    }
}
