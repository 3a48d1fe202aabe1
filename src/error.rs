use crate::fixtures::PipeKind;
use thiserror::Error;

/// Result alias for control core operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Validation and gating failures returned to the immediate caller.
///
/// These are rejections, not faults: none of them is retried internally and
/// none crashes the process. Autonomous tick shutoffs never produce one of
/// these — they clamp or force state instead, since there is no caller to
/// report to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("debit {debit_lps} L/s exceeds {pipe} ceiling of {max_lps} L/s")]
    DebitExceeded {
        pipe: PipeKind,
        debit_lps: f64,
        max_lps: f64,
    },

    #[error("temperature {temperature_c} °C outside [{min_c}, {max_c}] °C")]
    TemperatureOutOfRange {
        temperature_c: f64,
        min_c: f64,
        max_c: f64,
    },

    #[error("{pipe} turned off with nonzero temperature or debit")]
    InvalidOffState { pipe: PipeKind },

    #[error("a fill target is already set")]
    AlreadyPreparing,

    #[error("fill target {target_l} L exceeds tub capacity {capacity_l} L")]
    TargetExceedsCapacity { target_l: f64, capacity_l: f64 },

    #[error("fill target {target_l} L already reached at volume {volume_l} L")]
    AlreadyFull { target_l: f64, volume_l: f64 },

    #[error("no active profile selected")]
    NoActiveProfile,

    #[error("profile '{name}' already exists")]
    ProfileExists { name: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("weight {weight_kg} kg outside [{min_kg}, {max_kg}] kg")]
    WeightOutOfRange {
        weight_kg: f64,
        min_kg: f64,
        max_kg: f64,
    },

    #[error("salt reservoir is empty")]
    NoSalt,

    #[error("tub volume too low to run the salt pump")]
    VolumeTooLow,
}

impl ControlError {
    /// Stable kind name used in wire responses so callers can branch on the
    /// kind rather than on message text.
    pub fn kind(&self) -> &'static str {
        match self {
            ControlError::DebitExceeded { .. } => "DebitExceeded",
            ControlError::TemperatureOutOfRange { .. } => "TemperatureOutOfRange",
            ControlError::InvalidOffState { .. } => "InvalidOffState",
            ControlError::AlreadyPreparing => "AlreadyPreparing",
            ControlError::TargetExceedsCapacity { .. } => "TargetExceedsCapacity",
            ControlError::AlreadyFull { .. } => "AlreadyFull",
            ControlError::NoActiveProfile => "NoActiveProfile",
            ControlError::ProfileExists { .. } => "ProfileExists",
            ControlError::ProfileNotFound { .. } => "ProfileNotFound",
            ControlError::WeightOutOfRange { .. } => "WeightOutOfRange",
            ControlError::NoSalt => "NoSalt",
            ControlError::VolumeTooLow => "VolumeTooLow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_context() {
        let err = ControlError::DebitExceeded {
            pipe: PipeKind::Bath,
            debit_lps: 0.3,
            max_lps: 0.25,
        };
        assert!(err.to_string().contains("0.3"));
        assert!(err.to_string().contains("bath"));

        let err = ControlError::ProfileNotFound { name: "ana".into() };
        assert!(err.to_string().contains("ana"));
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(ControlError::AlreadyPreparing.kind(), "AlreadyPreparing");
        assert_eq!(ControlError::NoSalt.kind(), "NoSalt");
        assert_eq!(
            ControlError::VolumeTooLow.kind(),
            "VolumeTooLow"
        );
    }
}
