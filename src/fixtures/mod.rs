pub mod bathtub;
pub mod pipes;
pub mod quality;
pub mod salt;

pub use bathtub::BathtubModel;
pub use pipes::{PipeBank, PipeState};
pub use quality::{QualityMonitor, WaterQuality};
pub use salt::SaltSystem;

use serde::{Deserialize, Serialize};

/// Selects one of the two water sources. Each has its own debit ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipeKind {
    Bath,
    Shower,
}

impl PipeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipeKind::Bath => "bath",
            PipeKind::Shower => "shower",
        }
    }
}

impl core::fmt::Display for PipeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for PipeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bath" => Ok(PipeKind::Bath),
            "shower" => Ok(PipeKind::Shower),
            _ => Err(()),
        }
    }
}
