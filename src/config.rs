use serde::{Deserialize, Serialize};

/// Physical limits of the fixture.
///
/// These were ambient constants in earlier revisions; they are carried as
/// explicit configuration so the controller and adapters receive them at
/// construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BathLimits {
    /// Maximum bath pipe debit in liters per second.
    pub max_bath_debit_lps: f64,
    /// Maximum shower pipe debit in liters per second.
    pub max_shower_debit_lps: f64,
    /// Drain speed when the stopper is lifted, liters per second.
    pub drain_speed_lps: f64,
    /// Minimum water temperature for an open pipe, °C.
    pub min_temperature_c: f64,
    /// Maximum water temperature for an open pipe, °C.
    pub max_temperature_c: f64,
    /// Bathtub capacity in liters.
    pub tub_capacity_l: f64,
    /// Human body density used for fill-target sizing, kg/L.
    pub body_density_kg_per_l: f64,
    /// Minimum fill ratio (volume / capacity) required to run the salt pump.
    pub min_pump_volume_ratio: f64,
    /// Profile weight bounds, kg.
    pub min_weight_kg: f64,
    pub max_weight_kg: f64,
    pub quality: QualityBounds,
}

/// Acceptance windows for water quality samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityBounds {
    pub ph: (f64, f64),
    pub chlorides_mg_l: (f64, f64),
    pub iron_mg_l: (f64, f64),
    pub calcium_mg_l: (f64, f64),
    pub color: (f64, f64),
}

impl Default for BathLimits {
    fn default() -> Self {
        Self {
            max_bath_debit_lps: 0.25,
            max_shower_debit_lps: 0.20,
            drain_speed_lps: 0.20,
            min_temperature_c: 5.0,
            max_temperature_c: 50.0,
            tub_capacity_l: 300.0,
            body_density_kg_per_l: 1.01,
            min_pump_volume_ratio: 0.25,
            min_weight_kg: 20.0,
            max_weight_kg: 120.0,
            quality: QualityBounds::default(),
        }
    }
}

impl Default for QualityBounds {
    fn default() -> Self {
        Self {
            ph: (6.5, 8.5),
            chlorides_mg_l: (250.0, 400.0),
            iron_mg_l: (0.1, 0.3),
            calcium_mg_l: (100.0, 180.0),
            color: (15.0, 30.0),
        }
    }
}

/// Full simulator configuration: physical limits plus process wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub limits: BathLimits,
    /// Initial default water temperature, °C. Used when a pipe is opened or
    /// a bath is prepared without an explicit temperature.
    pub default_temperature_c: f64,
    /// Simulation tick period in milliseconds.
    pub tick_period_ms: u64,
    /// TCP listen address for the command/sensor surface.
    pub listen_addr: String,
    /// Flat-file profile store path.
    pub profile_store_path: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            limits: BathLimits::default(),
            default_temperature_c: 20.0,
            tick_period_ms: 1000,
            listen_addr: "127.0.0.1:8080".to_string(),
            profile_store_path: "profiles.csv".to_string(),
        }
    }
}
