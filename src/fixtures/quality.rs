use crate::config::QualityBounds;
use serde::{Deserialize, Serialize};

/// Most recent water quality sample. No history is kept: each sensor report
/// overwrites the previous one wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterQuality {
    pub ph: f64,
    pub chlorides_mg_l: f64,
    pub iron_mg_l: f64,
    pub calcium_mg_l: f64,
    pub color: f64,
}

impl WaterQuality {
    /// Pure acceptability predicate against the configured windows.
    pub fn is_acceptable(&self, bounds: &QualityBounds) -> bool {
        in_window(self.ph, bounds.ph)
            && in_window(self.chlorides_mg_l, bounds.chlorides_mg_l)
            && in_window(self.iron_mg_l, bounds.iron_mg_l)
            && in_window(self.calcium_mg_l, bounds.calcium_mg_l)
            && in_window(self.color, bounds.color)
    }
}

fn in_window(value: f64, (lo, hi): (f64, f64)) -> bool {
    value >= lo && value <= hi
}

/// Holds the last sample. Storing a sample does not enforce the predicate;
/// enforcement happens on the next tick, so a bad sample can coexist with
/// open pipes for up to one tick interval.
#[derive(Debug, Default)]
pub struct QualityMonitor {
    sample: Option<WaterQuality>,
}

impl QualityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: WaterQuality) {
        self.sample = Some(sample);
    }

    pub fn sample(&self) -> Option<WaterQuality> {
        self.sample
    }

    /// True only when a sample exists and fails the predicate. Quality
    /// checks are skipped until the first sensor report arrives.
    pub fn demands_shutoff(&self, bounds: &QualityBounds) -> bool {
        matches!(self.sample, Some(s) if !s.is_acceptable(bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_sample() -> WaterQuality {
        WaterQuality {
            ph: 7.0,
            chlorides_mg_l: 300.0,
            iron_mg_l: 0.2,
            calcium_mg_l: 140.0,
            color: 20.0,
        }
    }

    #[test]
    fn acceptable_within_all_windows() {
        let bounds = QualityBounds::default();
        assert!(good_sample().is_acceptable(&bounds));
    }

    #[test]
    fn single_field_out_of_window_rejects() {
        let bounds = QualityBounds::default();

        let mut s = good_sample();
        s.ph = 9.0;
        assert!(!s.is_acceptable(&bounds));

        let mut s = good_sample();
        s.iron_mg_l = 0.05;
        assert!(!s.is_acceptable(&bounds));

        let mut s = good_sample();
        s.color = 31.0;
        assert!(!s.is_acceptable(&bounds));
    }

    #[test]
    fn no_sample_means_no_shutoff() {
        let bounds = QualityBounds::default();
        let mut monitor = QualityMonitor::new();
        assert!(!monitor.demands_shutoff(&bounds));

        let mut bad = good_sample();
        bad.ph = 9.0;
        monitor.record(bad);
        assert!(monitor.demands_shutoff(&bounds));

        monitor.record(good_sample());
        assert!(!monitor.demands_shutoff(&bounds));
    }
}
