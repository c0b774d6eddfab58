//! Slip analysis of a finished run

use super::record::TestSample;

/// Totals and peaks over a run's samples
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunSummary {
    /// Number of samples analysed
    pub samples: usize,
    /// Wheel-side distance at the last sample (m)
    pub final_wheel_m: f32,
    /// Swivel-side distance at the last sample (m)
    pub final_swivel_m: f32,
    /// Highest wheel-side speed (m/s)
    pub peak_wheel_speed_m_s: f32,
    /// Highest swivel-side speed (m/s)
    pub peak_swivel_speed_m_s: f32,
    /// `(wheel - swivel) / wheel` at the last sample, in percent
    ///
    /// `None` when the wheel did not move.
    pub slip_percent: Option<f32>,
}

impl RunSummary {
    /// Analyse samples in time order
    pub fn from_samples(samples: &[TestSample]) -> Self {
        let mut summary = Self {
            samples: samples.len(),
            ..Self::default()
        };

        for s in samples {
            summary.peak_wheel_speed_m_s = summary.peak_wheel_speed_m_s.max(s.wheel_speed_m_s);
            summary.peak_swivel_speed_m_s =
                summary.peak_swivel_speed_m_s.max(s.swivel_speed_m_s);
        }

        if let Some(last) = samples.last() {
            summary.final_wheel_m = last.wheel_distance_m;
            summary.final_swivel_m = last.swivel_distance_m;
            summary.slip_percent = slip_percent(last.wheel_distance_m, last.swivel_distance_m);
        }

        summary
    }
}

/// Relative shortfall of the swivel distance against the wheel distance
pub fn slip_percent(wheel_m: f32, swivel_m: f32) -> Option<f32> {
    if wheel_m.is_nan() || wheel_m <= 0.0 || !swivel_m.is_finite() {
        return None;
    }
    Some((wheel_m - swivel_m) / wheel_m * 100.0)
}
