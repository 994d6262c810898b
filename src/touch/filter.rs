use super::history::CircularHistory;

pub const HISTORY_LEN: usize = 5;

/// Output of one filter step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FilteredSample {
    /// Raw distance of this sample.
    pub distance: f32,
    pub average_distance: f32,
    pub average_confidence: f32,
    pub smoothed_distance: f32,
}

/// Two-stage smoothing of the pinch distance: a moving average over the last
/// `HISTORY_LEN` samples, then exponential smoothing of that average.
/// Confidence only gets the moving average.
#[derive(Clone, Debug, Default)]
pub struct DistanceFilter {
    distances: CircularHistory<f32, HISTORY_LEN>,
    confidences: CircularHistory<f32, HISTORY_LEN>,
    smoothed_distance: f32,
}

impl DistanceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A non-finite `distance` is left out of the history and the smoothing.
    /// Until a finite distance has been seen, the reported smoothed distance
    /// is infinite so the sample never reads as contact.
    pub fn observe(&mut self, distance: f32, confidence: f32, smoothing_factor: f32) -> FilteredSample {
        if distance.is_finite() {
            self.distances.push(distance);
        }
        self.confidences.push(confidence);

        let average_distance = self.distances.mean();
        let average_confidence = self.confidences.mean();
        if distance.is_finite() {
            self.smoothed_distance =
                lerp(self.smoothed_distance, average_distance, smoothing_factor);
        }

        let smoothed_distance = if self.distances.is_empty() {
            f32::INFINITY
        } else {
            self.smoothed_distance
        };

        FilteredSample {
            distance,
            average_distance,
            average_confidence,
            smoothed_distance,
        }
    }

    pub fn smoothed_distance(&self) -> f32 {
        self.smoothed_distance
    }

    pub fn reset(&mut self) {
        self.distances.clear();
        self.confidences.clear();
        self.smoothed_distance = 0.0;
    }
}

// `t` is clamped to [0, 1] so an out-of-range factor never extrapolates.
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_moves_from_zero_by_factor() {
        let mut filter = DistanceFilter::new();
        let out = filter.observe(0.01, 0.9, 0.8);

        assert!((out.average_distance - 0.01).abs() < 1e-7);
        assert!((out.smoothed_distance - 0.008).abs() < 1e-7);
        assert!((out.average_confidence - 0.9).abs() < 1e-7);
    }

    #[test]
    fn factor_one_follows_the_moving_average() {
        let mut filter = DistanceFilter::new();
        filter.observe(0.02, 1.0, 1.0);
        let out = filter.observe(0.04, 0.5, 1.0);

        assert!((out.smoothed_distance - 0.03).abs() < 1e-7);
        assert!((out.average_confidence - 0.75).abs() < 1e-7);
    }

    #[test]
    fn spike_ages_out_after_history_len_samples() {
        let mut filter = DistanceFilter::new();
        filter.observe(1.0, 1.0, 1.0);
        for _ in 0..HISTORY_LEN - 1 {
            let out = filter.observe(0.0, 1.0, 1.0);
            assert!(out.average_distance > 0.0);
        }
        let out = filter.observe(0.0, 1.0, 1.0);
        assert_eq!(out.average_distance, 0.0);
        assert_eq!(out.smoothed_distance, 0.0);
    }

    #[test]
    fn out_of_range_factor_is_clamped() {
        let mut filter = DistanceFilter::new();
        let out = filter.observe(0.02, 1.0, 3.0);
        assert!((out.smoothed_distance - 0.02).abs() < 1e-7);

        let mut frozen = DistanceFilter::new();
        let out = frozen.observe(0.02, 1.0, -1.0);
        assert_eq!(out.smoothed_distance, 0.0);
    }

    #[test]
    fn non_finite_distance_leaves_smoothing_untouched() {
        let mut filter = DistanceFilter::new();
        let out = filter.observe(f32::NAN, 1.0, 0.8);
        assert!(out.distance.is_nan());
        assert_eq!(out.smoothed_distance, f32::INFINITY);
        assert_eq!(filter.smoothed_distance(), 0.0);

        filter.observe(0.01, 1.0, 1.0);
        let out = filter.observe(f32::INFINITY, 0.9, 1.0);
        assert!((out.smoothed_distance - 0.01).abs() < 1e-7);
        assert!((out.average_distance - 0.01).abs() < 1e-7);
        assert!((out.average_confidence - 0.95).abs() < 1e-6);

        let out = filter.observe(0.03, 1.0, 1.0);
        assert!((out.smoothed_distance - 0.02).abs() < 1e-7);
    }

    #[test]
    fn reset_forgets_history_and_smoothing() {
        let mut filter = DistanceFilter::new();
        filter.observe(0.5, 0.2, 0.8);
        filter.reset();
        assert_eq!(filter.smoothed_distance(), 0.0);

        let out = filter.observe(0.01, 1.0, 0.5);
        assert!((out.average_distance - 0.01).abs() < 1e-7);
        assert!((out.average_confidence - 1.0).abs() < 1e-7);
        assert!((out.smoothed_distance - 0.005).abs() < 1e-7);
    }
}
