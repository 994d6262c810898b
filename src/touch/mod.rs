pub mod clock;
pub mod config;
mod core;
pub mod filter;
pub mod history;
pub mod tracker;
pub mod types;

use log::{debug, info};

use self::{
    clock::{Clock, MonotonicClock},
    config::TouchDetectionSettings,
    filter::DistanceFilter,
    types::{distance, TouchEvent, TouchState, Vec3},
};

type StateListener = Box<dyn FnMut(TouchState) + Send>;

/// Pinch detector for one index/thumb pair.
///
/// Drive it with one sample per tracking frame. Each sample goes through the
/// distance filter, then the touch state machine; every call yields a
/// [`TouchEvent`], and state changes are also reported to the optional
/// listener and through [`TouchStateDetector::last_transition`].
pub struct TouchStateDetector<C = MonotonicClock> {
    settings: TouchDetectionSettings,
    filter: DistanceFilter,
    engine: core::PinchEngine,
    clock: C,
    listener: Option<StateListener>,
    last_transition: Option<(TouchState, TouchState)>,
}

impl Default for TouchStateDetector<MonotonicClock> {
    fn default() -> Self {
        Self::new(TouchDetectionSettings::default())
    }
}

impl TouchStateDetector<MonotonicClock> {
    pub fn new(settings: TouchDetectionSettings) -> Self {
        Self::with_clock(settings, MonotonicClock::new())
    }
}

impl<C: Clock> TouchStateDetector<C> {
    pub fn with_clock(settings: TouchDetectionSettings, clock: C) -> Self {
        Self {
            settings,
            filter: DistanceFilter::new(),
            engine: core::PinchEngine::new(),
            clock,
            listener: None,
            last_transition: None,
        }
    }

    /// Processes a sample stamped with the detector's clock.
    pub fn update(&mut self, index_tip: Vec3, thumb_tip: Vec3, confidence: f32) -> TouchEvent {
        let now = self.clock.now();
        self.update_at(now, index_tip, thumb_tip, confidence)
    }

    /// Processes a sample taken at `now` seconds. Timestamps must not
    /// decrease between calls.
    pub fn update_at(
        &mut self,
        now: f64,
        index_tip: Vec3,
        thumb_tip: Vec3,
        confidence: f32,
    ) -> TouchEvent {
        let raw_distance = distance(index_tip, thumb_tip);
        let filtered = self
            .filter
            .observe(raw_distance, confidence, self.settings.smoothing_factor);

        let step = self.engine.tick(
            now,
            filtered.smoothed_distance,
            filtered.average_confidence,
            self.settings,
        );

        self.last_transition = None;
        if step.changed() {
            debug!(
                "pinch: {} -> {} t={:.3} raw={:.4} d={:.4} c={:.2}",
                step.previous,
                step.state,
                now,
                filtered.distance,
                filtered.smoothed_distance,
                filtered.average_confidence
            );
            self.last_transition = Some((step.previous, step.state));
            if let Some(listener) = self.listener.as_mut() {
                listener(step.state);
            }
        }

        TouchEvent {
            state: step.state,
            position: index_tip,
            strength: pinch_strength(filtered.smoothed_distance, self.settings.pinch_threshold),
            duration: step.duration,
            timestamp: now,
            confidence: filtered.average_confidence,
        }
    }

    /// Swaps the whole settings value. History and state are kept.
    pub fn update_settings(&mut self, settings: TouchDetectionSettings) {
        info!(
            "pinch: settings threshold={} hysteresis={} min_duration={} max_gap={} min_confidence={} smoothing={}",
            settings.pinch_threshold,
            settings.hysteresis,
            settings.min_touch_duration,
            settings.max_touch_gap,
            settings.min_confidence,
            settings.smoothing_factor
        );
        self.settings = settings;
    }

    /// Drops history, smoothing and timers. The listener is not notified.
    pub fn reset_state(&mut self) {
        self.filter.reset();
        self.engine.reset();
        self.last_transition = None;
    }

    pub fn current_state(&self) -> TouchState {
        self.engine.state()
    }

    pub fn settings(&self) -> &TouchDetectionSettings {
        &self.settings
    }

    pub fn smoothed_distance(&self) -> f32 {
        self.filter.smoothed_distance()
    }

    /// `(from, to)` of the transition made by the latest update, if any.
    pub fn last_transition(&self) -> Option<(TouchState, TouchState)> {
        self.last_transition
    }

    pub fn set_state_listener<F>(&mut self, listener: F)
    where
        F: FnMut(TouchState) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_state_listener(&mut self) {
        self.listener = None;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Linear falloff: 1 at zero distance, 0 at and beyond the threshold.
pub fn pinch_strength(smoothed_distance: f32, pinch_threshold: f32) -> f32 {
    if smoothed_distance < pinch_threshold {
        (1.0 - smoothed_distance / pinch_threshold).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
