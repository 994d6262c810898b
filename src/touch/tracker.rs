use log::debug;

use super::{
    clock::Clock,
    config::TouchDetectionSettings,
    types::{TouchEvent, TouchState, Vec3},
    TouchStateDetector,
};

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// One hand-tracking frame for a single hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandSample {
    pub index_tip: Vec3,
    pub thumb_tip: Vec3,
    /// Tracking confidence (0.0-1.0).
    pub confidence: f32,
    /// Whether the tracker currently sees this hand.
    pub tracked: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct HandTrackingState {
    /// Set once the detector has been reset for the current loss.
    lost: bool,
}

/// Pinch detection for both hands.
///
/// Losing tracking on a hand resets its detector once, so a gesture cannot
/// resume from stale history when the hand comes back.
pub struct HandTouchTracker<C: Clock + Clone> {
    left: TouchStateDetector<C>,
    right: TouchStateDetector<C>,
    left_tracking: HandTrackingState,
    right_tracking: HandTrackingState,
}

impl<C: Clock + Clone> HandTouchTracker<C> {
    pub fn new(settings: TouchDetectionSettings, clock: C) -> Self {
        Self {
            left: TouchStateDetector::with_clock(settings, clock.clone()),
            right: TouchStateDetector::with_clock(settings, clock),
            left_tracking: HandTrackingState::default(),
            right_tracking: HandTrackingState::default(),
        }
    }

    /// Feeds a sample stamped with the shared clock.
    pub fn update(&mut self, hand: Hand, sample: HandSample) -> Option<TouchEvent> {
        let now = self.detector(hand).clock().now();
        self.update_at(now, hand, sample)
    }

    /// Returns `None` while the hand is not tracked.
    pub fn update_at(&mut self, now: f64, hand: Hand, sample: HandSample) -> Option<TouchEvent> {
        let (detector, tracking) = self.parts_mut(hand);
        if !sample.tracked {
            if !tracking.lost {
                debug!(
                    "pinch: {} hand lost in state {}, resetting",
                    hand.as_str(),
                    detector.current_state()
                );
                detector.reset_state();
                tracking.lost = true;
            }
            return None;
        }

        tracking.lost = false;
        Some(detector.update_at(now, sample.index_tip, sample.thumb_tip, sample.confidence))
    }

    pub fn state(&self, hand: Hand) -> TouchState {
        self.detector(hand).current_state()
    }

    pub fn detector(&self, hand: Hand) -> &TouchStateDetector<C> {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn update_settings(&mut self, settings: TouchDetectionSettings) {
        self.left.update_settings(settings);
        self.right.update_settings(settings);
    }

    pub fn reset_all(&mut self) {
        self.left.reset_state();
        self.right.reset_state();
        self.left_tracking = HandTrackingState::default();
        self.right_tracking = HandTrackingState::default();
    }

    fn parts_mut(&mut self, hand: Hand) -> (&mut TouchStateDetector<C>, &mut HandTrackingState) {
        match hand {
            Hand::Left => (&mut self.left, &mut self.left_tracking),
            Hand::Right => (&mut self.right, &mut self.right_tracking),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::clock::ManualClock;
    use super::*;

    fn pinch(tracked: bool) -> HandSample {
        HandSample {
            index_tip: [0.0, 0.0, 0.005],
            thumb_tip: [0.0, 0.0, 0.0],
            confidence: 1.0,
            tracked,
        }
    }

    fn tracker() -> HandTouchTracker<ManualClock> {
        HandTouchTracker::new(TouchDetectionSettings::default(), ManualClock::new(0.0))
    }

    #[test]
    fn hands_are_independent() {
        let mut tracker = tracker();
        tracker.update_at(0.0, Hand::Left, pinch(true));
        tracker.update_at(0.02, Hand::Left, pinch(true));

        assert_eq!(tracker.state(Hand::Left), TouchState::Active);
        assert_eq!(tracker.state(Hand::Right), TouchState::None);
    }

    #[test]
    fn tracking_loss_resets_the_hand() {
        let mut tracker = tracker();
        tracker.update_at(0.0, Hand::Right, pinch(true));
        tracker.update_at(0.02, Hand::Right, pinch(true));
        tracker.update_at(0.0, Hand::Left, pinch(true));

        assert_eq!(tracker.update_at(0.04, Hand::Right, pinch(false)), None);
        assert_eq!(tracker.state(Hand::Right), TouchState::None);
        assert_eq!(tracker.detector(Hand::Right).smoothed_distance(), 0.0);
        assert_eq!(tracker.state(Hand::Left), TouchState::Started);

        let event = tracker
            .update_at(0.06, Hand::Right, pinch(true))
            .expect("tracked sample yields an event");
        assert_eq!(event.state, TouchState::Started);
    }

    #[test]
    fn repeated_loss_resets_only_once() {
        let mut tracker = tracker();
        tracker.update_at(0.0, Hand::Left, pinch(true));
        tracker.update_at(0.02, Hand::Left, pinch(true));
        tracker.update_at(0.0, Hand::Right, pinch(true));
        tracker.update_at(0.02, Hand::Right, pinch(true));

        for t in [0.04, 0.06, 0.08] {
            assert_eq!(tracker.update_at(t, Hand::Right, pinch(false)), None);
            assert_eq!(tracker.state(Hand::Right), TouchState::None);
        }
        assert_eq!(tracker.state(Hand::Left), TouchState::Active);
        assert!(tracker.detector(Hand::Left).smoothed_distance() > 0.0);

        let left = tracker
            .update_at(0.08, Hand::Left, pinch(true))
            .expect("left hand still tracked");
        assert_eq!(left.state, TouchState::Active);

        let right = tracker
            .update_at(0.10, Hand::Right, pinch(true))
            .expect("tracked sample yields an event");
        assert_eq!(right.state, TouchState::Started);
    }

    #[test]
    fn update_uses_shared_clock() {
        let clock = ManualClock::new(1.0);
        let mut tracker = HandTouchTracker::new(TouchDetectionSettings::default(), clock.clone());
        let left = tracker.update(Hand::Left, pinch(true)).expect("tracked");
        clock.advance(0.1);
        let right = tracker.update(Hand::Right, pinch(true)).expect("tracked");

        assert_eq!(left.timestamp, 1.0);
        assert!((right.timestamp - 1.1).abs() < 1e-9);
    }

    #[test]
    fn settings_apply_to_both_hands() {
        let mut tracker = tracker();
        let settings = TouchDetectionSettings {
            min_confidence: 0.9,
            ..TouchDetectionSettings::default()
        };
        tracker.update_settings(settings);

        assert_eq!(tracker.detector(Hand::Left).settings(), &settings);
        assert_eq!(tracker.detector(Hand::Right).settings(), &settings);
    }

    #[test]
    fn reset_all_clears_both_hands() {
        let mut tracker = tracker();
        tracker.update_at(0.0, Hand::Left, pinch(true));
        tracker.update_at(0.0, Hand::Right, pinch(true));
        tracker.reset_all();

        assert_eq!(tracker.state(Hand::Left), TouchState::None);
        assert_eq!(tracker.state(Hand::Right), TouchState::None);
    }
}
