//! Pinch-touch detection for hand-tracked drawing.
//!
//! Raw index/thumb fingertip positions and a tracking confidence go in, once
//! per tracking frame; a debounced `None -> Started -> Active -> Ended`
//! touch state and a per-sample [`TouchEvent`] come out.

pub mod touch;

pub use touch::{
    clock::{Clock, ManualClock, MonotonicClock},
    config::{load_settings, parse_settings_str, SettingsError, TouchDetectionSettings},
    history::CircularHistory,
    pinch_strength,
    tracker::{Hand, HandSample, HandTouchTracker},
    types::{distance, TouchEvent, TouchState, Vec3},
    TouchStateDetector,
};
