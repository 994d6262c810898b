/// World-space position in meters.
pub type Vec3 = [f32; 3];

pub fn distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Discrete pinch state.
///
/// The cycle is `None -> Started -> Active -> Ended -> None`. `Ended` is held
/// for up to `max_touch_gap` seconds before falling back to `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TouchState {
    /// No contact.
    #[default]
    None,
    /// Threshold crossed inward on this sample.
    Started,
    /// Sustained contact.
    Active,
    /// Threshold crossed outward; held while the gap window is open.
    Ended,
}

impl TouchState {
    pub fn is_touching(self) -> bool {
        matches!(self, Self::Started | Self::Active)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Started => "started",
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "started" => Some(Self::Started),
            "active" => Some(Self::Active),
            "ended" => Some(Self::Ended),
            _ => None,
        }
    }
}

impl core::fmt::Display for TouchState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot produced by every detector update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchEvent {
    pub state: TouchState,
    /// Index fingertip position of the sample.
    pub position: Vec3,
    /// 0 at the pinch threshold, 1 at zero distance.
    pub strength: f32,
    /// Seconds since the touch started; 0 unless `Started` or `Active`.
    pub duration: f64,
    pub timestamp: f64,
    /// Averaged tracking confidence.
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let d = distance([0.0, 0.0, 0.0], [0.03, 0.04, 0.0]);
        assert!((d - 0.05).abs() < 1e-6);
        assert_eq!(distance([1.0, 2.0, 3.0], [1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn labels_round_trip_through_parser() {
        for state in [
            TouchState::None,
            TouchState::Started,
            TouchState::Active,
            TouchState::Ended,
        ] {
            assert_eq!(TouchState::from_label(state.as_str()), Some(state));
        }
        assert_eq!(TouchState::from_label(" Active "), Some(TouchState::Active));
        assert_eq!(TouchState::from_label("pressed"), None);
    }

    #[test]
    fn only_started_and_active_count_as_touching() {
        assert!(!TouchState::None.is_touching());
        assert!(TouchState::Started.is_touching());
        assert!(TouchState::Active.is_touching());
        assert!(!TouchState::Ended.is_touching());
    }
}
