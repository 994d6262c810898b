use statig::blocking::IntoStateMachineExt as _;

mod hsm;

use hsm::PinchHsm;

use super::{config::TouchDetectionSettings, types::TouchState};

#[derive(Clone, Copy, Debug)]
enum PinchHsmEvent {
    /// One filtered sample: smoothed distance and averaged confidence.
    Sample {
        now: f64,
        distance: f32,
        confidence: f32,
    },
}

#[derive(Clone, Copy, Debug)]
struct DispatchContext {
    settings: TouchDetectionSettings,
    state: TouchState,
    duration: f64,
}

impl DispatchContext {
    fn new(settings: TouchDetectionSettings, state: TouchState) -> Self {
        Self {
            settings,
            state,
            duration: 0.0,
        }
    }

    fn enter(&mut self, state: TouchState, duration: f64) {
        self.state = state;
        self.duration = duration;
    }

    // NaN counts as low confidence.
    fn is_confident(&self, confidence: f32) -> bool {
        confidence >= self.settings.min_confidence
    }

    fn finish(self, previous: TouchState) -> PinchStep {
        PinchStep {
            previous,
            state: self.state,
            duration: self.duration,
        }
    }
}

/// Result of one state machine step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PinchStep {
    pub(crate) previous: TouchState,
    pub(crate) state: TouchState,
    /// Seconds since the touch started while `Started`/`Active`, else 0.
    pub(crate) duration: f64,
}

impl PinchStep {
    pub(crate) fn changed(&self) -> bool {
        self.previous != self.state
    }
}

/// Touch state machine driven by already-filtered samples.
pub(crate) struct PinchEngine {
    machine: statig::blocking::StateMachine<PinchHsm>,
    state: TouchState,
}

impl Default for PinchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PinchEngine {
    pub(crate) fn new() -> Self {
        Self {
            machine: PinchHsm::new().state_machine(),
            state: TouchState::None,
        }
    }

    pub(crate) fn tick(
        &mut self,
        now: f64,
        distance: f32,
        confidence: f32,
        settings: TouchDetectionSettings,
    ) -> PinchStep {
        let previous = self.state;
        let mut context = DispatchContext::new(settings, previous);
        self.machine.handle_with_context(
            &PinchHsmEvent::Sample {
                now,
                distance,
                confidence,
            },
            &mut context,
        );
        let step = context.finish(previous);
        self.state = step.state;
        step
    }

    pub(crate) fn state(&self) -> TouchState {
        self.state
    }

    pub(crate) fn reset(&mut self) {
        self.machine = PinchHsm::new().state_machine();
        self.state = TouchState::None;
    }
}
