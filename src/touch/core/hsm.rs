use super::*;
use statig::prelude::*;

pub(super) struct PinchHsm {
    touch_start: f64,
    last_touch_end: f64,
}

#[state_machine(initial = "State::idle()")]
impl PinchHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &PinchHsmEvent) -> Outcome<State> {
        match event {
            PinchHsmEvent::Sample {
                now,
                distance,
                confidence,
            } => {
                if context.is_confident(*confidence)
                    && *distance <= context.settings.entry_threshold()
                {
                    self.begin_touch(*now);
                    context.enter(TouchState::Started, 0.0);
                    return Transition(State::started());
                }
                context.enter(TouchState::None, 0.0);
                Handled
            }
        }
    }

    #[state]
    fn started(&mut self, context: &mut DispatchContext, event: &PinchHsmEvent) -> Outcome<State> {
        match event {
            PinchHsmEvent::Sample {
                now,
                distance,
                confidence,
            } => self.on_contact_sample(context, *now, *distance, *confidence, false),
        }
    }

    #[state]
    fn active(&mut self, context: &mut DispatchContext, event: &PinchHsmEvent) -> Outcome<State> {
        match event {
            PinchHsmEvent::Sample {
                now,
                distance,
                confidence,
            } => self.on_contact_sample(context, *now, *distance, *confidence, true),
        }
    }

    #[state]
    fn ended(&mut self, context: &mut DispatchContext, event: &PinchHsmEvent) -> Outcome<State> {
        match event {
            PinchHsmEvent::Sample {
                now,
                distance,
                confidence,
            } => {
                if !context.is_confident(*confidence) {
                    context.enter(TouchState::None, 0.0);
                    return Transition(State::idle());
                }

                let gap = *now - self.last_touch_end;
                let max_gap = context.settings.max_touch_gap;
                // A re-pinch inside the gap window does not start a new touch;
                // the window has to elapse first.
                if *distance <= context.settings.entry_threshold() && gap >= max_gap {
                    self.begin_touch(*now);
                    context.enter(TouchState::Started, 0.0);
                    Transition(State::started())
                } else if gap < max_gap {
                    context.enter(TouchState::Ended, 0.0);
                    Handled
                } else {
                    context.enter(TouchState::None, 0.0);
                    Transition(State::idle())
                }
            }
        }
    }
}

impl PinchHsm {
    pub(super) fn new() -> Self {
        Self {
            touch_start: 0.0,
            last_touch_end: 0.0,
        }
    }

    fn begin_touch(&mut self, now: f64) {
        self.touch_start = now;
    }

    fn touch_duration(&self, now: f64) -> f64 {
        (now - self.touch_start).max(0.0)
    }

    /// Shared by `started` and `active`: both use the exit threshold and
    /// both collapse into `Active` while contact holds.
    fn on_contact_sample(
        &mut self,
        context: &mut DispatchContext,
        now: f64,
        distance: f32,
        confidence: f32,
        already_active: bool,
    ) -> Outcome<State> {
        if !context.is_confident(confidence) {
            context.enter(TouchState::None, 0.0);
            return Transition(State::idle());
        }

        let should_touch = distance <= context.settings.exit_threshold();
        let duration = self.touch_duration(now);
        if !should_touch && now - self.touch_start >= context.settings.min_touch_duration {
            self.last_touch_end = now;
            context.enter(TouchState::Ended, 0.0);
            return Transition(State::ended());
        }

        // Either still in contact, or separated too early to count as a
        // release: the touch stays alive.
        context.enter(TouchState::Active, duration);
        if already_active {
            Handled
        } else {
            Transition(State::active())
        }
    }
}
