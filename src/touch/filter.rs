//! Per-slot artifact filter.
//!
//! Each slot runs a small state machine whose state mirrors the finger state
//! of the slot's stored sample. A transition therefore means "the stored state
//! changed", which is exactly the condition state events fire on.

use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::types::FingerState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SlotVerdict {
    /// First sample for the slot; nothing to compare against.
    Seeded,
    /// Leading press frame swallowed by the frame-count filter.
    Suppressed,
    QualifyingPress { state_changed: bool },
    Released { state_changed: bool },
    Hover { state_changed: bool },
    /// Transitional or unknown sensor state, stored but not surfaced.
    Tracked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Pressed,
    Released,
    Hover,
    Transitional,
}

impl Phase {
    fn of(state: FingerState) -> Self {
        match state {
            FingerState::Pressed => Self::Pressed,
            FingerState::Released => Self::Released,
            FingerState::Hover => Self::Hover,
            FingerState::Pressing
            | FingerState::Releasing
            | FingerState::Tap
            | FingerState::Unrecognized => Self::Transitional,
        }
    }

    fn state(self) -> State {
        match self {
            Self::Pressed => State::pressed(),
            Self::Released => State::released(),
            Self::Hover => State::hover(),
            Self::Transitional => State::transitional(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum FilterEvent {
    Sample { state: FingerState },
}

#[derive(Clone, Copy, Debug)]
struct FilterContext {
    pressed_frames: u32,
    threshold: u32,
    verdict: SlotVerdict,
}

pub(crate) struct SlotFilter {
    machine: statig::blocking::StateMachine<SlotHsm>,
}

impl Default for SlotFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotFilter {
    pub(crate) fn new() -> Self {
        Self {
            machine: SlotHsm.state_machine(),
        }
    }

    /// Feeds one sample state through the filter.
    ///
    /// Takes the slot's current pressed-frame counter and returns the verdict
    /// together with the updated counter.
    pub(crate) fn observe(
        &mut self,
        state: FingerState,
        pressed_frames: u32,
        threshold: u32,
    ) -> (SlotVerdict, u32) {
        let mut context = FilterContext {
            pressed_frames,
            threshold,
            verdict: SlotVerdict::Tracked,
        };
        self.machine
            .handle_with_context(&FilterEvent::Sample { state }, &mut context);
        (context.verdict, context.pressed_frames)
    }
}

struct SlotHsm;

impl SlotHsm {
    fn step(
        &mut self,
        context: &mut FilterContext,
        state: FingerState,
        from: Phase,
    ) -> Outcome<State> {
        context.verdict = match state {
            FingerState::Pressed => {
                context.pressed_frames = context.pressed_frames.saturating_add(1);
                if context.pressed_frames > context.threshold {
                    context.pressed_frames = 0;
                    SlotVerdict::QualifyingPress {
                        state_changed: from != Phase::Pressed,
                    }
                } else {
                    SlotVerdict::Suppressed
                }
            }
            FingerState::Released => {
                context.pressed_frames = 0;
                SlotVerdict::Released {
                    state_changed: from != Phase::Released,
                }
            }
            FingerState::Hover => SlotVerdict::Hover {
                state_changed: from != Phase::Hover,
            },
            _ => SlotVerdict::Tracked,
        };

        let to = Phase::of(state);
        if to == from {
            Handled
        } else {
            Transition(to.state())
        }
    }
}

#[state_machine(initial = "State::unseen()")]
impl SlotHsm {
    #[state]
    fn unseen(&mut self, context: &mut FilterContext, event: &FilterEvent) -> Outcome<State> {
        match event {
            FilterEvent::Sample { state } => {
                context.verdict = SlotVerdict::Seeded;
                Transition(Phase::of(*state).state())
            }
        }
    }

    #[state]
    fn pressed(&mut self, context: &mut FilterContext, event: &FilterEvent) -> Outcome<State> {
        match event {
            FilterEvent::Sample { state } => self.step(context, *state, Phase::Pressed),
        }
    }

    #[state]
    fn released(&mut self, context: &mut FilterContext, event: &FilterEvent) -> Outcome<State> {
        match event {
            FilterEvent::Sample { state } => self.step(context, *state, Phase::Released),
        }
    }

    #[state]
    fn hover(&mut self, context: &mut FilterContext, event: &FilterEvent) -> Outcome<State> {
        match event {
            FilterEvent::Sample { state } => self.step(context, *state, Phase::Hover),
        }
    }

    #[state]
    fn transitional(
        &mut self,
        context: &mut FilterContext,
        event: &FilterEvent,
    ) -> Outcome<State> {
        match event {
            FilterEvent::Sample { state } => self.step(context, *state, Phase::Transitional),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(filter: &mut SlotFilter, frames: &mut u32, state: FingerState) -> SlotVerdict {
        let (verdict, next) = filter.observe(state, *frames, 6);
        *frames = next;
        verdict
    }

    #[test]
    fn first_sample_only_seeds() {
        let mut filter = SlotFilter::new();
        let mut frames = 0;
        assert_eq!(run(&mut filter, &mut frames, FingerState::Pressed), SlotVerdict::Seeded);
        assert_eq!(frames, 0);
    }

    #[test]
    fn press_qualifies_after_threshold_frames() {
        let mut filter = SlotFilter::new();
        let mut frames = 0;
        run(&mut filter, &mut frames, FingerState::Pressed);
        for expected in 1..=6 {
            assert_eq!(
                run(&mut filter, &mut frames, FingerState::Pressed),
                SlotVerdict::Suppressed
            );
            assert_eq!(frames, expected);
        }
        assert_eq!(
            run(&mut filter, &mut frames, FingerState::Pressed),
            SlotVerdict::QualifyingPress {
                state_changed: false
            }
        );
        assert_eq!(frames, 0);
    }

    #[test]
    fn press_after_hover_reports_state_change() {
        let mut filter = SlotFilter::new();
        let mut frames = 0;
        run(&mut filter, &mut frames, FingerState::Hover);
        for _ in 0..6 {
            run(&mut filter, &mut frames, FingerState::Pressed);
        }
        // Hover does not reset the counter.
        assert_eq!(
            run(&mut filter, &mut frames, FingerState::Hover),
            SlotVerdict::Hover {
                state_changed: true
            }
        );
        assert_eq!(frames, 6);
        assert_eq!(
            run(&mut filter, &mut frames, FingerState::Pressed),
            SlotVerdict::QualifyingPress {
                state_changed: true
            }
        );
    }

    #[test]
    fn release_resets_counter_and_fires_once() {
        let mut filter = SlotFilter::new();
        let mut frames = 0;
        run(&mut filter, &mut frames, FingerState::Pressed);
        run(&mut filter, &mut frames, FingerState::Pressed);
        run(&mut filter, &mut frames, FingerState::Pressed);
        assert_eq!(frames, 2);

        assert_eq!(
            run(&mut filter, &mut frames, FingerState::Released),
            SlotVerdict::Released {
                state_changed: true
            }
        );
        assert_eq!(frames, 0);
        assert_eq!(
            run(&mut filter, &mut frames, FingerState::Released),
            SlotVerdict::Released {
                state_changed: false
            }
        );
    }

    #[test]
    fn transitional_states_are_tracked_silently() {
        let mut filter = SlotFilter::new();
        let mut frames = 0;
        run(&mut filter, &mut frames, FingerState::Hover);
        assert_eq!(run(&mut filter, &mut frames, FingerState::Tap), SlotVerdict::Tracked);
        assert_eq!(
            run(&mut filter, &mut frames, FingerState::Pressing),
            SlotVerdict::Tracked
        );
        assert_eq!(
            run(&mut filter, &mut frames, FingerState::Hover),
            SlotVerdict::Hover {
                state_changed: true
            }
        );
    }
}
