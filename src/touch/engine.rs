use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use log::{debug, trace, warn};

use super::{
    classify::{classify_pair, FingerPair, PairGesture},
    config::GestureConfig,
    error::GestureError,
    filter::{SlotFilter, SlotVerdict},
    listeners::{
        FingerMotionListener, FingerStateListener, GestureEvent, ListenerId, ListenerSet,
        TwoFingersListener,
    },
    slots::{FingerSlotTable, SlotSnapshot},
    source::SampleSource,
    types::{FingerSample, FingerState},
};

// Pressed, Moved and at most two of Drag/Pinch/Rotate.
const MAX_EVENTS_PER_UPDATE: usize = 4;

/// Events delivered during one [`GestureEngine::update`] call, in emission order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineOutput {
    pub events: [Option<GestureEvent>; MAX_EVENTS_PER_UPDATE],
}

impl EngineOutput {
    pub fn iter(&self) -> impl Iterator<Item = &GestureEvent> {
        self.events.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.events[0].is_none()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub processed: usize,
    pub rejected: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct SinkPresence {
    state: bool,
    motion: bool,
    two_fingers: bool,
}

impl SinkPresence {
    fn accepts(&self, event: &GestureEvent) -> bool {
        match event {
            GestureEvent::Pressed(_) | GestureEvent::Released(_) | GestureEvent::Hover(_) => {
                self.state
            }
            GestureEvent::Moved { .. } => self.motion,
            GestureEvent::Drag { .. }
            | GestureEvent::Pinch { .. }
            | GestureEvent::Rotate { .. } => self.two_fingers,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct DispatchContext {
    sinks: SinkPresence,
    events: [Option<GestureEvent>; MAX_EVENTS_PER_UPDATE],
}

impl DispatchContext {
    fn new(sinks: SinkPresence) -> Self {
        Self {
            sinks,
            events: Default::default(),
        }
    }

    fn emit(&mut self, event: GestureEvent) {
        if !self.sinks.accepts(&event) {
            return;
        }
        for slot in &mut self.events {
            if slot.is_none() {
                *slot = Some(event);
                return;
            }
        }
        warn!("dispatch buffer full, dropping {} event", event.kind_label());
    }

    fn finish(self) -> EngineOutput {
        EngineOutput {
            events: self.events,
        }
    }
}

struct SinkSnapshot {
    state: Vec<Arc<dyn FingerStateListener>>,
    motion: Vec<Arc<dyn FingerMotionListener>>,
    two_fingers: Vec<Arc<dyn TwoFingersListener>>,
}

impl SinkSnapshot {
    fn presence(&self) -> SinkPresence {
        SinkPresence {
            state: !self.state.is_empty(),
            motion: !self.motion.is_empty(),
            two_fingers: !self.two_fingers.is_empty(),
        }
    }

    fn fan_out(&self, output: &EngineOutput) {
        for event in output.iter() {
            match *event {
                GestureEvent::Pressed(finger) => {
                    self.state.iter().for_each(|l| l.finger_pressed(&finger))
                }
                GestureEvent::Released(finger) => {
                    self.state.iter().for_each(|l| l.finger_released(&finger))
                }
                GestureEvent::Hover(finger) => {
                    self.state.iter().for_each(|l| l.finger_hover(&finger))
                }
                GestureEvent::Moved { finger, dx, dy } => self
                    .motion
                    .iter()
                    .for_each(|l| l.finger_moved(&finger, dx, dy)),
                GestureEvent::Drag { direction, delta } => self
                    .two_fingers
                    .iter()
                    .for_each(|l| l.drag(direction, delta)),
                GestureEvent::Pinch { delta } => {
                    self.two_fingers.iter().for_each(|l| l.pinch(delta))
                }
                GestureEvent::Rotate { angle } => {
                    self.two_fingers.iter().for_each(|l| l.rotate(angle))
                }
            }
        }
    }
}

struct EngineCore {
    table: FingerSlotTable,
    filters: Vec<SlotFilter>,
}

impl EngineCore {
    fn new(capacity: usize) -> Self {
        Self {
            table: FingerSlotTable::new(capacity),
            filters: (0..capacity).map(|_| SlotFilter::new()).collect(),
        }
    }

    fn process(
        &mut self,
        sample: FingerSample,
        config: &GestureConfig,
        context: &mut DispatchContext,
    ) -> Result<(), GestureError> {
        let slot = sample.slot_id;
        let stored = self.table.get(slot)?;
        let (verdict, pressed_frames) = self.filters[slot].observe(
            sample.state,
            stored.map_or(0, |s| s.pressed_frame_count),
            config.pressed_frames_threshold,
        );

        match (verdict, stored) {
            (SlotVerdict::Seeded, _) | (_, None) => {
                trace!("slot {slot} seeded at frame {}", sample.frame);
                self.table.seed_or_advance(slot, sample)?;
                return Ok(());
            }
            (SlotVerdict::Suppressed, _) => {
                trace!(
                    "slot {slot} press frame {pressed_frames}/{} suppressed",
                    config.pressed_frames_threshold
                );
            }
            (SlotVerdict::Tracked, _) => {}
            (SlotVerdict::Released { state_changed }, _) => {
                if state_changed {
                    context.emit(GestureEvent::Released(sample));
                }
            }
            (SlotVerdict::Hover { state_changed }, _) => {
                if state_changed {
                    context.emit(GestureEvent::Hover(sample));
                }
            }
            (SlotVerdict::QualifyingPress { state_changed }, Some(stored)) => {
                debug!("slot {slot} qualifying press at frame {}", sample.frame);
                self.classify(sample, stored.current, state_changed, config, context);
            }
        }

        self.table.seed_or_advance(slot, sample)?;
        self.table.set_pressed_frames(slot, pressed_frames)
    }

    fn classify(
        &self,
        f1: FingerSample,
        f1_old: FingerSample,
        state_changed: bool,
        config: &GestureConfig,
        context: &mut DispatchContext,
    ) {
        if state_changed {
            context.emit(GestureEvent::Pressed(f1));
        }

        let d1 = f1.position - f1_old.position;
        if context.sinks.motion
            && (d1.x.abs() > config.motion_threshold || d1.y.abs() > config.motion_threshold)
        {
            // dy mirrors dx, as the provider always reported it.
            context.emit(GestureEvent::Moved {
                finger: f1,
                dx: d1.x,
                dy: d1.x,
            });
        }

        if !context.sinks.two_fingers {
            return;
        }

        let pressed = self.table.count_in_state(FingerState::Pressed);
        if pressed != 2 {
            debug!("{pressed} fingers pressed, skipping two-finger classification");
            return;
        }

        let Some(f2) = self
            .table
            .find_other_in_state(f1.slot_id, FingerState::Pressed)
            .and_then(|slot| self.table.get(slot).ok().flatten())
        else {
            warn!(
                "two pressed fingers counted but no partner for slot {}",
                f1.slot_id
            );
            return;
        };

        let pair = FingerPair {
            f1: f1.position,
            f1_old: f1_old.position,
            f2: f2.current.position,
            f2_old: f2.previous.position,
        };
        match classify_pair(&pair, config) {
            PairGesture::Drag { direction, delta } => {
                debug!("drag {delta} towards ({}, {})", direction.x, direction.y);
                context.emit(GestureEvent::Drag { direction, delta });
            }
            PairGesture::DegenerateDrag => {
                warn!("drag displacement for slot {} has no direction", f1.slot_id);
            }
            PairGesture::PinchRotate { pinch, rotate } => {
                if let Some(delta) = pinch {
                    debug!("pinch {delta}");
                    context.emit(GestureEvent::Pinch { delta });
                }
                if let Some(angle) = rotate {
                    debug!("rotate {angle} rad");
                    context.emit(GestureEvent::Rotate { angle });
                }
            }
        }
    }
}

/// Turns per-finger samples into state, motion and two-finger gesture events.
///
/// `update` calls are serialised internally; listener (de)registration and
/// the inspection helpers may be called from any thread, including from
/// inside a listener callback. Calling `update` from a listener deadlocks.
pub struct GestureEngine {
    config: GestureConfig,
    enabled: AtomicBool,
    update_gate: Mutex<()>,
    core: Mutex<EngineCore>,
    state_listeners: ListenerSet<dyn FingerStateListener>,
    motion_listeners: ListenerSet<dyn FingerMotionListener>,
    two_fingers_listeners: ListenerSet<dyn TwoFingersListener>,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureEngine {
    pub fn new() -> Self {
        Self::build(GestureConfig::default())
    }

    pub fn with_config(config: GestureConfig) -> Result<Self, GestureError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GestureConfig) -> Self {
        Self {
            core: Mutex::new(EngineCore::new(config.max_slots)),
            config,
            enabled: AtomicBool::new(true),
            update_gate: Mutex::new(()),
            state_listeners: ListenerSet::new(),
            motion_listeners: ListenerSet::new(),
            two_fingers_listeners: ListenerSet::new(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Takes effect from the next sample.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Processes one sample and delivers the resulting events.
    ///
    /// A sample whose slot id is outside `[0, max_slots)` is rejected and
    /// leaves the engine untouched.
    pub fn update(&self, sample: FingerSample) -> Result<EngineOutput, GestureError> {
        if !self.is_enabled() {
            return Ok(EngineOutput::default());
        }

        let _exclusive = self
            .update_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let sinks = SinkSnapshot {
            state: self.state_listeners.snapshot(),
            motion: self.motion_listeners.snapshot(),
            two_fingers: self.two_fingers_listeners.snapshot(),
        };
        let mut context = DispatchContext::new(sinks.presence());

        self.lock_core().process(sample, &self.config, &mut context)?;

        let output = context.finish();
        sinks.fan_out(&output);
        Ok(output)
    }

    /// Feeds every sample from `source` into [`update`](Self::update).
    ///
    /// Rejected samples are logged and counted, not fatal.
    pub fn pump<S>(&self, source: &mut S) -> PumpStats
    where
        S: SampleSource + ?Sized,
    {
        let mut stats = PumpStats::default();
        while let Some(sample) = source.next_sample() {
            match self.update(sample) {
                Ok(_) => stats.processed += 1,
                Err(err) => {
                    warn!("rejected sample at frame {}: {err}", sample.frame);
                    stats.rejected += 1;
                }
            }
        }
        stats
    }

    /// Number of slots whose current sample is in `state`.
    pub fn count(&self, state: FingerState) -> usize {
        self.lock_core().table.count_in_state(state)
    }

    pub fn slot(&self, slot_id: usize) -> Result<Option<SlotSnapshot>, GestureError> {
        self.lock_core().table.get(slot_id)
    }

    pub fn add_state_listener(&self, listener: Arc<dyn FingerStateListener>) -> ListenerId {
        let id = self.state_listeners.add(listener);
        debug!("state listener added ({} registered)", self.state_listeners.len());
        id
    }

    pub fn remove_state_listener(&self, id: ListenerId) -> bool {
        self.state_listeners.remove(id)
    }

    pub fn add_motion_listener(&self, listener: Arc<dyn FingerMotionListener>) -> ListenerId {
        let id = self.motion_listeners.add(listener);
        debug!("motion listener added ({} registered)", self.motion_listeners.len());
        id
    }

    pub fn remove_motion_listener(&self, id: ListenerId) -> bool {
        self.motion_listeners.remove(id)
    }

    pub fn add_two_fingers_listener(&self, listener: Arc<dyn TwoFingersListener>) -> ListenerId {
        let id = self.two_fingers_listeners.add(listener);
        debug!(
            "two-finger listener added ({} registered)",
            self.two_fingers_listeners.len()
        );
        id
    }

    pub fn remove_two_fingers_listener(&self, id: ListenerId) -> bool {
        self.two_fingers_listeners.remove(id)
    }

    pub fn clear_listeners(&self) {
        self.state_listeners.clear();
        self.motion_listeners.clear();
        self.two_fingers_listeners.clear();
    }

    fn lock_core(&self) -> std::sync::MutexGuard<'_, EngineCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
