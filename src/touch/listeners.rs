use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError, RwLock,
};

use super::types::{FingerSample, Vec2};

pub trait FingerStateListener: Send + Sync {
    fn finger_pressed(&self, finger: &FingerSample);
    fn finger_released(&self, finger: &FingerSample);
    /// Finger is above the pad without touching it.
    fn finger_hover(&self, finger: &FingerSample);
}

pub trait FingerMotionListener: Send + Sync {
    fn finger_moved(&self, finger: &FingerSample, dx: f32, dy: f32);
}

pub trait TwoFingersListener: Send + Sync {
    /// Positive when the fingers converge, negative when they spread.
    fn pinch(&self, delta: f32);
    /// Both fingers moved in a common direction.
    fn drag(&self, direction: Vec2, delta: f32);
    /// Radians; positive is clockwise.
    fn rotate(&self, angle: f32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Pressed(FingerSample),
    Released(FingerSample),
    Hover(FingerSample),
    Moved {
        finger: FingerSample,
        dx: f32,
        dy: f32,
    },
    Drag {
        direction: Vec2,
        delta: f32,
    },
    Pinch {
        delta: f32,
    },
    Rotate {
        angle: f32,
    },
}

impl GestureEvent {
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Pressed(_) => "pressed",
            Self::Released(_) => "released",
            Self::Hover(_) => "hover",
            Self::Moved { .. } => "moved",
            Self::Drag { .. } => "drag",
            Self::Pinch { .. } => "pinch",
            Self::Rotate { .. } => "rotate",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered set of listeners of one category.
///
/// Readers take a snapshot, so a fan-out already in progress is unaffected
/// by concurrent registration.
pub(crate) struct ListenerSet<T: ?Sized> {
    next_id: AtomicU64,
    entries: RwLock<Vec<(ListenerId, Arc<T>)>>,
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> ListenerSet<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, listener: Arc<T>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

/// Listener for every category that keeps what it receives, in order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<GestureEvent>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GestureEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(GestureEvent::kind_label)
            .collect()
    }

    pub fn take(&self) -> Vec<GestureEvent> {
        core::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, event: GestureEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl FingerStateListener for EventRecorder {
    fn finger_pressed(&self, finger: &FingerSample) {
        self.push(GestureEvent::Pressed(*finger));
    }

    fn finger_released(&self, finger: &FingerSample) {
        self.push(GestureEvent::Released(*finger));
    }

    fn finger_hover(&self, finger: &FingerSample) {
        self.push(GestureEvent::Hover(*finger));
    }
}

impl FingerMotionListener for EventRecorder {
    fn finger_moved(&self, finger: &FingerSample, dx: f32, dy: f32) {
        self.push(GestureEvent::Moved {
            finger: *finger,
            dx,
            dy,
        });
    }
}

impl TwoFingersListener for EventRecorder {
    fn pinch(&self, delta: f32) {
        self.push(GestureEvent::Pinch { delta });
    }

    fn drag(&self, direction: Vec2, delta: f32) {
        self.push(GestureEvent::Drag { direction, delta });
    }

    fn rotate(&self, angle: f32) {
        self.push(GestureEvent::Rotate { angle });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_set_keeps_registration_order() {
        let set: ListenerSet<dyn TwoFingersListener> = ListenerSet::new();
        let first = Arc::new(EventRecorder::new());
        let second = Arc::new(EventRecorder::new());
        let first_id = set.add(first.clone());
        let second_id = set.add(second.clone());
        assert_ne!(first_id, second_id);
        assert_eq!(set.len(), 2);

        for listener in set.snapshot() {
            listener.pinch(0.5);
        }
        assert_eq!(first.kinds(), vec!["pinch"]);
        assert_eq!(second.kinds(), vec!["pinch"]);

        assert!(set.remove(first_id));
        assert!(!set.remove(first_id));
        assert_eq!(set.len(), 1);
        set.clear();
        assert!(set.snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_removal() {
        let set: ListenerSet<dyn FingerStateListener> = ListenerSet::new();
        let recorder = Arc::new(EventRecorder::new());
        let id = set.add(recorder.clone());
        let snapshot = set.snapshot();
        set.remove(id);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn recorder_take_drains() {
        let recorder = EventRecorder::new();
        recorder.rotate(0.1);
        recorder.drag(Vec2::new(1.0, 0.0), 0.01);
        assert_eq!(recorder.kinds(), vec!["rotate", "drag"]);
        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.events().is_empty());
    }
}
