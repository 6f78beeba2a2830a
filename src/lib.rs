//! Multi-touch gesture classification.
//!
//! A [`GestureEngine`] consumes one [`FingerSample`] per finger per sensor
//! frame, keeps a one-step history for every finger slot, filters contact
//! jitter, and reports:
//!
//! * finger state transitions (pressed, released, hover),
//! * single-finger motion,
//! * two-finger drag, pinch and rotate gestures.
//!
//! Events go to listeners registered per category. A category with no
//! listeners is skipped entirely.
//!
//! ```no_run
//! use std::sync::Arc;
//! use multitouch::{EventRecorder, FingerSample, FingerState, GestureEngine, Vec2};
//!
//! let engine = GestureEngine::new();
//! let recorder = Arc::new(EventRecorder::new());
//! engine.add_two_fingers_listener(recorder.clone());
//! engine
//!     .update(FingerSample::new(0, 1, 0.0, FingerState::Pressed, Vec2::new(0.4, 0.5)))
//!     .expect("slot 0 is in range");
//! ```

pub mod touch;

pub use touch::{
    spawn_source, EngineOutput, EventRecorder, FingerMotionListener, FingerSample, FingerSlotTable,
    FingerState, FingerStateListener, GestureConfig, GestureEngine, GestureError, GestureEvent,
    IterSource, ListenerId, PumpStats, SampleSource, SlotSnapshot, TwoFingersListener, Vec2,
    DEFAULT_GESTURE_CONFIG,
};
