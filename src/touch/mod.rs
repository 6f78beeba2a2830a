mod classify;
pub mod config;
mod engine;
pub mod error;
mod filter;
pub mod listeners;
pub mod slots;
pub mod source;
pub mod types;

pub use config::{GestureConfig, DEFAULT_GESTURE_CONFIG};
pub use engine::{EngineOutput, GestureEngine, PumpStats};
pub use error::GestureError;
pub use listeners::{
    EventRecorder, FingerMotionListener, FingerStateListener, GestureEvent, ListenerId,
    TwoFingersListener,
};
pub use slots::{FingerSlotTable, SlotAdvance, SlotSnapshot};
pub use source::{spawn_source, IterSource, SampleSource};
pub use types::{FingerSample, FingerState, Vec2};
