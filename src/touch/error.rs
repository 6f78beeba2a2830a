use core::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureError {
    /// Sample addressed a slot outside `[0, capacity)`.
    SlotOutOfRange { slot: usize, capacity: usize },
    /// Driver finger ids start at 1.
    InvalidSensorId(i64),
    InvalidConfig(String),
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotOutOfRange { slot, capacity } => {
                write!(f, "finger slot {slot} out of range (capacity {capacity})")
            }
            Self::InvalidSensorId(id) => write!(f, "invalid sensor finger id {id}, ids start at 1"),
            Self::InvalidConfig(msg) => write!(f, "invalid gesture config: {msg}"),
        }
    }
}

impl std::error::Error for GestureError {}
