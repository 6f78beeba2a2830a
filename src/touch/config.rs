use super::error::GestureError;

const MAX_SLOTS_LIMIT: usize = 64;

/// Engine thresholds. Defaults come from `config/gestures.toml`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    pub max_slots: usize,
    /// Leading `Pressed` frames swallowed per press before one qualifies.
    pub pressed_frames_threshold: u32,
    pub motion_threshold: f32,
    pub drag_threshold: f32,
    pub pinch_threshold: f32,
    pub rotate_threshold: f32,
}

include!(concat!(env!("OUT_DIR"), "/gesture_config.rs"));

impl Default for GestureConfig {
    fn default() -> Self {
        DEFAULT_GESTURE_CONFIG
    }
}

impl GestureConfig {
    pub fn with_max_slots(mut self, max_slots: usize) -> Self {
        self.max_slots = max_slots;
        self
    }

    pub fn with_pressed_frames_threshold(mut self, frames: u32) -> Self {
        self.pressed_frames_threshold = frames;
        self
    }

    pub fn with_motion_threshold(mut self, threshold: f32) -> Self {
        self.motion_threshold = threshold;
        self
    }

    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.drag_threshold = threshold;
        self
    }

    pub fn with_pinch_threshold(mut self, threshold: f32) -> Self {
        self.pinch_threshold = threshold;
        self
    }

    pub fn with_rotate_threshold(mut self, threshold: f32) -> Self {
        self.rotate_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), GestureError> {
        if self.max_slots == 0 || self.max_slots > MAX_SLOTS_LIMIT {
            return Err(GestureError::InvalidConfig(format!(
                "max_slots must be in 1..={MAX_SLOTS_LIMIT}, got {}",
                self.max_slots
            )));
        }
        for (name, value) in [
            ("motion_threshold", self.motion_threshold),
            ("drag_threshold", self.drag_threshold),
            ("pinch_threshold", self.pinch_threshold),
            ("rotate_threshold", self.rotate_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GestureError::InvalidConfig(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_shipped_toml() {
        let config = GestureConfig::default();
        assert_eq!(config.max_slots, 20);
        assert_eq!(config.pressed_frames_threshold, 6);
        assert_eq!(config.motion_threshold, 0.0003);
        assert_eq!(config.drag_threshold, 0.000005);
        assert_eq!(config.pinch_threshold, 0.003);
        assert_eq!(config.rotate_threshold, 0.0008);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let base = GestureConfig::default();
        assert!(base.with_max_slots(0).validate().is_err());
        assert!(base.with_max_slots(65).validate().is_err());
        assert!(base.with_rotate_threshold(f32::NAN).validate().is_err());
        assert!(base.with_pinch_threshold(-0.1).validate().is_err());
        assert!(base.with_rotate_threshold(0.001).validate().is_ok());
        assert!(base.with_pressed_frames_threshold(0).validate().is_ok());
    }
}
