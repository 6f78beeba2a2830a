use core::ops::Sub;

use super::error::GestureError;

/// Two-component vector in sensor-surface units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Z component of the 3D cross product `self × other` with both vectors in the z=0 plane.
    pub fn cross_z(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Unsigned angle between the two vectors, in `[0, π]`.
    ///
    /// The cosine is clamped so rounding never pushes `acos` out of its
    /// domain. Returns NaN when either vector has zero length.
    pub fn angle_between(self, other: Self) -> f32 {
        let cos = self.dot(other) / (self.length() * other.length());
        cos.clamp(-1.0, 1.0).acos()
    }

    /// Unit vector in the same direction, or `None` for a zero-length or non-finite vector.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        Some(Self::new(self.x / len, self.y / len))
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FingerState {
    Pressed,
    Released,
    Hover,
    Pressing,
    Releasing,
    Tap,
    Unrecognized,
}

impl FingerState {
    /// Maps the multitouch driver's integer state code.
    pub fn from_raw(code: i32) -> Self {
        match code {
            2 => Self::Hover,
            3 => Self::Tap,
            4 => Self::Pressed,
            5 => Self::Pressing,
            6 => Self::Releasing,
            7 => Self::Released,
            _ => Self::Unrecognized,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pressed => "pressed",
            Self::Released => "released",
            Self::Hover => "hover",
            Self::Pressing => "pressing",
            Self::Releasing => "releasing",
            Self::Tap => "tap",
            Self::Unrecognized => "unrecognized",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "pressed" => Some(Self::Pressed),
            "released" => Some(Self::Released),
            "hover" => Some(Self::Hover),
            "pressing" => Some(Self::Pressing),
            "releasing" => Some(Self::Releasing),
            "tap" => Some(Self::Tap),
            "unrecognized" => Some(Self::Unrecognized),
            _ => None,
        }
    }
}

/// One sensor reading for one finger slot at one frame.
///
/// `slot_id` is 0-based. Drivers that number fingers from 1 should go through
/// [`FingerSample::from_sensor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FingerSample {
    pub slot_id: usize,
    pub frame: u64,
    pub timestamp: f64,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    /// Contact ellipse orientation in radians.
    pub angle: f32,
    pub major_axis: f32,
    pub minor_axis: f32,
    pub state: FingerState,
}

impl FingerSample {
    pub fn new(
        slot_id: usize,
        frame: u64,
        timestamp: f64,
        state: FingerState,
        position: Vec2,
    ) -> Self {
        Self {
            slot_id,
            frame,
            timestamp,
            position,
            velocity: Vec2::ZERO,
            size: 0.0,
            angle: 0.0,
            major_axis: 0.0,
            minor_axis: 0.0,
            state,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_contact(mut self, size: f32, angle: f32, major_axis: f32, minor_axis: f32) -> Self {
        self.size = size;
        self.angle = angle;
        self.major_axis = major_axis;
        self.minor_axis = minor_axis;
        self
    }

    /// Builds a sample from the driver callback arguments, converting the
    /// 1-based sensor finger id into a slot id.
    #[allow(clippy::too_many_arguments)]
    pub fn from_sensor(
        frame: u64,
        timestamp: f64,
        sensor_id: i64,
        raw_state: i32,
        size: f32,
        x: f32,
        y: f32,
        dx: f32,
        dy: f32,
        angle: f32,
        major_axis: f32,
        minor_axis: f32,
    ) -> Result<Self, GestureError> {
        if sensor_id < 1 {
            return Err(GestureError::InvalidSensorId(sensor_id));
        }
        let slot_id =
            usize::try_from(sensor_id - 1).map_err(|_| GestureError::InvalidSensorId(sensor_id))?;
        Ok(Self::new(
            slot_id,
            frame,
            timestamp,
            FingerState::from_raw(raw_state),
            Vec2::new(x, y),
        )
        .with_velocity(Vec2::new(dx, dy))
        .with_contact(size, angle, major_axis, minor_axis))
    }

    /// Contact angle in whole degrees, truncated toward zero.
    pub fn angle_degrees(&self) -> i32 {
        self.angle.to_degrees() as i32
    }
}
