use super::{config::GestureConfig, types::Vec2};

/// Positions of the two pressed fingers at this and the previous frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FingerPair {
    pub(crate) f1: Vec2,
    pub(crate) f1_old: Vec2,
    pub(crate) f2: Vec2,
    pub(crate) f2_old: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PairGesture {
    Drag {
        direction: Vec2,
        delta: f32,
    },
    /// Displacements agreed but the first finger's could not be normalised.
    DegenerateDrag,
    PinchRotate {
        pinch: Option<f32>,
        rotate: Option<f32>,
    },
}

/// Drag wins when both displacements point the same way; otherwise the span
/// between the fingers is checked for length change (pinch) and turn
/// (rotate) independently.
pub(crate) fn classify_pair(pair: &FingerPair, config: &GestureConfig) -> PairGesture {
    let d1 = pair.f1 - pair.f1_old;
    let d2 = pair.f2 - pair.f2_old;

    if d1.dot(d2) > config.drag_threshold {
        return match d1.normalized() {
            Some(direction) => PairGesture::Drag {
                direction,
                delta: d1.length(),
            },
            None => PairGesture::DegenerateDrag,
        };
    }

    let span = pair.f2 - pair.f1;
    let span_old = pair.f2_old - pair.f1_old;

    let distance_delta = span_old.length() - span.length();
    let pinch = (distance_delta.abs() > config.pinch_threshold).then_some(distance_delta);

    // Operand order sets the sign convention: positive is clockwise.
    let cross = span.cross_z(span_old);
    let rotate = (cross.abs() > config.rotate_threshold)
        .then(|| cross.signum() * span_old.angle_between(span));

    PairGesture::PinchRotate { pinch, rotate }
}
