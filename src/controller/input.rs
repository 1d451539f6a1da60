/// Platform-agnostic rotation input handling

/// The two logical input events. They carry no payload beyond identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationEvent {
    RotateLeft,
    RotateRight,
}

/// Angle adjustment per key press, in radians.
pub const ROTATION_STEP: f32 = 0.19;

/// Accumulated rotation angle in radians. Written only by the input
/// handler, read once at the start of each frame. Never normalized; the
/// trigonometry in the model-view matrix wraps it implicitly.
#[derive(Debug, Default)]
pub struct RotationState {
    pub angle: f32,
}

impl RotationState {
    pub fn new() -> Self {
        Self { angle: 0.0 }
    }

    pub fn apply(&mut self, event: RotationEvent) {
        match event {
            RotationEvent::RotateLeft => self.angle -= ROTATION_STEP,
            RotationEvent::RotateRight => self.angle += ROTATION_STEP,
        }
    }
}

/// Maps raw key identifiers to rotation events: the arrow keys, with a/d
/// as aliases.
#[derive(Clone, Copy, Default)]
pub struct InputProcessor;

impl InputProcessor {
    pub fn event_for_key(&self, key: &str) -> Option<RotationEvent> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(RotationEvent::RotateLeft),
            "ArrowRight" | "d" | "D" => Some(RotationEvent::RotateRight),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys_map_to_events() {
        let processor = InputProcessor::default();
        assert_eq!(processor.event_for_key("ArrowLeft"), Some(RotationEvent::RotateLeft));
        assert_eq!(processor.event_for_key("ArrowRight"), Some(RotationEvent::RotateRight));
        assert_eq!(processor.event_for_key("A"), Some(RotationEvent::RotateLeft));
        assert_eq!(processor.event_for_key("d"), Some(RotationEvent::RotateRight));
        assert_eq!(processor.event_for_key("ArrowUp"), None);
        assert_eq!(processor.event_for_key("x"), None);
    }

    #[test]
    fn test_opposite_events_cancel() {
        let mut state = RotationState::new();
        state.apply(RotationEvent::RotateLeft);
        state.apply(RotationEvent::RotateRight);
        assert!(state.angle.abs() < 1e-6, "left then right should restore the angle");
    }

    #[test]
    fn test_steps_accumulate() {
        let mut state = RotationState::new();
        for _ in 0..3 {
            state.apply(RotationEvent::RotateRight);
        }
        assert!((state.angle - 3.0 * ROTATION_STEP).abs() < 1e-6);
    }

    #[test]
    fn test_angle_is_unbounded() {
        let mut state = RotationState::new();
        for _ in 0..100 {
            state.apply(RotationEvent::RotateLeft);
        }
        assert!((state.angle - -100.0 * ROTATION_STEP).abs() < 1e-4);
    }
}
