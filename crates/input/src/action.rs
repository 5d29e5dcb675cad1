use folio_common::Anchor;
use glam::Vec2;

use crate::keys::*;
use crate::sampler::KeySnapshot;

/// Directional movement request decoded from one snapshot.
///
/// Each direction is an independent boolean so opposite presses cancel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
}

impl MoveIntent {
    pub const IDLE: MoveIntent = MoveIntent {
        forward: false,
        back: false,
        left: false,
        right: false,
        sprint: false,
    };

    /// Arrow keys or WASD for movement, either shift for sprint.
    pub fn from_snapshot(keys: &KeySnapshot) -> Self {
        Self {
            forward: keys.any_down(&[ARROW_UP, KEY_W]),
            back: keys.any_down(&[ARROW_DOWN, KEY_S]),
            left: keys.any_down(&[ARROW_LEFT, KEY_A]),
            right: keys.any_down(&[ARROW_RIGHT, KEY_D]),
            sprint: keys.any_down(&[SHIFT_LEFT, SHIFT_RIGHT]),
        }
    }

    /// Ground-plane axes: x is strafe (right positive), y is forward.
    pub fn axes(&self) -> Vec2 {
        let x = (self.right as i8 - self.left as i8) as f32;
        let y = (self.forward as i8 - self.back as i8) as f32;
        Vec2::new(x, y)
    }

    pub fn is_moving(&self) -> bool {
        self.axes() != Vec2::ZERO
    }
}

/// A discrete, one-shot world action bound to a key.
///
/// The session consumes actions, never raw key codes, so keyboard and
/// on-screen buttons reach the same code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Jump to a named landmark in the current scene.
    JumpTo(Anchor),
    /// Teleport from the hub into the secondary room.
    TeleportForward,
    /// Teleport back to the hub.
    TeleportBack,
}

/// Key bindings for discrete actions, checked in this order each frame.
pub const BINDINGS: [(&str, Action); 7] = [
    (DIGIT_1, Action::JumpTo(Anchor::Projects)),
    (DIGIT_2, Action::JumpTo(Anchor::Career)),
    (DIGIT_3, Action::JumpTo(Anchor::Intro)),
    (DIGIT_4, Action::JumpTo(Anchor::Ai)),
    (ENTER, Action::TeleportForward),
    (ESCAPE, Action::TeleportBack),
    (BACKSPACE, Action::TeleportBack),
];

impl Action {
    pub fn for_key(code: &str) -> Option<Action> {
        BINDINGS
            .iter()
            .find(|(key, _)| *key == code)
            .map(|(_, action)| *action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions_cancel() {
        let keys = KeySnapshot::from_keys([KEY_A, KEY_D, ARROW_UP, ARROW_DOWN]);
        let intent = MoveIntent::from_snapshot(&keys);
        assert!(intent.left && intent.right);
        assert_eq!(intent.axes(), Vec2::ZERO);
        assert!(!intent.is_moving());
    }

    #[test]
    fn arrows_and_wasd_are_equivalent() {
        let a = MoveIntent::from_snapshot(&KeySnapshot::from_keys([KEY_W, KEY_D]));
        let b = MoveIntent::from_snapshot(&KeySnapshot::from_keys([ARROW_UP, ARROW_RIGHT]));
        assert_eq!(a, b);
        assert_eq!(a.axes(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn either_shift_sprints() {
        assert!(MoveIntent::from_snapshot(&KeySnapshot::from_keys([SHIFT_RIGHT])).sprint);
        assert!(MoveIntent::from_snapshot(&KeySnapshot::from_keys([SHIFT_LEFT])).sprint);
    }

    #[test]
    fn digit_and_teleport_bindings() {
        assert_eq!(
            Action::for_key(DIGIT_2),
            Some(Action::JumpTo(Anchor::Career))
        );
        assert_eq!(Action::for_key(ENTER), Some(Action::TeleportForward));
        assert_eq!(Action::for_key(BACKSPACE), Some(Action::TeleportBack));
        assert_eq!(Action::for_key(KEY_W), None);
    }
}
