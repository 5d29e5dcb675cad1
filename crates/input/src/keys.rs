//! Key identifiers, spelled like DOM `KeyboardEvent.code` values.

pub const KEY_W: &str = "KeyW";
pub const KEY_A: &str = "KeyA";
pub const KEY_S: &str = "KeyS";
pub const KEY_D: &str = "KeyD";
pub const ARROW_UP: &str = "ArrowUp";
pub const ARROW_DOWN: &str = "ArrowDown";
pub const ARROW_LEFT: &str = "ArrowLeft";
pub const ARROW_RIGHT: &str = "ArrowRight";
pub const SHIFT_LEFT: &str = "ShiftLeft";
pub const SHIFT_RIGHT: &str = "ShiftRight";
pub const SPACE: &str = "Space";
pub const ENTER: &str = "Enter";
pub const ESCAPE: &str = "Escape";
pub const BACKSPACE: &str = "Backspace";
pub const DIGIT_1: &str = "Digit1";
pub const DIGIT_2: &str = "Digit2";
pub const DIGIT_3: &str = "Digit3";
pub const DIGIT_4: &str = "Digit4";

/// Keys whose platform default (page scrolling) is suppressed while attached.
pub const SUPPRESSED: [&str; 5] = [ARROW_UP, ARROW_DOWN, ARROW_LEFT, ARROW_RIGHT, SPACE];

pub fn is_suppressed(code: &str) -> bool {
    SUPPRESSED.contains(&code)
}
