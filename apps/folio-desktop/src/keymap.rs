use folio_input::keys;
use winit::keyboard::KeyCode;

/// Key identifier the sampler understands, for keys the world reacts to.
pub fn dom_code(key: KeyCode) -> Option<&'static str> {
    let code = match key {
        KeyCode::KeyW => keys::KEY_W,
        KeyCode::KeyA => keys::KEY_A,
        KeyCode::KeyS => keys::KEY_S,
        KeyCode::KeyD => keys::KEY_D,
        KeyCode::ArrowUp => keys::ARROW_UP,
        KeyCode::ArrowDown => keys::ARROW_DOWN,
        KeyCode::ArrowLeft => keys::ARROW_LEFT,
        KeyCode::ArrowRight => keys::ARROW_RIGHT,
        KeyCode::ShiftLeft => keys::SHIFT_LEFT,
        KeyCode::ShiftRight => keys::SHIFT_RIGHT,
        KeyCode::Space => keys::SPACE,
        KeyCode::Enter | KeyCode::NumpadEnter => keys::ENTER,
        KeyCode::Escape => keys::ESCAPE,
        KeyCode::Backspace => keys::BACKSPACE,
        KeyCode::Digit1 | KeyCode::Numpad1 => keys::DIGIT_1,
        KeyCode::Digit2 | KeyCode::Numpad2 => keys::DIGIT_2,
        KeyCode::Digit3 | KeyCode::Numpad3 => keys::DIGIT_3,
        KeyCode::Digit4 | KeyCode::Numpad4 => keys::DIGIT_4,
        _ => return None,
    };
    Some(code)
}
