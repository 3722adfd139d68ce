//! rdev-based input hooking.

use autoclick_core::{InputEvent, KeyCode, MouseButton, Point};
use crossbeam_channel::{Receiver, Sender};
use rdev::{listen, Event, EventType};
use tracing::{error, info, warn};

/// Run the rdev listener on the current thread.
pub fn start_hook(event_tx: Sender<InputEvent>, stop_rx: Receiver<()>) {
    info!("Input hook thread started (rdev)");

    // rdev reports button events without a position.
    let mut last_position = Point::default();
    let mut stopped = false;

    let callback = move |event: Event| {
        if stopped {
            return;
        }
        if stop_rx.try_recv().is_ok() {
            info!("Input hook received stop signal");
            stopped = true;
            return;
        }

        if let Some(input_event) = convert_event(event.event_type, &mut last_position) {
            if let Err(e) = event_tx.try_send(input_event) {
                warn!("Failed to send input event: {}", e);
            }
        }
    };

    if let Err(error) = listen(callback) {
        error!(?error, "Input hook error");
    }

    info!("Input hook thread exiting");
}

/// Translate an rdev event, tracking the pointer through move events.
fn convert_event(event_type: EventType, last_position: &mut Point) -> Option<InputEvent> {
    match event_type {
        EventType::MouseMove { x, y } => {
            *last_position = Point {
                x: x as i32,
                y: y as i32,
            };
            None
        }
        EventType::ButtonPress(button) => convert_button(button).map(|button| InputEvent::MousePress {
            button,
            position: *last_position,
        }),
        EventType::ButtonRelease(button) => convert_button(button).map(|button| InputEvent::MouseRelease {
            button,
            position: *last_position,
        }),
        EventType::Wheel { .. } => None,
        EventType::KeyPress(key) => Some(InputEvent::KeyPress(key_code(key))),
        EventType::KeyRelease(key) => Some(InputEvent::KeyRelease(key_code(key))),
    }
}

fn convert_button(button: rdev::Button) -> Option<MouseButton> {
    match button {
        rdev::Button::Left => Some(MouseButton::Left),
        rdev::Button::Right => Some(MouseButton::Right),
        rdev::Button::Middle => Some(MouseButton::Middle),
        rdev::Button::Unknown(id) => side_button(id).map(MouseButton::Extra),
    }
}

/// Map a platform button id to the 1-based side button number.
///
/// X11 numbers the scroll wheel 4-7 and the side buttons from 8.
#[cfg(target_os = "linux")]
fn side_button(id: u8) -> Option<u8> {
    match id {
        0..=7 => None,
        n => Some(n - 7),
    }
}

/// Windows reports XBUTTON1/XBUTTON2 as 1 and 2.
#[cfg(not(target_os = "linux"))]
fn side_button(id: u8) -> Option<u8> {
    (id >= 1).then_some(id)
}

/// Key names the hook reports, i.e. the `rdev::Key` debug names.
const KEYS: &[rdev::Key] = {
    use rdev::Key::*;
    &[
        Alt, AltGr, Backspace, CapsLock, ControlLeft, ControlRight, Delete, DownArrow, End, Escape,
        F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, Home, LeftArrow, MetaLeft, MetaRight,
        PageDown, PageUp, Return, RightArrow, ShiftLeft, ShiftRight, Space, Tab, UpArrow,
        PrintScreen, ScrollLock, Pause, NumLock, BackQuote, Num1, Num2, Num3, Num4, Num5, Num6,
        Num7, Num8, Num9, Num0, Minus, Equal, KeyQ, KeyW, KeyE, KeyR, KeyT, KeyY, KeyU, KeyI, KeyO,
        KeyP, LeftBracket, RightBracket, KeyA, KeyS, KeyD, KeyF, KeyG, KeyH, KeyJ, KeyK, KeyL,
        SemiColon, Quote, BackSlash, IntlBackslash, KeyZ, KeyX, KeyC, KeyV, KeyB, KeyN, KeyM,
        Comma, Dot, Slash, Insert, KpReturn, KpMinus, KpPlus, KpMultiply, KpDivide, Kp0, Kp1, Kp2,
        Kp3, Kp4, Kp5, Kp6, Kp7, Kp8, Kp9, KpDelete, Function,
    ]
};

/// Resolve a user-typed key name to the name the hook reports.
///
/// Matching ignores ASCII case, so `f6` resolves to `F6`. `Unknown(n)` names a
/// raw platform code. Returns `None` for names the hook never reports.
pub fn canonical_key_name(name: &str) -> Option<KeyCode> {
    let name = name.trim();
    if let Some(code) = name
        .get(..8)
        .filter(|prefix| prefix.eq_ignore_ascii_case("unknown("))
        .and_then(|_| name[8..].strip_suffix(')'))
    {
        return code.parse::<u32>().ok().map(|n| key_code(rdev::Key::Unknown(n)));
    }
    KEYS.iter()
        .map(|key| key_code(*key))
        .find(|code| code.as_str().eq_ignore_ascii_case(name))
}

/// Key identity is the rdev key name, e.g. `F6`, `KeyA` or `Unknown(65)`.
fn key_code(key: rdev::Key) -> KeyCode {
    KeyCode::new(format!("{key:?}"))
}
