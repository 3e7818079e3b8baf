use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::input::{InputEvent, InputState, Key, KeyState, Modifiers};

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Returns `None` for events not represented by the input subsystem.
pub fn translate_window_event(state: &InputState, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::ModifiersChanged(m) => Some(InputEvent::ModifiersChanged(map_modifiers(m.state()))),

        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::KeyboardInput { event, .. } => {
            let key_state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };

            Some(InputEvent::Key {
                key: map_key(event.physical_key),
                state: key_state,
                modifiers: state.modifiers,
                repeat: event.repeat,
            })
        }

        _ => None,
    }
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(code) => match code {
            KeyCode::Escape => Key::Escape,
            KeyCode::Enter => Key::Enter,
            KeyCode::Space => Key::Space,

            KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
            KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
            KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
            KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,

            KeyCode::KeyQ => Key::Q,
            KeyCode::KeyW => Key::W,

            other => Key::Unknown(other as u32),
        },

        // NativeKeyCode carries no stable numeric value in winit 0.30.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_keys_map_by_physical_position() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyQ)), Key::Q);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyW)), Key::W);
    }

    #[test]
    fn left_and_right_modifiers_collapse() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ControlLeft)), Key::Control);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ControlRight)), Key::Control);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::SuperRight)), Key::Meta);
    }

    #[test]
    fn unmapped_keys_are_unknown() {
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::KeyZ)), Key::Unknown(_)));
    }

    #[test]
    fn modifiers_state_maps_each_flag() {
        let m = map_modifiers(ModifiersState::CONTROL | ModifiersState::SUPER);
        assert_eq!(
            m,
            Modifiers {
                shift: false,
                ctrl: true,
                alt: false,
                meta: true,
            }
        );
    }
}
