//! Conversion of winit events into platform events

use oriel_platform::{Event, InputEvent, Key, NativeHandle, PointerButton, WindowEvent};
use winit::event::{ElementState, Ime, MouseButton, MouseScrollDelta, WindowEvent as WinitWindowEvent};
use winit::keyboard::{Key as WinitKey, NamedKey};

/// Convert one winit window event into a platform event, tagged with the
/// window's native handle. Returns `None` for events the toolkit does not
/// consume.
pub(crate) fn convert_window_event(
    handle: NativeHandle,
    event: &WinitWindowEvent,
) -> Option<Event> {
    match event {
        WinitWindowEvent::Resized(size) => Some(Event::Window {
            handle,
            event: WindowEvent::Resized {
                width: size.width,
                height: size.height,
            },
        }),
        WinitWindowEvent::Moved(position) => Some(Event::Window {
            handle,
            event: WindowEvent::Moved {
                x: position.x,
                y: position.y,
            },
        }),
        WinitWindowEvent::Focused(focused) => Some(Event::Window {
            handle,
            event: WindowEvent::Focused(*focused),
        }),
        WinitWindowEvent::CloseRequested => Some(Event::Window {
            handle,
            event: WindowEvent::CloseRequested,
        }),
        WinitWindowEvent::RedrawRequested => Some(Event::Window {
            handle,
            event: WindowEvent::RedrawRequested,
        }),
        // winit reports no position here; the dispatcher enriches the event
        // with the surface's last known pointer position
        WinitWindowEvent::CursorEntered { .. } => Some(Event::Window {
            handle,
            event: WindowEvent::PointerEntered { x: 0.0, y: 0.0 },
        }),
        WinitWindowEvent::CursorLeft { .. } => Some(Event::Window {
            handle,
            event: WindowEvent::PointerLeft,
        }),
        WinitWindowEvent::CursorMoved { position, .. } => Some(Event::Input {
            handle,
            event: InputEvent::PointerMoved {
                x: position.x as f32,
                y: position.y as f32,
            },
        }),
        WinitWindowEvent::MouseInput { state, button, .. } => {
            let button = convert_mouse_button(*button);
            let event = match state {
                ElementState::Pressed => InputEvent::ButtonPressed { button },
                ElementState::Released => InputEvent::ButtonReleased { button },
            };
            Some(Event::Input { handle, event })
        }
        WinitWindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = scroll_delta(delta);
            Some(Event::Input {
                handle,
                event: InputEvent::Scroll { dx, dy },
            })
        }
        WinitWindowEvent::KeyboardInput { event, .. } => {
            let key = convert_key(&event.logical_key);
            let converted = match event.state {
                ElementState::Pressed => InputEvent::KeyPressed { key },
                ElementState::Released => InputEvent::KeyReleased { key },
            };
            Some(Event::Input {
                handle,
                event: converted,
            })
        }
        WinitWindowEvent::Ime(Ime::Commit(text)) => Some(Event::Input {
            handle,
            event: InputEvent::Text { text: text.clone() },
        }),
        _ => None,
    }
}

pub(crate) fn convert_mouse_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Right => PointerButton::Right,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(n) => PointerButton::Other(n),
    }
}

pub(crate) fn scroll_delta(delta: &MouseScrollDelta) -> (f32, f32) {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => (*x, *y),
        MouseScrollDelta::PixelDelta(position) => {
            (position.x as f32 / 10.0, position.y as f32 / 10.0)
        }
    }
}

pub(crate) fn convert_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(named) => match named {
            NamedKey::Enter => Key::Enter,
            NamedKey::Escape => Key::Escape,
            NamedKey::Backspace => Key::Backspace,
            NamedKey::Delete => Key::Delete,
            NamedKey::Tab => Key::Tab,
            NamedKey::Space => Key::Space,
            NamedKey::ArrowLeft => Key::ArrowLeft,
            NamedKey::ArrowRight => Key::ArrowRight,
            NamedKey::ArrowUp => Key::ArrowUp,
            NamedKey::ArrowDown => Key::ArrowDown,
            NamedKey::Home => Key::Home,
            NamedKey::End => Key::End,
            NamedKey::Shift => Key::Shift,
            NamedKey::Control => Key::Control,
            NamedKey::Alt => Key::Alt,
            _ => Key::Unidentified,
        },
        WinitKey::Character(text) => text
            .chars()
            .next()
            .map(Key::Character)
            .unwrap_or(Key::Unidentified),
        _ => Key::Unidentified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::keyboard::SmolStr;

    #[test]
    fn named_keys_map_to_logical_keys() {
        assert_eq!(convert_key(&WinitKey::Named(NamedKey::Enter)), Key::Enter);
        assert_eq!(
            convert_key(&WinitKey::Named(NamedKey::ArrowLeft)),
            Key::ArrowLeft
        );
        assert_eq!(
            convert_key(&WinitKey::Named(NamedKey::F1)),
            Key::Unidentified
        );
    }

    #[test]
    fn character_keys_keep_their_first_scalar() {
        assert_eq!(
            convert_key(&WinitKey::Character(SmolStr::new("a"))),
            Key::Character('a')
        );
        assert_eq!(
            convert_key(&WinitKey::Character(SmolStr::new(""))),
            Key::Unidentified
        );
    }

    #[test]
    fn mouse_buttons_map_including_extras() {
        assert_eq!(convert_mouse_button(MouseButton::Left), PointerButton::Left);
        assert_eq!(
            convert_mouse_button(MouseButton::Other(7)),
            PointerButton::Other(7)
        );
    }

    #[test]
    fn pixel_scroll_deltas_are_scaled_to_lines() {
        let (dx, dy) = scroll_delta(&MouseScrollDelta::LineDelta(0.0, 2.0));
        assert_eq!((dx, dy), (0.0, 2.0));
        let (dx, dy) = scroll_delta(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(
            0.0, 30.0,
        )));
        assert_eq!((dx, dy), (0.0, 3.0));
    }
}
