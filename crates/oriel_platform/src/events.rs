//! Platform event model
//!
//! Raw native events, already converted from the windowing backend's types
//! but not yet interpreted. Every event is tagged with the native handle of
//! the window it belongs to; the renderer's dispatcher resolves that handle
//! to an attached surface.

use crate::target::NativeHandle;

/// A raw platform event
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Window-class event (move, resize, focus, pointer crossing)
    Window {
        handle: NativeHandle,
        event: WindowEvent,
    },
    /// Input-class event (pointer, keyboard, text)
    Input {
        handle: NativeHandle,
        event: InputEvent,
    },
}

impl Event {
    /// Native handle of the window this event is tagged with
    pub fn window_handle(&self) -> NativeHandle {
        match self {
            Event::Window { handle, .. } | Event::Input { handle, .. } => *handle,
        }
    }
}

/// Window-level notifications
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowEvent {
    Resized { width: u32, height: u32 },
    Moved { x: i32, y: i32 },
    Focused(bool),
    /// The pointer entered the window. Backends do not report a position in
    /// enter notifications; the dispatcher fills in the surface's last known
    /// pointer position before forwarding.
    PointerEntered { x: f32, y: f32 },
    PointerLeft,
    CloseRequested,
    RedrawRequested,
}

/// Pointer, keyboard and text input
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f32, y: f32 },
    ButtonPressed { button: PointerButton },
    ButtonReleased { button: PointerButton },
    Scroll { dx: f32, dy: f32 },
    KeyPressed { key: Key },
    KeyReleased { key: Key },
    Text { text: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Logical key, reduced to what widget focus/activation handling needs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Shift,
    Control,
    Alt,
    Unidentified,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_carries_its_window_handle() {
        let handle = NativeHandle(7);
        let window = Event::Window {
            handle,
            event: WindowEvent::CloseRequested,
        };
        let input = Event::Input {
            handle,
            event: InputEvent::Scroll { dx: 0.0, dy: 1.0 },
        };
        assert_eq!(window.window_handle(), handle);
        assert_eq!(input.window_handle(), handle);
    }
}
