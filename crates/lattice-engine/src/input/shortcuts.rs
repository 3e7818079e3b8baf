use super::frame::InputFrame;
use super::types::{Key, Modifiers};

/// Application-level keyboard shortcuts.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Shortcut {
    /// Cmd+Q / Ctrl+Q: leave the application.
    Quit,
    /// Cmd+W / Ctrl+W: close the focused window.
    CloseWindow,
}

impl Shortcut {
    /// Maps a key press under `modifiers` to a shortcut.
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Self> {
        if !modifiers.command() || modifiers.shift || modifiers.alt {
            return None;
        }

        match key {
            Key::Q => Some(Self::Quit),
            Key::W => Some(Self::CloseWindow),
            _ => None,
        }
    }

    /// First shortcut triggered by this frame's key presses. `Quit` wins over
    /// `CloseWindow` when both fire in the same frame.
    pub fn triggered(frame: &InputFrame, modifiers: Modifiers) -> Option<Self> {
        let mut found = None;
        for key in &frame.keys_pressed {
            match Self::from_key(*key, modifiers) {
                Some(Self::Quit) => return Some(Self::Quit),
                Some(other) => found = Some(other),
                None => {}
            }
        }
        found
    }
}
