#![forbid(unsafe_code)]

//! Canonical keyboard event types.
//!
//! The command handlers only need the subset of input that drives editing
//! and navigation, so this module keeps to key presses with modifiers.
//!
//! # Design Notes
//!
//! - `Modifiers` use bitflags for easy combination
//! - The "platform modifier" (Ctrl on Linux/Windows, Cmd on macOS) is
//!   reported by [`KeyEvent::platform_modifier`]

use bitflags::bitflags;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event without modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Super/Meta/Cmd modifier is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }

    /// Menu shortcut modifier: Ctrl or Super.
    #[must_use]
    pub const fn platform_modifier(&self) -> bool {
        self.modifiers.intersects(Modifiers::CTRL.union(Modifiers::SUPER))
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Delete key.
    Delete,

    /// Insert key.
    Insert,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,
}

impl KeyCode {
    /// Whether this key only moves the caret.
    #[must_use]
    pub const fn is_navigation(self) -> bool {
        matches!(
            self,
            Self::Up
                | Self::Down
                | Self::Left
                | Self::Right
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_modifier_queries() {
        let event = KeyEvent::new(KeyCode::Home).with_modifiers(Modifiers::SHIFT | Modifiers::CTRL);
        assert!(event.shift());
        assert!(event.ctrl());
        assert!(!event.super_key());
        assert!(event.platform_modifier());
    }

    #[test]
    fn super_counts_as_platform_modifier() {
        let event = KeyEvent::new(KeyCode::End).with_modifiers(Modifiers::SUPER);
        assert!(event.platform_modifier());
        assert!(!KeyEvent::new(KeyCode::End).platform_modifier());
    }

    #[test]
    fn navigation_keys() {
        assert!(KeyCode::PageDown.is_navigation());
        assert!(KeyCode::Left.is_navigation());
        assert!(!KeyCode::Insert.is_navigation());
        assert!(!KeyCode::Char('a').is_navigation());
    }

    #[test]
    fn is_char_matches_only_that_char() {
        let event = KeyEvent::new(KeyCode::Char('x'));
        assert!(event.is_char('x'));
        assert!(!event.is_char('y'));
    }
}
