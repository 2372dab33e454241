//! Keyboard input for code fields, and the built-in rich-field commands.

use smol_str::SmolStr;

/// A `KeyboardEvent.key` value, reduced to what the code-field interceptor
/// distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A key that types one character.
    Character(SmolStr),
    Tab,
    Enter,
    Escape,
    /// Any other named key (`Shift`, `ArrowLeft`, ...).
    Named(SmolStr),
}

impl Key {
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    pub fn parse(key: &str) -> Self {
        match key {
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            "Escape" => Key::Escape,
            s if s.chars().count() == 1 => Key::character(s),
            s => Key::Named(s.into()),
        }
    }

    pub fn as_char(&self) -> Option<char> {
        let Key::Character(s) = self else {
            return None;
        };
        let mut chars = s.chars();
        let c = chars.next()?;
        chars.next().is_none().then_some(c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    /// Ctrl, Alt or Meta is held. Shift alone is not a shortcut: it is needed
    /// to type `{`, `(` and `"`.
    pub fn has_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::default())
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn shift(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::shift())
    }
}

/// Whether the interceptor rewrote the field for a keydown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// The field changed; suppress the default action.
    Handled,
    NotHandled,
}

impl KeydownResult {
    pub fn is_handled(self) -> bool {
        self == KeydownResult::Handled
    }
}

/// List flavour for the list formatting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// Built-in formatting operations over the current selection of a rich field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    List(ListKind),
    ClearFormat,
}

impl FormatCommand {
    /// Whether the toolbar reflects this command as an on/off state.
    pub fn tracks_active_state(self) -> bool {
        matches!(
            self,
            FormatCommand::Bold | FormatCommand::Italic | FormatCommand::Underline
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(Key::parse("Tab"), Key::Tab);
        assert_eq!(Key::parse("{"), Key::character("{"));
        assert_eq!(Key::parse("\u{e9}"), Key::character("\u{e9}"));
        assert_eq!(Key::parse("Shift"), Key::Named("Shift".into()));
        assert_eq!(Key::parse("(").as_char(), Some('('));
        assert_eq!(Key::Enter.as_char(), None);
    }

    #[test]
    fn test_command_modifiers() {
        assert!(!Modifiers::shift().has_command());
        assert!(Modifiers::ctrl().has_command());
        assert!(!Modifiers::default().has_command());
    }

    #[test]
    fn test_active_state_commands() {
        assert!(FormatCommand::Bold.tracks_active_state());
        assert!(FormatCommand::Underline.tracks_active_state());
        assert!(!FormatCommand::List(ListKind::Ordered).tracks_active_state());
        assert!(!FormatCommand::ClearFormat.tracks_active_state());
    }
}
