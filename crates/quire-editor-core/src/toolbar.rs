//! Toolbar model for rich fields.

use crate::actions::{FormatCommand, ListKind};
use crate::format::{ActiveFormats, InlineFormat};

/// Commands that open a dialog instead of mutating right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomFlow {
    Link,
    Image,
}

/// What a toolbar button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAction {
    Format(FormatCommand),
    Custom(CustomFlow),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarCommand {
    /// Stable identifier, also written to the button's `data-command`.
    pub id: &'static str,
    pub title: &'static str,
    pub action: CommandAction,
}

impl ToolbarCommand {
    pub const fn new(id: &'static str, title: &'static str, action: CommandAction) -> Self {
        Self { id, title, action }
    }

    pub fn tracks_active_state(&self) -> bool {
        matches!(self.action, CommandAction::Format(cmd) if cmd.tracks_active_state())
    }

    /// Whether the button shows as active for `formats`.
    pub fn is_active(&self, formats: &ActiveFormats) -> bool {
        match self.action {
            CommandAction::Format(cmd) => {
                InlineFormat::from_command(cmd).is_some_and(|f| formats.get(f))
            }
            CommandAction::Custom(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarItem {
    Button(ToolbarCommand),
    Separator,
}

/// The standard rich-field toolbar.
pub fn default_toolbar() -> Vec<ToolbarItem> {
    use CommandAction::{Custom, Format};
    use ToolbarItem::{Button, Separator};

    vec![
        Button(ToolbarCommand::new("bold", "Bold (Ctrl+B)", Format(FormatCommand::Bold))),
        Button(ToolbarCommand::new("italic", "Italic (Ctrl+I)", Format(FormatCommand::Italic))),
        Button(ToolbarCommand::new(
            "underline",
            "Underline (Ctrl+U)",
            Format(FormatCommand::Underline),
        )),
        Separator,
        Button(ToolbarCommand::new(
            "insertUnorderedList",
            "Bullet List",
            Format(FormatCommand::List(ListKind::Unordered)),
        )),
        Button(ToolbarCommand::new(
            "insertOrderedList",
            "Numbered List",
            Format(FormatCommand::List(ListKind::Ordered)),
        )),
        Separator,
        Button(ToolbarCommand::new("customLink", "Insert Link", Custom(CustomFlow::Link))),
        Button(ToolbarCommand::new(
            "customImage",
            "Insert Image from Library",
            Custom(CustomFlow::Image),
        )),
        Separator,
        Button(ToolbarCommand::new(
            "removeFormat",
            "Clear Formatting",
            Format(FormatCommand::ClearFormat),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout: Vec<&str> = default_toolbar()
            .iter()
            .map(|item| match item {
                ToolbarItem::Button(cmd) => cmd.id,
                ToolbarItem::Separator => "|",
            })
            .collect();
        insta::assert_snapshot!(
            layout.join(" "),
            @"bold italic underline | insertUnorderedList insertOrderedList | customLink customImage | removeFormat"
        );
    }

    #[test]
    fn test_only_inline_formats_track_state() {
        let tracked: Vec<&str> = default_toolbar()
            .iter()
            .filter_map(|item| match item {
                ToolbarItem::Button(cmd) if cmd.tracks_active_state() => Some(cmd.id),
                _ => None,
            })
            .collect();
        assert_eq!(tracked, ["bold", "italic", "underline"]);
    }

    #[test]
    fn test_is_active() {
        let formats = ActiveFormats {
            italic: true,
            ..Default::default()
        };
        let toolbar = default_toolbar();
        let active: Vec<&str> = toolbar
            .iter()
            .filter_map(|item| match item {
                ToolbarItem::Button(cmd) if cmd.is_active(&formats) => Some(cmd.id),
                _ => None,
            })
            .collect();
        assert_eq!(active, ["italic"]);
    }
}
