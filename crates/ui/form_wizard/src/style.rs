//! Semantic color roles for pages and components.
//!
//! Widgets ask for a `Role` instead of a concrete color, so the whole UI can
//! be re-themed from one place.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Background,
    Text,
    SubtleText,
    InvertedText,
    Selection,

    Primary,
    Accent,
    Success,
    Danger,
    Muted,
}

/// A mapping from semantic roles to colors for a given Theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleColors {
    pub background: Color,
    pub text: Color,
    pub subtle_text: Color,
    pub inverted_text: Color,
    pub selection: Color,

    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub danger: Color,
    pub muted: Color,
}

impl RoleColors {
    pub fn color(&self, role: Role) -> Color {
        match role {
            Role::Background => self.background,
            Role::Text => self.text,
            Role::SubtleText => self.subtle_text,
            Role::InvertedText => self.inverted_text,
            Role::Selection => self.selection,

            Role::Primary => self.primary,
            Role::Accent => self.accent,
            Role::Success => self.success,
            Role::Danger => self.danger,
            Role::Muted => self.muted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub roles: RoleColors,
}

impl Theme {
    pub fn style(&self, role: Role) -> Style {
        Style::default().fg(self.roles.color(role))
    }

    /// Same as `style`, but allows custom background.
    pub fn style_on(&self, role: Role, on: Role) -> Style {
        Style::default()
            .fg(self.roles.color(role))
            .bg(self.roles.color(on))
    }

    pub fn bold(&self, role: Role) -> Style {
        self.style(role).add_modifier(Modifier::BOLD)
    }

    /// Style of a button; disabled buttons are dimmed.
    pub fn button(&self, enabled: bool, focused: bool) -> Style {
        match (enabled, focused) {
            (false, _) => self.style(Role::Muted).add_modifier(Modifier::DIM),
            (true, true) => self.style_on(Role::InvertedText, Role::Primary),
            (true, false) => self.bold(Role::Primary),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        default_dark_theme()
    }
}

pub fn default_dark_theme() -> Theme {
    Theme {
        name: "dark".into(),
        roles: RoleColors {
            background: Color::Rgb(0x22, 0x22, 0x22),
            text: Color::Rgb(0xff, 0xff, 0xff),
            subtle_text: Color::Rgb(0x9a, 0x9a, 0x9a),
            inverted_text: Color::Rgb(0x10, 0x10, 0x10),
            selection: Color::Rgb(0x24, 0x57, 0xca),

            primary: Color::Rgb(0x3b, 0x82, 0xf6),
            accent: Color::Rgb(0x93, 0x33, 0xea),
            success: Color::Rgb(0x22, 0xc5, 0x5e),
            danger: Color::Rgb(0xef, 0x44, 0x44),
            muted: Color::Rgb(0x56, 0x56, 0x56),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_buttons_ignore_focus() {
        let theme = default_dark_theme();
        assert_eq!(theme.button(false, true), theme.button(false, false));
        assert_ne!(theme.button(true, true), theme.button(true, false));
    }
}
