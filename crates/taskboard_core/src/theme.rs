use crate::error::AppError;
use crate::storage::KeyValueMedium;
use std::fmt;
use std::str::FromStr;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(AppError::invalid_input(format!(
                "unknown theme '{other}' (expected light or dark)"
            ))),
        }
    }
}

/// The persisted light/dark preference.
///
/// Stored as the bare string `dark` or `light`; anything else reads as light.
pub struct ThemeSetting<M> {
    medium: M,
    theme: Theme,
}

impl<M: KeyValueMedium> ThemeSetting<M> {
    pub fn open(medium: M) -> Self {
        let theme = match medium.get_item(THEME_KEY) {
            Ok(Some(saved)) if saved == Theme::Dark.as_str() => Theme::Dark,
            Ok(_) => Theme::Light,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read theme, using light");
                Theme::Light
            }
        };
        Self { medium, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled())
    }

    pub fn set(&mut self, theme: Theme) -> Theme {
        self.theme = theme;
        if let Err(err) = self.medium.set_item(THEME_KEY, theme.as_str()) {
            tracing::error!(error = %err, "failed to persist theme");
        }
        self.theme
    }
}

/// Terminal colors for a theme. Light output stays uncolored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            accent: "\x1b[38;5;75m",
            muted: "\x1b[38;5;245m",
            reset: "\x1b[0m",
        },
        Theme::Light => Palette {
            accent: "",
            muted: "",
            reset: "",
        },
    }
}
