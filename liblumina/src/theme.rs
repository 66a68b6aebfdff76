//! Light and dark color palettes

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            _ => Err(format!("Invalid theme: '{}'. Valid options: light, dark", s)),
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemePreference::Light => write!(f, "light"),
            ThemePreference::Dark => write!(f, "dark"),
        }
    }
}

/// Named colors, as hex strings
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub primary: &'static str,
    pub accent: &'static str,
    pub border: &'static str,
    pub danger: &'static str,
}

pub const LIGHT: Palette = Palette {
    background: "#F7F5FB",
    surface: "#FFFFFF",
    text: "#1C1B22",
    text_secondary: "#5E5A6B",
    primary: "#6C4AB6",
    accent: "#F2A541",
    border: "#E2DEEC",
    danger: "#D64545",
};

pub const DARK: Palette = Palette {
    background: "#121117",
    surface: "#1E1C26",
    text: "#F2F0F7",
    text_secondary: "#A9A4B8",
    primary: "#9D7BEA",
    accent: "#F5B95F",
    border: "#2E2B3A",
    danger: "#EF6B6B",
};

pub fn palette_for(preference: ThemePreference) -> Palette {
    match preference {
        ThemePreference::Light => LIGHT,
        ThemePreference::Dark => DARK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_for_preference() {
        assert_eq!(palette_for(ThemePreference::Light), LIGHT);
        assert_eq!(palette_for(ThemePreference::Dark), DARK);
        assert_ne!(LIGHT.background, DARK.background);
    }

    #[test]
    fn test_toggle() {
        assert_eq!(ThemePreference::Light.toggled(), ThemePreference::Dark);
        assert_eq!(ThemePreference::Dark.toggled(), ThemePreference::Light);
    }

    #[test]
    fn test_parse() {
        assert_eq!("DARK".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
        assert!("sepia".parse::<ThemePreference>().is_err());
    }
}
