use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Terminal convention: `"<fg>;<bg>"` colour indices.
pub const COLORFGBG_ENV: &str = "COLORFGBG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored preference wins; otherwise follow the system.
    pub fn initial(stored: Option<Theme>, system_prefers_dark: bool) -> Self {
        stored.unwrap_or(if system_prefers_dark { Theme::Dark } else { Theme::Light })
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme '{value}'. Supported: light, dark.")),
        }
    }
}

/// Reads the environment's dark/light signal.
pub fn system_prefers_dark() -> bool {
    std::env::var(COLORFGBG_ENV)
        .ok()
        .and_then(|v| prefers_dark_from_colorfgbg(&v))
        .unwrap_or(false)
}

/// `"15;0"` -> dark, `"0;15"` -> light. The background is the last field.
pub fn prefers_dark_from_colorfgbg(value: &str) -> Option<bool> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(background, 0..=6 | 8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_theme_wins_over_system() {
        assert_eq!(Theme::initial(Some(Theme::Light), true), Theme::Light);
        assert_eq!(Theme::initial(None, true), Theme::Dark);
        assert_eq!(Theme::initial(None, false), Theme::Light);
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn parse_colorfgbg() {
        assert_eq!(prefers_dark_from_colorfgbg("15;0"), Some(true));
        assert_eq!(prefers_dark_from_colorfgbg("0;15"), Some(false));
        assert_eq!(prefers_dark_from_colorfgbg("15;default;0"), Some(true));
        assert_eq!(prefers_dark_from_colorfgbg("garbage"), None);
    }

    #[test]
    fn theme_from_str() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }
}
