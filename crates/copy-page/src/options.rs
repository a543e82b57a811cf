use serde::{Deserialize, Serialize};

use crate::Error;

/// Markdown heading level for the copied page title, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TitleLevel(u8);

impl TitleLevel {
    pub const fn new(level: u8) -> Option<Self> {
        if level >= 1 && level <= 6 {
            Some(Self(level))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// `#` repeated `level` times.
    pub fn heading_prefix(self) -> String {
        "#".repeat(self.0 as usize)
    }
}

impl Default for TitleLevel {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for TitleLevel {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).ok_or_else(|| format!("title level must be between 1 and 6, got {level}"))
    }
}

impl From<TitleLevel> for u8 {
    fn from(level: TitleLevel) -> Self {
        level.0
    }
}

/// Normalized button configuration. Immutable once handed to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonOptions {
    pub include_title: bool,
    pub title_level: TitleLevel,
    pub label: String,
    pub success_label: String,
    pub error_label: String,
    /// Milliseconds the success feedback stays visible.
    pub state_duration: u32,
    pub icon_only: bool,
}

impl ButtonOptions {
    pub const MIN_STATE_DURATION_MS: u32 = 400;
    pub const MAX_ERROR_DURATION_MS: u32 = 2000;

    /// Parses a user options payload and normalizes it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let options: UserOptions = serde_json::from_str(json)?;
        Ok(options.normalize())
    }

    /// Error feedback is capped so failures do not linger as long as successes.
    pub fn error_duration(&self) -> u32 {
        self.state_duration.min(Self::MAX_ERROR_DURATION_MS)
    }
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            include_title: true,
            title_level: TitleLevel::default(),
            label: "Copy page".to_string(),
            success_label: "Copied!".to_string(),
            error_label: "Copy failed".to_string(),
            state_duration: 2200,
            icon_only: false,
        }
    }
}

/// Options as written by the site author. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserOptions {
    pub include_title: Option<bool>,
    /// Any JSON value; anything but an integer in `1..=6` falls back to the default.
    pub title_level: Option<serde_json::Value>,
    pub label: Option<String>,
    pub success_label: Option<String>,
    pub error_label: Option<String>,
    pub state_duration: Option<f64>,
    pub icon_only: Option<bool>,
}

impl UserOptions {
    pub fn normalize(self) -> ButtonOptions {
        let defaults = ButtonOptions::default();
        let title_level = self
            .title_level
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .filter(|level| level.fract() == 0.0 && (1.0..=6.0).contains(level))
            .and_then(|level| TitleLevel::new(level as u8))
            .unwrap_or(defaults.title_level);
        let state_duration = self
            .state_duration
            .map(|duration| duration.max(ButtonOptions::MIN_STATE_DURATION_MS as f64) as u32)
            .unwrap_or(defaults.state_duration);

        ButtonOptions {
            include_title: self.include_title.unwrap_or(defaults.include_title),
            title_level,
            label: self.label.unwrap_or(defaults.label),
            success_label: self.success_label.unwrap_or(defaults.success_label),
            error_label: self.error_label.unwrap_or(defaults.error_label),
            state_duration,
            icon_only: self.icon_only.unwrap_or(defaults.icon_only),
        }
    }
}

impl From<UserOptions> for ButtonOptions {
    fn from(options: UserOptions) -> Self {
        options.normalize()
    }
}
