use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;
use strum_macros::EnumString;

/// Key under which the background preferences are stored.
pub const BACKGROUND_SETTINGS_KEY: &str = "backgroundSettings";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackgroundPattern {
    Waves,
    Circles,
    #[default]
    Gradient,
}

/// Cosmetic background preferences. Not part of the conversational core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSettings {
    pub pattern: BackgroundPattern,
    pub color: String,
    pub opacity: f32,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            pattern: BackgroundPattern::Gradient,
            color: "#8B5CF6".to_string(),
            opacity: 0.2,
        }
    }
}

impl BackgroundSettings {
    /// Parses `color` as `#RRGGBB`.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.color)
    }

    pub fn clamped_opacity(&self) -> f32 {
        self.opacity.clamp(0.0, 1.0)
    }
}

pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn default_matches_violet_gradient() {
        let settings = BackgroundSettings::default();
        assert_eq!(settings.pattern, BackgroundPattern::Gradient);
        assert_eq!(settings.rgb(), Some((0x8B, 0x5C, 0xF6)));
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(parse_hex_color("8B5CF6"), None);
        assert_eq!(parse_hex_color("#8B5CF"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }

    #[test]
    fn pattern_parses_from_lowercase_name() {
        assert_eq!(
            BackgroundPattern::from_str("waves").expect("parse"),
            BackgroundPattern::Waves
        );
        assert!(BackgroundPattern::from_str("stripes").is_err());
    }
}
