use parley_protocol::BackgroundPattern;
use parley_protocol::BackgroundSettings;
use ratatui::style::Color;

/// Accent used when the configured color is not `#RRGGBB`.
const FALLBACK_ACCENT: (u8, u8, u8) = (0x8B, 0x5C, 0xF6);

/// Colors derived from the cosmetic background settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    /// Accent tinted over a black background by the configured opacity.
    pub tint: Color,
    pub pattern: BackgroundPattern,
}

impl Theme {
    pub fn from_background(settings: &BackgroundSettings) -> Self {
        let rgb = settings.rgb().unwrap_or_else(|| {
            tracing::warn!(color = %settings.color, "ignoring malformed background color");
            FALLBACK_ACCENT
        });
        let (r, g, b) = rgb;
        let (tr, tg, tb) = tint_over_black(rgb, settings.clamped_opacity());
        Self {
            accent: Color::Rgb(r, g, b),
            tint: Color::Rgb(tr, tg, tb),
            pattern: settings.pattern,
        }
    }

    /// A decorative rule filling `width` columns with the pattern's glyph.
    pub fn pattern_rule(&self, width: u16) -> String {
        let glyph = match self.pattern {
            BackgroundPattern::Waves => '≈',
            BackgroundPattern::Circles => '∘',
            BackgroundPattern::Gradient => '░',
        };
        std::iter::repeat_n(glyph, usize::from(width)).collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_background(&BackgroundSettings::default())
    }
}

fn tint_over_black((r, g, b): (u8, u8, u8), opacity: f32) -> (u8, u8, u8) {
    let scale = |channel: u8| (f32::from(channel) * opacity).round() as u8;
    (scale(r), scale(g), scale(b))
}
