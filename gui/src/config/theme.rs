// Colour palettes for the chart and trading controls
use serde::{Deserialize, Serialize};

use super::CandleStyle;
use crate::state::app_state::Theme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePalette {
    pub background: String,
    pub foreground: String,
    pub grid: String,
    pub axis_text: String,
    pub live_line: String,
    pub countdown_bg: String,
    pub call: String,
    pub put: String,
    pub chart_bullish: String,
    pub chart_bearish: String,
}

impl ThemePalette {
    pub fn default_dark() -> Self {
        Self {
            background: "#131722".to_string(),
            foreground: "#d1d4dc".to_string(),
            grid: "#2a2e39".to_string(),
            axis_text: "#787b86".to_string(),
            live_line: "#f0b90b".to_string(),
            countdown_bg: "#363a45".to_string(),
            call: "#26a69a".to_string(),
            put: "#ef5350".to_string(),
            chart_bullish: "#26a69a".to_string(),
            chart_bearish: "#ef5350".to_string(),
        }
    }

    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            foreground: "#131722".to_string(),
            grid: "#e0e3eb".to_string(),
            axis_text: "#4a4e59".to_string(),
            live_line: "#d18b00".to_string(),
            countdown_bg: "#e0e3eb".to_string(),
            call: "#089981".to_string(),
            put: "#f23645".to_string(),
            chart_bullish: "#4caf50".to_string(),
            chart_bearish: "#f44336".to_string(),
        }
    }

    pub fn for_theme(theme: &Theme) -> Self {
        match theme {
            Theme::Dark => Self::default_dark(),
            Theme::Light => Self::default_light(),
        }
    }

    /// Candle colours configured in the chart section win over the palette defaults.
    pub fn with_candle_style(mut self, style: &CandleStyle) -> Self {
        if !style.bullish_color.is_empty() {
            self.chart_bullish = style.bullish_color.clone();
        }
        if !style.bearish_color.is_empty() {
            self.chart_bearish = style.bearish_color.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_style_overrides_palette() {
        let style = CandleStyle {
            bullish_color: "#00ff00".to_string(),
            bearish_color: String::new(),
            body_width_ratio: 0.7,
            wick_width: 1.0,
        };
        let palette = ThemePalette::for_theme(&Theme::Light).with_candle_style(&style);
        assert_eq!(palette.chart_bullish, "#00ff00");
        assert_eq!(palette.chart_bearish, ThemePalette::default_light().chart_bearish);
    }
}
