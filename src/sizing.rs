//! Column sizing policy applied after all rows are written

/// Width of one character of the default font, in pixels
pub const DEFAULT_CHARACTER_WIDTH_PX: f64 = 7.0017;

/// Column widths are stored in 1/256 of a character width
pub const WIDTH_UNITS_PER_CHARACTER: u32 = 256;

/// Sizing calibration for auto-sized columns
///
/// The constants describe SpreadsheetML width units (1/256 character); they are
/// calibration data for this engine, not a portable formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingPolicy {
    /// Columns narrower than this after auto-sizing get `fallback_width`
    pub min_width_px: f64,
    /// Fallback width in 1/256 character units
    pub fallback_width: u32,
    /// Pixel width of one character, used for pixel conversion
    pub character_width_px: f64,
    /// Extra characters added to the measured content width
    pub padding_chars: f64,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        SizingPolicy {
            min_width_px: 64.0,
            // 8.43 characters (Excel's default column) plus padding
            fallback_width: (8.43_f64 * f64::from(WIDTH_UNITS_PER_CHARACTER)).round() as u32 + 200,
            character_width_px: DEFAULT_CHARACTER_WIDTH_PX,
            padding_chars: 1.0,
        }
    }
}

impl SizingPolicy {
    /// Read the minimum pixel width from `EXCELGEN_MIN_COLUMN_PX`, keeping defaults otherwise
    pub fn from_env() -> Self {
        std::env::var("EXCELGEN_MIN_COLUMN_PX")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|px| px.is_finite() && *px >= 0.0)
            .map(|px| SizingPolicy::default().with_min_width_px(px))
            .unwrap_or_default()
    }

    pub fn with_min_width_px(mut self, px: f64) -> Self {
        self.min_width_px = px;
        self
    }

    pub fn with_fallback_width(mut self, units: u32) -> Self {
        self.fallback_width = units;
        self
    }

    pub fn with_character_width_px(mut self, px: f64) -> Self {
        self.character_width_px = px;
        self
    }

    pub fn with_padding_chars(mut self, chars: f64) -> Self {
        self.padding_chars = chars;
        self
    }

    /// Convert a width in 1/256 character units to pixels
    pub fn units_to_pixels(&self, units: u32) -> f64 {
        f64::from(units) / f64::from(WIDTH_UNITS_PER_CHARACTER) * self.character_width_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fallback_width() {
        let policy = SizingPolicy::default();
        assert_eq!(policy.fallback_width, 2358);
        assert!(policy.units_to_pixels(policy.fallback_width) >= policy.min_width_px);
    }

    #[test]
    fn test_units_to_pixels() {
        let policy = SizingPolicy::default();
        assert!((policy.units_to_pixels(256) - DEFAULT_CHARACTER_WIDTH_PX).abs() < 1e-9);
        assert!(policy.units_to_pixels(2048) < 64.0);
    }

    #[test]
    fn test_builder_overrides() {
        let policy = SizingPolicy::default()
            .with_min_width_px(100.0)
            .with_fallback_width(4000)
            .with_character_width_px(8.0)
            .with_padding_chars(2.0);
        assert_eq!(policy.min_width_px, 100.0);
        assert_eq!(policy.units_to_pixels(512), 16.0);
        assert_eq!(policy.fallback_width, 4000);
        assert_eq!(policy.padding_chars, 2.0);
    }
}
