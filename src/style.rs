//! Font and cell style descriptors
//!
//! Every attribute is optional: an absent value means "leave the engine's
//! default". Both [`FontSpec`] and [`StyleSpec`] compare and hash by value so
//! they can key the per-generation resource tables.

use std::fmt;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xFFFFFF);

    /// Create a color from `0xRRGGBB`; bits above 24 are dropped
    pub const fn new(rgb: u32) -> Self {
        Rgb(rgb & 0x00FF_FFFF)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    pub const fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(&self) -> u8 {
        self.0 as u8
    }

    /// Opaque ARGB hex string as used by SpreadsheetML (`FFRRGGBB`)
    pub fn to_argb_hex(&self) -> String {
        format!("FF{:06X}", self.0)
    }
}

impl From<u32> for Rgb {
    fn from(rgb: u32) -> Self {
        Rgb::new(rgb)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Cell fill patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillPattern {
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

impl FillPattern {
    /// SpreadsheetML `patternType` value
    pub fn as_str(&self) -> &'static str {
        match self {
            FillPattern::None => "none",
            FillPattern::Solid => "solid",
            FillPattern::MediumGray => "mediumGray",
            FillPattern::DarkGray => "darkGray",
            FillPattern::LightGray => "lightGray",
            FillPattern::DarkHorizontal => "darkHorizontal",
            FillPattern::DarkVertical => "darkVertical",
            FillPattern::DarkDown => "darkDown",
            FillPattern::DarkUp => "darkUp",
            FillPattern::DarkGrid => "darkGrid",
            FillPattern::DarkTrellis => "darkTrellis",
            FillPattern::LightHorizontal => "lightHorizontal",
            FillPattern::LightVertical => "lightVertical",
            FillPattern::LightDown => "lightDown",
            FillPattern::LightUp => "lightUp",
            FillPattern::LightGrid => "lightGrid",
            FillPattern::LightTrellis => "lightTrellis",
            FillPattern::Gray125 => "gray125",
            FillPattern::Gray0625 => "gray0625",
        }
    }
}

/// Horizontal cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HorizontalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalAlignment::General => "general",
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::Right => "right",
            HorizontalAlignment::Fill => "fill",
            HorizontalAlignment::Justify => "justify",
            HorizontalAlignment::CenterContinuous => "centerContinuous",
            HorizontalAlignment::Distributed => "distributed",
        }
    }
}

/// Vertical cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
            VerticalAlignment::Justify => "justify",
            VerticalAlignment::Distributed => "distributed",
        }
    }
}

/// Font attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FontSpec {
    /// Font family name
    pub name: Option<String>,
    /// Font size in points
    pub size: Option<u16>,
    /// Font color
    pub color: Option<Rgb>,
}

impl FontSpec {
    /// White text, readable on the default header fill
    pub const DEFAULT_HEADER: FontSpec = FontSpec {
        name: None,
        size: None,
        color: Some(Rgb::WHITE),
    };

    pub const DEFAULT_BODY: FontSpec = FontSpec {
        name: None,
        size: None,
        color: None,
    };

    pub fn new() -> Self {
        FontSpec::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_size(mut self, points: u16) -> Self {
        self.size = Some(points);
        self
    }

    pub fn with_color(mut self, color: impl Into<Rgb>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Cell style attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StyleSpec {
    pub fill_pattern: Option<FillPattern>,
    pub fill_color: Option<Rgb>,
    pub horizontal_alignment: Option<HorizontalAlignment>,
    pub vertical_alignment: Option<VerticalAlignment>,
    pub font: Option<FontSpec>,
    /// Number/date format code, e.g. `yyyy-mm-dd`
    pub data_format: Option<String>,
}

impl StyleSpec {
    /// Solid black fill, centered, white font
    pub const DEFAULT_HEADER: StyleSpec = StyleSpec {
        fill_pattern: Some(FillPattern::Solid),
        fill_color: Some(Rgb::BLACK),
        horizontal_alignment: Some(HorizontalAlignment::Center),
        vertical_alignment: None,
        font: Some(FontSpec::DEFAULT_HEADER),
        data_format: None,
    };

    /// No attributes: spreadsheet defaults everywhere
    pub const DEFAULT_BODY: StyleSpec = StyleSpec {
        fill_pattern: None,
        fill_color: None,
        horizontal_alignment: None,
        vertical_alignment: None,
        font: None,
        data_format: None,
    };

    pub fn new() -> Self {
        StyleSpec::default()
    }

    /// A style with every attribute absent
    pub fn empty() -> Self {
        StyleSpec::default()
    }

    pub fn with_fill_pattern(mut self, pattern: FillPattern) -> Self {
        self.fill_pattern = Some(pattern);
        self
    }

    pub fn with_fill_color(mut self, color: impl Into<Rgb>) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    pub fn with_horizontal_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.horizontal_alignment = Some(alignment);
        self
    }

    pub fn with_vertical_alignment(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical_alignment = Some(alignment);
        self
    }

    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_data_format(mut self, format: impl Into<String>) -> Self {
        self.data_format = Some(format.into());
        self
    }

    /// Overlay `over` onto `base`: present fields of `over` win, absent ones fall back to `base`.
    ///
    /// The embedded font is replaced as a whole, not merged attribute by attribute.
    pub fn merge(base: &StyleSpec, over: &StyleSpec) -> StyleSpec {
        StyleSpec {
            fill_pattern: over.fill_pattern.or(base.fill_pattern),
            fill_color: over.fill_color.or(base.fill_color),
            horizontal_alignment: over.horizontal_alignment.or(base.horizontal_alignment),
            vertical_alignment: over.vertical_alignment.or(base.vertical_alignment),
            font: over.font.clone().or_else(|| base.font.clone()),
            data_format: over
                .data_format
                .clone()
                .or_else(|| base.data_format.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == StyleSpec::DEFAULT_BODY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn striped() -> StyleSpec {
        StyleSpec::new()
            .with_fill_pattern(FillPattern::LightHorizontal)
            .with_fill_color(0xDDEEFF)
            .with_vertical_alignment(VerticalAlignment::Top)
            .with_font(FontSpec::new().with_name("Arial").with_size(10))
    }

    #[test]
    fn test_merge_override_wins_per_field() {
        let base = striped();
        let over = StyleSpec::new()
            .with_fill_color(0x112233)
            .with_data_format("0.00");

        let merged = StyleSpec::merge(&base, &over);

        assert_eq!(merged.fill_color, Some(Rgb::new(0x112233)));
        assert_eq!(merged.data_format.as_deref(), Some("0.00"));
        assert_eq!(merged.fill_pattern, base.fill_pattern);
        assert_eq!(merged.vertical_alignment, base.vertical_alignment);
        assert_eq!(merged.font, base.font);
        assert_eq!(merged.horizontal_alignment, None);
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let base = striped();
        assert_eq!(StyleSpec::merge(&base, &StyleSpec::empty()), base);
        assert_eq!(
            StyleSpec::merge(&StyleSpec::DEFAULT_HEADER, &StyleSpec::empty()),
            StyleSpec::DEFAULT_HEADER
        );
    }

    #[test]
    fn test_merge_onto_empty_yields_override() {
        let over = striped();
        assert_eq!(StyleSpec::merge(&StyleSpec::empty(), &over), over);
    }

    #[test]
    fn test_value_equality_deduplicates() {
        let mut set = HashSet::new();
        set.insert(striped());
        set.insert(striped());
        set.insert(StyleSpec::DEFAULT_HEADER);
        assert_eq!(set.len(), 2);

        let mut fonts = HashSet::new();
        fonts.insert(FontSpec::new().with_size(12));
        fonts.insert(FontSpec::new().with_size(12));
        fonts.insert(FontSpec::new().with_size(14));
        assert_eq!(fonts.len(), 2);
    }

    #[test]
    fn test_default_header_theme() {
        let header = StyleSpec::DEFAULT_HEADER;
        assert_eq!(header.fill_pattern, Some(FillPattern::Solid));
        assert_eq!(header.fill_color, Some(Rgb::BLACK));
        assert_eq!(header.horizontal_alignment, Some(HorizontalAlignment::Center));
        assert_eq!(header.font.and_then(|f| f.color), Some(Rgb::WHITE));
        assert!(StyleSpec::DEFAULT_BODY.is_empty());
    }

    #[test]
    fn test_rgb() {
        let color = Rgb::new(0x12_AB_CD_EF);
        assert_eq!(color.value(), 0xAB_CD_EF);
        assert_eq!(color.red(), 0xAB);
        assert_eq!(color.blue(), 0xEF);
        assert_eq!(color.to_argb_hex(), "FFABCDEF");
        assert_eq!(Rgb::BLACK.to_string(), "#000000");
    }
}
