use em_core::error::MosaicError;
use em_core::frame::MosaicGrid;
use em_core::palette::Palette;
use em_core::traits::MosaicRenderer;

use crate::matcher::Matcher;

/// Render a mosaic as a grid of palette glyphs (emoji-art mode).
///
/// Each cell is replaced by the glyph of its nearest palette entry, or the
/// entry's name when it has no glyph. Rows end with `\n`.
///
/// # Example
/// ```
/// use em_core::color::Rgb;
/// use em_core::frame::MosaicGrid;
/// use em_core::palette::{Palette, PaletteEntry};
/// use em_core::traits::MosaicRenderer;
/// use em_mosaic::glyph::GlyphRenderer;
///
/// let palette = Palette::from_entries([
///     PaletteEntry::new("night", 0, 0, 0).with_glyph("🌑"),
///     PaletteEntry::new("sun", 250, 220, 60).with_glyph("🌞"),
/// ]);
/// let cells = vec![Some(Rgb::new(5, 5, 5)), Some(Rgb::new(240, 200, 80)), None];
/// let mosaic = MosaicGrid::new(3, 1, 4, 12, 4, cells).unwrap();
/// let text = GlyphRenderer::new(&palette).unwrap().render(&mosaic).unwrap();
/// assert_eq!(text, "🌑🌞 \n");
/// ```
pub struct GlyphRenderer<'a> {
    matcher: Matcher<'a>,
    blank: String,
    color: bool,
}

impl<'a> GlyphRenderer<'a> {
    /// Renderer over a loaded palette.
    ///
    /// # Errors
    /// Returns `EmptyPalette` if the palette has no entries.
    pub fn new(palette: &'a Palette) -> Result<Self, MosaicError> {
        Ok(Self {
            matcher: Matcher::new(palette)?,
            blank: " ".to_string(),
            color: false,
        })
    }

    /// Text emitted for fully transparent blocks.
    #[must_use]
    pub fn with_blank(mut self, blank: impl Into<String>) -> Self {
        self.blank = blank.into();
        self
    }

    /// Wrap each glyph in a truecolor foreground escape of its entry color.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl MosaicRenderer for GlyphRenderer<'_> {
    type Output = String;

    fn render(&self, mosaic: &MosaicGrid) -> Result<String, MosaicError> {
        let mut out = String::new();
        for row in mosaic.cell_rows() {
            for cell in row {
                match cell {
                    Some(color) => {
                        let entry = self.matcher.nearest(*color).entry;
                        if self.color {
                            out.push_str(&format!(
                                "\x1b[38;2;{};{};{}m{}\x1b[0m",
                                entry.r,
                                entry.g,
                                entry.b,
                                entry.display()
                            ));
                        } else {
                            out.push_str(entry.display());
                        }
                    }
                    None => out.push_str(&self.blank),
                }
            }
            out.push('\n');
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "glyph"
    }
}
