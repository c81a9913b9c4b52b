//! Text measurement and drawing.
//!
//! A [`StyleProvider`] is handed to the label renderer at construction. Two
//! implementations exist: [`TrueTypeStyles`], backed by a TrueType face, and
//! [`BitmapStyles`], a built-in 8x8 face that needs no external resources and
//! is always available as the fallback.

use image::{Rgb, RgbImage};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use rusttype::{point, Font, Scale};
use std::path::{Path, PathBuf};

use crate::config::FontSizes;
use crate::error::LabelError;

/// Locations tried, in order, when no font file is given.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "arial.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Name,
    Email,
    ClassOption,
}

impl FontSizes {
    pub fn px(&self, style: TextStyle) -> f32 {
        match style {
            TextStyle::Name => self.name,
            TextStyle::Email => self.email,
            TextStyle::ClassOption => self.class_option,
        }
    }
}

/// Ink box of a string laid out with its ascent line at y = 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBounds {
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    fn union(self, other: TextBounds) -> TextBounds {
        TextBounds {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

pub trait StyleProvider: Send + Sync {
    fn measure(&self, style: TextStyle, text: &str) -> TextBounds;

    /// Draw `text` with its ascent line at `y`, clipped to the canvas.
    fn draw(&self, canvas: &mut RgbImage, style: TextStyle, x: i32, y: i32, text: &str, color: Rgb<u8>);
}

/// Alpha-blend `color` over the canvas pixel at (x, y), ignoring off-canvas points.
fn blend_pixel(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (*dst as f32 * (1.0 - coverage) + src as f32 * coverage).round() as u8;
    }
}

// ============================================================================
// TrueType Styles
// ============================================================================

pub struct TrueTypeStyles {
    font: Font<'static>,
    sizes: FontSizes,
}

impl TrueTypeStyles {
    pub fn from_bytes(bytes: Vec<u8>, sizes: FontSizes) -> Result<Self, LabelError> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| LabelError::Configuration("not a usable TrueType font".to_string()))?;
        Ok(Self { font, sizes })
    }

    pub fn from_file(path: impl AsRef<Path>, sizes: FontSizes) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| LabelError::Configuration(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(bytes, sizes)
            .map_err(|e| LabelError::Configuration(format!("{}: {}", path.display(), e)))
    }

    fn scale(&self, style: TextStyle) -> Scale {
        Scale::uniform(self.sizes.px(style))
    }
}

impl StyleProvider for TrueTypeStyles {
    fn measure(&self, style: TextStyle, text: &str) -> TextBounds {
        let scale = self.scale(style);
        let ascent = self.font.v_metrics(scale).ascent;
        self.font
            .layout(text, scale, point(0.0, ascent))
            .filter_map(|glyph| glyph.pixel_bounding_box())
            .map(|bb| TextBounds {
                left: bb.min.x,
                top: bb.min.y,
                right: bb.max.x,
                bottom: bb.max.y,
            })
            .reduce(TextBounds::union)
            .unwrap_or_default()
    }

    fn draw(&self, canvas: &mut RgbImage, style: TextStyle, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        let scale = self.scale(style);
        let ascent = self.font.v_metrics(scale).ascent;
        let origin = point(x as f32, y as f32 + ascent);
        for glyph in self.font.layout(text, scale, origin) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    blend_pixel(canvas, bb.min.x + gx as i32, bb.min.y + gy as i32, color, coverage);
                });
            }
        }
    }
}

// ============================================================================
// Bitmap Styles
// ============================================================================

const BITMAP_CELL: u32 = 8;

/// Built-in 8x8 face for ASCII and Latin-1, scaled by whole pixels.
#[derive(Debug, Clone, Copy)]
pub struct BitmapStyles {
    sizes: FontSizes,
}

impl BitmapStyles {
    pub fn new(sizes: FontSizes) -> Self {
        Self { sizes }
    }

    fn scale(&self, style: TextStyle) -> u32 {
        ((self.sizes.px(style) / 10.0) as u32).max(1)
    }

    fn glyph(c: char) -> [u8; 8] {
        BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }
}

impl Default for BitmapStyles {
    fn default() -> Self {
        Self::new(FontSizes::default())
    }
}

impl StyleProvider for BitmapStyles {
    fn measure(&self, style: TextStyle, text: &str) -> TextBounds {
        let count = text.chars().count() as i32;
        if count == 0 {
            return TextBounds::default();
        }
        let cell = (BITMAP_CELL * self.scale(style)) as i32;
        TextBounds {
            left: 0,
            top: 0,
            right: count * cell,
            bottom: cell,
        }
    }

    fn draw(&self, canvas: &mut RgbImage, style: TextStyle, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        let scale = self.scale(style) as i32;
        let advance = BITMAP_CELL as i32 * scale;
        for (index, c) in text.chars().enumerate() {
            let glyph_x = x + index as i32 * advance;
            for (row, bits) in Self::glyph(c).into_iter().enumerate() {
                for col in 0..BITMAP_CELL as i32 {
                    if bits & (1u8 << col) == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            blend_pixel(
                                canvas,
                                glyph_x + col * scale + dx,
                                y + row as i32 * scale + dy,
                                color,
                                1.0,
                            );
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Load the requested font, or the first default candidate that loads.
///
/// Never fails: when nothing loads, the built-in bitmap face is returned along
/// with the error that explains why.
pub fn resolve_styles(
    font: Option<&Path>,
    sizes: FontSizes,
) -> (Box<dyn StyleProvider>, Option<LabelError>) {
    let candidates: Vec<PathBuf> = match font {
        Some(path) => vec![path.to_path_buf()],
        None => DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
    };

    let mut last_error = None;
    for candidate in &candidates {
        match TrueTypeStyles::from_file(candidate, sizes) {
            Ok(styles) => return (Box::new(styles), None),
            Err(e) => last_error = Some(e),
        }
    }

    let reason = match (font, last_error) {
        (Some(_), Some(e)) => e,
        _ => LabelError::Configuration("no default font could be loaded".to_string()),
    };
    (Box::new(BitmapStyles::new(sizes)), Some(reason))
}

/// DejaVu Sans shipped under `fonts/`, for tests that need a real face.
#[cfg(test)]
pub(crate) fn dejavu_sans() -> TrueTypeStyles {
    let bytes = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/fonts/DejaVuSans.ttf"));
    TrueTypeStyles::from_bytes(bytes.to_vec(), FontSizes::default()).expect("bundled font parses")
}
