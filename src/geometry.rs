//! Pixel geometry of a single label and of the label grid on a sheet.

use std::fmt;

use crate::config::{mm_to_px, LayoutConfig};
use crate::error::LabelError;

pub const GRID_COLUMNS: u32 = 3;
pub const GRID_ROWS: u32 = 8;
pub const GRID_CELLS: u32 = GRID_COLUMNS * GRID_ROWS;

// ============================================================================
// Grid Position
// ============================================================================

/// 1-based, row-major index into the 3x8 label grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPosition(u32);

impl GridPosition {
    pub fn new(position: u32) -> Result<Self, LabelError> {
        if (1..=GRID_CELLS).contains(&position) {
            Ok(Self(position))
        } else {
            Err(LabelError::InvalidPosition(position))
        }
    }

    /// All positions in row-major order.
    pub fn all() -> impl Iterator<Item = GridPosition> {
        (1..=GRID_CELLS).map(GridPosition)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Zero-based row.
    pub fn row(self) -> u32 {
        (self.0 - 1) / GRID_COLUMNS
    }

    /// Zero-based column.
    pub fn column(self) -> u32 {
        (self.0 - 1) % GRID_COLUMNS
    }
}

impl TryFrom<u32> for GridPosition {
    type Error = LabelError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Label Geometry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelGeometry {
    pub width: u32,
    pub height: u32,
    pub padding_x: u32,
    pub padding_y: u32,
    pub qr_size: u32,
    pub qr_bottom_offset: u32,
}

impl LabelGeometry {
    pub fn from_config(config: &LayoutConfig) -> Self {
        let (width_mm, height_mm) = config.label_size_mm;
        Self {
            width: mm_to_px(width_mm, config.dpi),
            height: mm_to_px(height_mm, config.dpi),
            padding_x: config.padding_px.0,
            padding_y: config.padding_px.1,
            qr_size: mm_to_px(config.qr_size_mm, config.dpi),
            qr_bottom_offset: config.qr_bottom_offset_px,
        }
    }

    /// Horizontal room for a text line between the side paddings.
    pub fn text_width(&self) -> u32 {
        self.width.saturating_sub(self.padding_x.saturating_mul(2))
    }

    /// Top-left corner of the QR code: centred horizontally, anchored to the
    /// bottom padding. May be negative on labels too small for the code.
    pub fn qr_origin(&self) -> (i64, i64) {
        let x = (self.width as i64 - self.qr_size as i64) / 2;
        let y = self.height as i64
            - self.qr_size as i64
            - self.padding_y as i64
            - self.qr_bottom_offset as i64;
        (x, y)
    }
}

impl Default for LabelGeometry {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

// ============================================================================
// Sheet Geometry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGeometry {
    pub width: u32,
    pub height: u32,
    pub label_width: u32,
    pub label_height: u32,
    pub margin_left: u32,
    pub margin_top: u32,
    pub spacing_x: u32,
    pub spacing_y: u32,
}

impl SheetGeometry {
    pub fn from_config(config: &LayoutConfig) -> Self {
        let label = LabelGeometry::from_config(config);
        Self {
            width: config.sheet_size_px.0,
            height: config.sheet_size_px.1,
            label_width: label.width,
            label_height: label.height,
            margin_left: mm_to_px(config.margin_mm.0, config.dpi),
            margin_top: mm_to_px(config.margin_mm.1, config.dpi),
            spacing_x: config.spacing_px.0,
            spacing_y: config.spacing_px.1,
        }
    }

    /// Pixel origin of the cell at `position`, saturating at `u32::MAX` for
    /// geometries far larger than any sheet.
    pub fn origin_of(&self, position: GridPosition) -> (u32, u32) {
        let x = self.margin_left as u64
            + position.column() as u64 * (self.label_width as u64 + self.spacing_x as u64);
        let y = self.margin_top as u64
            + position.row() as u64 * (self.label_height as u64 + self.spacing_y as u64);
        (saturate(x), saturate(y))
    }

    /// Whether every cell lies entirely on the sheet.
    pub fn fits(&self) -> bool {
        let right = self.margin_left as u64
            + GRID_COLUMNS as u64 * self.label_width as u64
            + (GRID_COLUMNS - 1) as u64 * self.spacing_x as u64;
        let bottom = self.margin_top as u64
            + GRID_ROWS as u64 * self.label_height as u64
            + (GRID_ROWS - 1) as u64 * self.spacing_y as u64;
        right <= self.width as u64 && bottom <= self.height as u64
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl Default for SheetGeometry {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}
