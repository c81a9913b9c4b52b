//! Layout configuration: compile-time defaults plus an optional JSON overlay.

use serde::Deserialize;
use std::path::Path;

use crate::error::LabelError;

// ============================================================================
// Constants
// ============================================================================

/// Print resolution in dots per inch
pub const DEFAULT_DPI: u32 = 300;

pub const MM_PER_INCH: f64 = 25.4;

/// A4 at 300 DPI
pub const A4_WIDTH_PX: u32 = 2480;
pub const A4_HEIGHT_PX: u32 = 3508;

/// Largest accepted sheet side in pixels
pub const MAX_SHEET_SIDE_PX: u32 = 20_000;

/// A4 physical size, used for PDF output
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Label size in mm
pub const LABEL_WIDTH_MM: f64 = 70.0;
pub const LABEL_HEIGHT_MM: f64 = 37.0;

/// QR code side in mm
pub const QR_SIZE_MM: f64 = 15.0;

/// Interior label padding in pixels
pub const LABEL_PADDING_X: u32 = 20;
pub const LABEL_PADDING_Y: u32 = 10;

/// Font sizes in pixels
pub const NAME_FONT_PX: f32 = 50.0;
pub const EMAIL_FONT_PX: f32 = 40.0;
pub const CLASS_OPTION_FONT_PX: f32 = 40.0;

/// Appended to the class/option line
pub const SCHOOL_TAG: &str = "LPETH";

/// Appended to bare e-mail prefixes
pub const DEFAULT_EMAIL_DOMAIN: &str = "eduhainaut.be";

// ============================================================================
// Unit Conversion
// ============================================================================

/// Convert millimetres to whole pixels at `dpi`, truncating toward zero.
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    if mm <= 0.0 {
        return 0;
    }
    ((mm / MM_PER_INCH) * dpi as f64) as u32
}

// ============================================================================
// Layout Configuration
// ============================================================================

/// Pixel sizes of the three text styles.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontSizes {
    pub name: f32,
    pub email: f32,
    pub class_option: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            name: NAME_FONT_PX,
            email: EMAIL_FONT_PX,
            class_option: CLASS_OPTION_FONT_PX,
        }
    }
}

/// Everything the renderer and compositor need to know about physical layout.
///
/// Every field may be omitted from a JSON config file; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub dpi: u32,
    /// (width, height)
    pub label_size_mm: (f64, f64),
    pub qr_size_mm: f64,
    /// (x, y)
    pub padding_px: (u32, u32),
    /// Extra distance between the QR code and the bottom padding.
    pub qr_bottom_offset_px: u32,
    /// (width, height)
    pub sheet_size_px: (u32, u32),
    /// (left, top)
    pub margin_mm: (f64, f64),
    /// (x, y)
    pub spacing_px: (u32, u32),
    pub font_sizes: FontSizes,
    pub school_tag: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            label_size_mm: (LABEL_WIDTH_MM, LABEL_HEIGHT_MM),
            qr_size_mm: QR_SIZE_MM,
            padding_px: (LABEL_PADDING_X, LABEL_PADDING_Y),
            qr_bottom_offset_px: 0,
            sheet_size_px: (A4_WIDTH_PX, A4_HEIGHT_PX),
            margin_mm: (0.0, 0.0),
            spacing_px: (0, 0),
            font_sizes: FontSizes::default(),
            school_tag: SCHOOL_TAG.to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LabelError> {
        let config: LayoutConfig = serde_json::from_str(json)
            .map_err(|e| LabelError::Configuration(format!("Invalid layout JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LabelError::Configuration(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<(), LabelError> {
        let invalid = |msg: String| Err(LabelError::Configuration(msg));

        if self.dpi == 0 {
            return invalid("dpi must be positive".to_string());
        }
        let (sheet_w, sheet_h) = self.sheet_size_px;
        if sheet_w == 0 || sheet_h == 0 || sheet_w > MAX_SHEET_SIDE_PX || sheet_h > MAX_SHEET_SIDE_PX {
            return invalid(format!(
                "sheet size {}x{} px must be between 1 and {} px per side",
                sheet_w, sheet_h, MAX_SHEET_SIDE_PX
            ));
        }

        let (w, h) = self.label_size_mm;
        let (label_w, label_h) = (mm_to_px(w, self.dpi), mm_to_px(h, self.dpi));
        if label_w == 0 || label_h == 0 {
            return invalid(format!("label size {}x{} mm is too small", w, h));
        }
        if label_w > sheet_w || label_h > sheet_h {
            return invalid(format!(
                "label size {}x{} px does not fit on a {}x{} px sheet",
                label_w, label_h, sheet_w, sheet_h
            ));
        }

        let qr = mm_to_px(self.qr_size_mm, self.dpi);
        if qr == 0 {
            return invalid(format!("QR size {} mm is too small", self.qr_size_mm));
        }
        if qr > label_w || qr > label_h {
            return invalid(format!("QR size {} px does not fit on the label", qr));
        }

        let (pad_x, pad_y) = self.padding_px;
        if pad_x > label_w / 2 || pad_y > label_h / 2 || self.qr_bottom_offset_px > label_h {
            return invalid("label padding is larger than the label".to_string());
        }

        let (margin_left, margin_top) = (
            mm_to_px(self.margin_mm.0, self.dpi),
            mm_to_px(self.margin_mm.1, self.dpi),
        );
        let (spacing_x, spacing_y) = self.spacing_px;
        if margin_left > sheet_w || spacing_x > sheet_w || margin_top > sheet_h || spacing_y > sheet_h {
            return invalid("margins and spacing must be smaller than the sheet".to_string());
        }

        let sizes = self.font_sizes;
        for px in [sizes.name, sizes.email, sizes.class_option] {
            if !px.is_finite() || px <= 0.0 || px > label_h as f32 {
                return invalid(format!("font size {} px must be positive and fit on the label", px));
            }
        }
        Ok(())
    }
}
