//! Serialization of finished sheets to PNG or a single-page PDF.

use ::image::{ImageFormat, RgbImage};
use printpdf::*;
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use crate::config::{A4_HEIGHT_MM, A4_WIDTH_MM, MM_PER_INCH};
use crate::error::LabelError;

pub fn encode_png(sheet: &RgbImage) -> Result<Vec<u8>, LabelError> {
    let mut bytes = Cursor::new(Vec::new());
    sheet
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| LabelError::Export(e.to_string()))?;
    Ok(bytes.into_inner())
}

pub fn save_png(sheet: &RgbImage, path: impl AsRef<Path>) -> Result<(), LabelError> {
    let bytes = encode_png(sheet)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Write `sheet` as an A4 PDF page, scaled so one image pixel is one dot at
/// `dpi` and anchored to the top-left corner of the page.
pub fn save_pdf(sheet: &RgbImage, dpi: u32, path: impl AsRef<Path>) -> Result<(), LabelError> {
    let (doc, page, layer) = PdfDocument::new(
        "Label Sheet",
        Mm(A4_WIDTH_MM),
        Mm(A4_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let (width, height) = sheet.dimensions();
    let image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: sheet.as_raw().clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // PDF origin is bottom-left
    let height_mm = height as f32 / dpi as f32 * MM_PER_INCH as f32;
    image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(A4_HEIGHT_MM - height_mm)),
            dpi: Some(dpi as f32),
            ..Default::default()
        },
    );

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer)
        .map_err(|e| LabelError::Export(e.to_string()))?;
    Ok(())
}
