//! QR code generation for label payloads.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Luma, RgbImage};
use qrcode::{EcLevel, QrCode};

use crate::error::LabelError;

/// Encode `data` at low error correction and scale the symbol, quiet zone
/// included, to exactly `size` x `size` pixels.
pub fn generate_qr_image(data: &str, size: u32) -> Result<RgbImage, LabelError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
        .map_err(|e| LabelError::QrCode(e.to_string()))?;

    let native = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(1, 1)
        .build();

    let scaled = imageops::resize(&native, size, size, FilterType::Nearest);
    Ok(DynamicImage::ImageLuma8(scaled).to_rgb8())
}
