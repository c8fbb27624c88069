//! PIX QR rendering
//!
//! Turns the copy-paste PIX string into a base64 PNG. Rendering failure must
//! not lose the payment: the caller gets a fixed placeholder image instead
//! and the copy-paste code still works.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{GrayImage, Luma};
use qrcode::{Color, QrCode};

/// 1x1 PNG served when rendering fails; the client still shows the
/// copy-paste code next to it.
pub const PLACEHOLDER_QR_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

/// Pixels per QR module
const MODULE_SCALE: u32 = 8;
/// Quiet-zone width in modules, per the QR spec
const QUIET_ZONE: u32 = 4;

/// Render a PIX code to a base64 PNG, falling back to the placeholder.
pub fn render_base64(pix_code: &str) -> String {
    match try_render(pix_code) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::warn!(error = %e, "QR rendering failed, using placeholder image");
            PLACEHOLDER_QR_BASE64.to_string()
        }
    }
}

fn try_render(pix_code: &str) -> Result<String, Box<dyn std::error::Error>> {
    let code = QrCode::new(pix_code.as_bytes())?;
    let width = code.width() as u32;
    let colors = code.to_colors();

    let dimension = (width + 2 * QUIET_ZONE) * MODULE_SCALE;
    let mut canvas = GrayImage::from_pixel(dimension, dimension, Luma([0xFF]));

    for (index, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let module_x = index as u32 % width;
        let module_y = index as u32 / width;
        let origin_x = (module_x + QUIET_ZONE) * MODULE_SCALE;
        let origin_y = (module_y + QUIET_ZONE) * MODULE_SCALE;
        for dy in 0..MODULE_SCALE {
            for dx in 0..MODULE_SCALE {
                canvas.put_pixel(origin_x + dx, origin_y + dy, Luma([0x00]));
            }
        }
    }

    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(canvas)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(BASE64.encode(&png))
}
