// src/qr.rs
use base64::{engine::general_purpose, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ImageBuffer, ImageEncoder, Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};

use crate::error::VietQrResult;

/// Pixels per QR module
pub const MODULE_SIZE: usize = 10;
/// Quiet zone in modules when the QR is shown without a template
pub const QUIET_ZONE: usize = 4;

const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone, Default)]
pub struct QrService;

impl QrService {
    pub fn new() -> Self {
        Self
    }

    /// Render `data` at error correction level H.
    ///
    /// `with_border` adds the standard 4-module quiet zone; templates supply
    /// their own margin, so they get a borderless code.
    pub fn render(&self, data: &str, with_border: bool) -> VietQrResult<RgbaImage> {
        let code = QrCode::with_error_correction_level(data, EcLevel::H)?;

        let border = if with_border { QUIET_ZONE } else { 0 };
        let width = code.width();
        let img_size = ((width + 2 * border) * MODULE_SIZE) as u32;

        let mut img: RgbaImage = ImageBuffer::from_pixel(img_size, img_size, LIGHT);

        for y in 0..width {
            for x in 0..width {
                if code[(x, y)] != qrcode::Color::Dark {
                    continue;
                }
                let px0 = ((border + x) * MODULE_SIZE) as u32;
                let py0 = ((border + y) * MODULE_SIZE) as u32;
                for dy in 0..MODULE_SIZE as u32 {
                    for dx in 0..MODULE_SIZE as u32 {
                        img.put_pixel(px0 + dx, py0 + dy, DARK);
                    }
                }
            }
        }

        log::debug!(
            "Rendered QR: {} modules, border {}, {}x{} px",
            width,
            border,
            img_size,
            img_size
        );

        Ok(img)
    }

    pub fn encode_png(&self, img: &RgbaImage) -> VietQrResult<Vec<u8>> {
        let mut png_bytes = Vec::new();
        let encoder = PngEncoder::new(&mut png_bytes);
        encoder.write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ColorType::Rgba8,
        )?;
        Ok(png_bytes)
    }

    /// PNG bytes as a `data:image/png;base64,...` URL
    pub fn to_data_url(&self, png_bytes: &[u8]) -> String {
        let base64_string = general_purpose::STANDARD.encode(png_bytes);
        format!("data:image/png;base64,{}", base64_string)
    }
}
