use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

use crate::error::GatewayError;

pub trait QrRenderer: Send + Sync {
    /// Encodes `data` as a PNG QR image.
    fn render_png(&self, data: &str) -> Result<Vec<u8>, GatewayError>;

    fn render_data_uri(&self, data: &str) -> Result<String, GatewayError> {
        let png = self.render_png(data)?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

/// Black-on-white QR, low error correction, 10px modules with a quiet zone.
pub struct PngQrRenderer {
    module_px: u32,
}

impl Default for PngQrRenderer {
    fn default() -> Self {
        Self { module_px: 10 }
    }
}

impl QrRenderer for PngQrRenderer {
    fn render_png(&self, data: &str) -> Result<Vec<u8>, GatewayError> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
            .map_err(|e| GatewayError::Render(e.to_string()))?;

        let image = code
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .module_dimensions(self.module_px, self.module_px)
            .build();

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image)
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| GatewayError::Render(e.to_string()))?;

        Ok(buffer.into_inner())
    }
}
