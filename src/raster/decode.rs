use std::io::Cursor;

use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::RasterImage;
use crate::foundation::error::{TexError, TexResult};

impl RasterImage {
    /// Decodes any format `image` understands, premultiplying on load.
    pub fn decode(bytes: &[u8]) -> TexResult<Self> {
        let dyn_img = image::load_from_memory(bytes)
            .context("decode image from memory")
            .map_err(|e| TexError::rasterization(format!("{e:#}")))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgba8_premul = rgba.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Self::new(width, height, rgba8_premul)
    }

    /// Lossless PNG with straight alpha.
    pub fn encode_png(&self) -> TexResult<Vec<u8>> {
        let mut straight = self.rgba8_premul.as_ref().clone();
        unpremultiply_rgba8_in_place(&mut straight);
        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| TexError::rasterization("pixel buffer does not match dimensions"))?;

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| TexError::rasterization(format!("encode png: {e}")))?;
        Ok(buf)
    }

    pub fn to_data_url(&self) -> TexResult<String> {
        Ok(format!(
            "data:image/png;base64,{}",
            STANDARD.encode(self.encode_png()?)
        ))
    }

    /// Accepts a `data:<mime>;base64,<payload>` URL or a bare base64 payload.
    pub fn from_data_url(s: &str) -> TexResult<Self> {
        Self::decode(&payload_bytes(s)?)
    }
}

fn payload_bytes(s: &str) -> TexResult<Vec<u8>> {
    let s = s.trim();
    let b64 = match s.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| TexError::rasterization("data url has no payload"))?;
            if !meta.ends_with(";base64") {
                return Err(TexError::rasterization(
                    "only base64-encoded data urls are supported",
                ));
            }
            data
        }
        None => s,
    };
    let compact: String = b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| TexError::rasterization(format!("invalid base64 payload: {e}")))
}

pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
