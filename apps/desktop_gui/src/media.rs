//! Decoding generated images for preview, and clipboard export.

use std::io::Cursor;

use arboard::{Clipboard, ImageData};
use image::AnimationDecoder;

const MAX_PREVIEW_EDGE: u32 = 1024;

#[derive(Clone, Debug)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct AnimatedFrame {
    pub image: PreviewImage,
    pub delay_ms: u32,
}

#[derive(Clone, Debug)]
pub enum DecodedPreview {
    Static(PreviewImage),
    Animated(Vec<AnimatedFrame>),
}

impl DecodedPreview {
    pub fn frame_count(&self) -> usize {
        match self {
            Self::Static(_) => 1,
            Self::Animated(frames) => frames.len(),
        }
    }
}

fn is_gif(bytes: &[u8]) -> bool {
    bytes.len() >= 6 && (&bytes[..6] == b"GIF87a" || &bytes[..6] == b"GIF89a")
}

fn fit_preview(image: image::DynamicImage) -> PreviewImage {
    let image = if image.width() > MAX_PREVIEW_EDGE || image.height() > MAX_PREVIEW_EDGE {
        image.thumbnail(MAX_PREVIEW_EDGE, MAX_PREVIEW_EDGE)
    } else {
        image
    };
    let rgba = image.to_rgba8();
    PreviewImage {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
    }
}

/// Decodes whatever the service returned. GIF data is sniffed from its magic
/// bytes so a single-frame GIF and a PNG both end up displayable.
pub fn decode_preview(bytes: &[u8]) -> Result<DecodedPreview, String> {
    if is_gif(bytes) {
        return decode_gif_animation(bytes);
    }
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    Ok(DecodedPreview::Static(fit_preview(dynamic)))
}

fn decode_gif_animation(bytes: &[u8]) -> Result<DecodedPreview, String> {
    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| format!("gif decode init failed: {e}"))?;

    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| format!("gif frame decode failed: {e}"))?;

    if frames.is_empty() {
        return Err("gif has no frames".to_string());
    }

    let mut out_frames = Vec::with_capacity(frames.len());
    for frame in frames {
        let (num, den) = frame.delay().numer_denom_ms();
        let delay_ms = if den == 0 {
            100
        } else {
            // clamp to avoid absurdly-fast frame spam
            ((num as f32 / den as f32).round() as u32).clamp(20, 10_000)
        };
        out_frames.push(AnimatedFrame {
            image: fit_preview(image::DynamicImage::ImageRgba8(frame.into_buffer())),
            delay_ms,
        });
    }

    if out_frames.len() == 1 {
        if let Some(only) = out_frames.pop() {
            return Ok(DecodedPreview::Static(only.image));
        }
    }
    Ok(DecodedPreview::Animated(out_frames))
}

pub fn copy_image_to_clipboard(bytes: &[u8]) -> Result<(), String> {
    let decoded = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let rgba = decoded.to_rgba8();
    let mut clipboard = Clipboard::new().map_err(|err| err.to_string())?;
    clipboard
        .set_image(ImageData {
            width: rgba.width() as usize,
            height: rgba.height() as usize,
            bytes: std::borrow::Cow::Owned(rgba.into_raw()),
        })
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use image::{codecs::gif::GifEncoder, Delay, Frame, ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([0, 157, 224, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut out, ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    fn gif_bytes(frame_count: usize, delay_ms: u32) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut out);
            for index in 0..frame_count {
                let shade = (index * 80) as u8;
                let buffer = RgbaImage::from_pixel(4, 4, Rgba([shade, 0, 0, 255]));
                let frame =
                    Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1));
                encoder.encode_frame(frame).expect("encode frame");
            }
        }
        out
    }

    #[test]
    fn decodes_png_without_upscaling() {
        let preview = decode_preview(&png_bytes(2, 3)).expect("decode");
        let DecodedPreview::Static(image) = preview else {
            panic!("expected static preview");
        };
        assert_eq!((image.width, image.height), (2, 3));
        assert_eq!(image.rgba.len(), 2 * 3 * 4);
    }

    #[test]
    fn large_images_are_shrunk_for_preview() {
        let preview = decode_preview(&png_bytes(2048, 512)).expect("decode");
        let DecodedPreview::Static(image) = preview else {
            panic!("expected static preview");
        };
        assert_eq!(image.width, 1024);
        assert!(image.height <= 256);
    }

    #[test]
    fn decodes_gif_frames_with_delays() {
        let preview = decode_preview(&gif_bytes(3, 100)).expect("decode");
        assert_eq!(preview.frame_count(), 3);
        let DecodedPreview::Animated(frames) = preview else {
            panic!("expected animation");
        };
        assert!(frames.iter().all(|frame| frame.delay_ms == 100));
        assert_eq!((frames[0].image.width, frames[0].image.height), (4, 4));
    }

    #[test]
    fn opaque_garbage_is_reported_not_panicked() {
        let err = decode_preview(b"definitely not an image").expect_err("must fail");
        assert!(!err.is_empty());
    }
}
