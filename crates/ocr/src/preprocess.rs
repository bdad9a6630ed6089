use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Knobs for the pre-OCR image clean-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Fraction trimmed from every side (the capture guide frame).
    pub crop_margin: f32,
    /// Longest side allowed before down-scaling.
    pub max_dimension: u32,
    /// Gaussian blur sigma; 0 disables blurring.
    pub blur_sigma: f32,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self { crop_margin: 0.1, max_dimension: 2800, blur_sigma: 1.1 }
    }
}

/// Load an image file and return binarized PNG bytes ready for OCR.
pub fn prepare_for_ocr(path: &Path, opts: &PreprocessOptions) -> Result<Vec<u8>, PreprocessError> {
    let img = image::open(path)?;
    encode_as_png(binarize(crop_margins(downscale(img, opts), opts), opts))
}

/// Process raw image bytes (JPEG / PNG / WEBP / …) and return binarized PNG bytes.
pub fn prepare_for_ocr_from_bytes(data: &[u8], opts: &PreprocessOptions) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(binarize(crop_margins(downscale(img, opts), opts), opts))
}

fn downscale(img: DynamicImage, opts: &PreprocessOptions) -> DynamicImage {
    // Tesseract works best at 300 DPI / ~2000 px.
    if img.width() > opts.max_dimension || img.height() > opts.max_dimension {
        img.resize(opts.max_dimension, opts.max_dimension, image::imageops::FilterType::Lanczos3)
    } else {
        img
    }
}

/// Margin is clamped below half a side, so at least one pixel always survives.
fn crop_margins(img: DynamicImage, opts: &PreprocessOptions) -> DynamicImage {
    let margin = opts.crop_margin.clamp(0.0, 0.45);
    let mx = (img.width() as f32 * margin) as u32;
    let my = (img.height() as f32 * margin) as u32;
    img.crop_imm(mx, my, img.width() - 2 * mx, img.height() - 2 * my)
}

/// Grayscale + blur + Otsu threshold.
fn binarize(img: DynamicImage, opts: &PreprocessOptions) -> DynamicImage {
    let gray: GrayImage = img.to_luma8();
    let gray = if opts.blur_sigma > 0.0 {
        gaussian_blur_f32(&gray, opts.blur_sigma)
    } else {
        gray
    };
    let level = otsu_level(&gray);
    DynamicImage::ImageLuma8(threshold(&gray, level, ThresholdType::Binary))
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    fn two_tone(width: u32, height: u32) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |x, _| {
            Luma([if x < width / 2 { 40 } else { 210 }])
        });
        DynamicImage::ImageLuma8(img)
    }

    fn png(img: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn crop_trims_ten_percent_per_side() {
        let cropped = crop_margins(solid_gray(100, 50, 128), &PreprocessOptions::default());
        assert_eq!((cropped.width(), cropped.height()), (80, 40));
    }

    #[test]
    fn crop_margin_is_clamped() {
        let opts = PreprocessOptions { crop_margin: 0.9, ..Default::default() };
        // Clamped to 0.45, so a 10 px side keeps 2 px.
        assert_eq!(crop_margins(solid_gray(10, 10, 0), &opts).width(), 2);
        assert_eq!(crop_margins(solid_gray(1, 1, 0), &opts).width(), 1);
    }

    #[test]
    fn binarize_outputs_only_black_and_white() {
        let opts = PreprocessOptions { blur_sigma: 0.0, ..Default::default() };
        let out = binarize(two_tone(64, 8), &opts).to_luma8();
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(63, 0)[0], 255);
    }

    #[test]
    fn binarize_uniform_image_does_not_panic() {
        let out = binarize(solid_gray(10, 10, 128), &PreprocessOptions::default());
        assert_eq!((out.width(), out.height()), (10, 10));
    }

    #[test]
    fn prepare_from_bytes_produces_png_header() {
        let result = prepare_for_ocr_from_bytes(&png(&two_tone(40, 20)), &PreprocessOptions::default()).unwrap();
        // PNG magic bytes: 0x89 0x50 0x4E 0x47
        assert_eq!(&result[..4], b"\x89PNG");
    }

    #[test]
    fn prepare_from_garbage_bytes_fails() {
        let result = prepare_for_ocr_from_bytes(b"definitely not an image", &PreprocessOptions::default());
        assert!(matches!(result, Err(PreprocessError::Load(_))));
    }

    #[test]
    fn prepare_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.png");
        std::fs::write(&path, png(&two_tone(40, 20))).unwrap();
        let result = prepare_for_ocr(&path, &PreprocessOptions::default()).unwrap();
        assert_eq!(&result[..4], b"\x89PNG");
    }

    #[test]
    fn large_image_is_resized() {
        let big = solid_gray(3000, 3000, 200);
        let result = downscale(big, &PreprocessOptions::default());
        assert!(result.width() <= 2800 && result.height() <= 2800);
    }
}
