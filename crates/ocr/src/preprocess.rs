use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to encode processed image: {0}")]
    Encode(String),
}

/// Decode raw image bytes (JPEG / PNG / WEBP / …), normalize for text
/// recognition, and return PNG bytes ready for the OCR backend.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(normalize(img))
}

/// Grayscale → 5×5 Gaussian blur → Otsu binarization, in that order:
/// thresholding unblurred pixels lets sensor noise survive into the binary
/// image and degrades recognition.
pub fn normalize(img: DynamicImage) -> GrayImage {
    // Down-scale very large captures first (Tesseract works best ~2000 px).
    let img = if img.width() > 2800 || img.height() > 2800 {
        img.resize(2800, 2800, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    let gray = img.to_luma8();
    let blurred = gaussian_blur_5x5(&gray);
    let threshold = otsu_threshold(&blurred);
    binarize(&blurred, threshold)
}

/// Binomial approximation of a 5×5 Gaussian kernel, applied separably with
/// clamped borders.
const KERNEL: [u32; 5] = [1, 4, 6, 4, 1];
const KERNEL_SUM: u32 = 16;

fn gaussian_blur_5x5(img: &GrayImage) -> GrayImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }

    let horizontal: GrayImage = ImageBuffer::from_fn(w, h, |x, y| {
        let mut acc = 0u32;
        for (k, weight) in KERNEL.iter().enumerate() {
            let sx = (x as i64 + k as i64 - 2).clamp(0, w as i64 - 1) as u32;
            acc += weight * img.get_pixel(sx, y)[0] as u32;
        }
        Luma([(acc / KERNEL_SUM) as u8])
    });

    ImageBuffer::from_fn(w, h, |x, y| {
        let mut acc = 0u32;
        for (k, weight) in KERNEL.iter().enumerate() {
            let sy = (y as i64 + k as i64 - 2).clamp(0, h as i64 - 1) as u32;
            acc += weight * horizontal.get_pixel(x, sy)[0] as u32;
        }
        Luma([(acc / KERNEL_SUM) as u8])
    })
}

/// Global threshold maximizing between-class variance over the histogram.
fn otsu_threshold(img: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for p in img.pixels() {
        histogram[p[0] as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let weighted_total: u64 = histogram
        .iter()
        .enumerate()
        .map(|(v, &count)| v as u64 * count)
        .sum();

    let mut best = (0u8, 0.0f64);
    let mut background_count = 0u64;
    let mut background_sum = 0u64;
    for t in 0..256usize {
        background_count += histogram[t];
        if background_count == 0 {
            continue;
        }
        let foreground_count = total - background_count;
        if foreground_count == 0 {
            break;
        }
        background_sum += t as u64 * histogram[t];

        let mean_bg = background_sum as f64 / background_count as f64;
        let mean_fg = (weighted_total - background_sum) as f64 / foreground_count as f64;
        let between =
            background_count as f64 * foreground_count as f64 * (mean_bg - mean_fg).powi(2);
        if between > best.1 {
            best = (t as u8, between);
        }
    }
    best.0
}

fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        if img.get_pixel(x, y)[0] > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

fn encode_as_png(img: GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    /// Left half dark, right half light — a crude text/background split.
    fn bimodal(width: u32, height: u32) -> GrayImage {
        ImageBuffer::from_fn(width, height, |x, _| {
            Luma([if x < width / 2 { 40 } else { 210 }])
        })
    }

    #[test]
    fn normalize_output_is_binary() {
        let result = normalize(DynamicImage::ImageLuma8(bimodal(64, 32)));
        assert!(result.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn otsu_separates_bimodal_halves() {
        let t = otsu_threshold(&bimodal(64, 32));
        assert!((40..210).contains(&t), "threshold {t}");
        let binary = binarize(&bimodal(64, 32), t);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(63, 0)[0], 255);
    }

    #[test]
    fn blur_preserves_dimensions_and_smooths() {
        let mut img: GrayImage = ImageBuffer::from_fn(9, 9, |_, _| Luma([0]));
        img.put_pixel(4, 4, Luma([255]));
        let blurred = gaussian_blur_5x5(&img);
        assert_eq!(blurred.dimensions(), (9, 9));
        // The spike spreads into its neighborhood.
        assert!(blurred.get_pixel(4, 4)[0] < 255);
        assert!(blurred.get_pixel(5, 4)[0] > 0);
    }

    #[test]
    fn normalize_uniform_image_keeps_dimensions() {
        let result = normalize(solid_gray(10, 10, 128));
        assert_eq!(result.dimensions(), (10, 10));
    }

    #[test]
    fn large_image_is_resized() {
        let img: GrayImage = ImageBuffer::from_fn(3000, 3000, |_, _| Luma([200u8]));
        let result = normalize(DynamicImage::ImageLuma8(img));
        assert!(result.width() <= 2800 && result.height() <= 2800);
    }

    #[test]
    fn prepare_from_bytes_produces_png() {
        let mut png_bytes = Vec::new();
        solid_gray(4, 4, 100)
            .write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
            .unwrap();
        let result = prepare_for_ocr_from_bytes(&png_bytes).unwrap();
        assert_eq!(&result[..4], b"\x89PNG");
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            prepare_for_ocr_from_bytes(b"definitely not an image"),
            Err(PreprocessError::Decode(_))
        ));
    }
}
