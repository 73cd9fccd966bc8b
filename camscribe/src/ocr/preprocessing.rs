use crate::config::{DenoiseMethod, PreprocessConfig, ThresholdMethod};
use crate::error::Result;
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat, Luma, RgbImage};
use imageproc::integral_image::{integral_image, sum_image_pixels};

/// Turn a color crop into a black-and-white image ready for Tesseract.
///
/// The step order never changes, only the parameters do:
/// 1. Convert to grayscale
/// 2. Denoise (contrast stretch + median blur, or bilateral filter)
/// 3. Upscale with cubic interpolation
/// 4. Binarize (Otsu or adaptive mean)
///
/// # Arguments
/// * `crop` - Region of the camera frame inside the scan guide
/// * `config` - Denoise/threshold selection and their parameters
///
/// # Returns
/// A single-channel image whose pixels are all either 0 or 255
pub fn preprocess_crop(crop: &RgbImage, config: &PreprocessConfig) -> GrayImage {
    // 1. Grayscale
    let gray = imageops::grayscale(crop);

    // 2. Denoise
    let gray = match config.denoise {
        DenoiseMethod::ContrastStretch => {
            let stretched = scale_contrast(&gray, config.contrast_gain, config.contrast_bias);
            let radius = config.median_kernel / 2;
            imageproc::filter::median_filter(&stretched, radius, radius)
        }
        DenoiseMethod::Bilateral => imageproc::filter::bilateral_filter(
            &gray,
            config.bilateral_diameter,
            config.bilateral_sigma_color,
            config.bilateral_sigma_space,
        ),
    };

    // 3. Upscale; small glyphs are where Tesseract loses the most accuracy
    let gray = upscale(gray, config.upscale_factor);

    // 4. Binarize
    match config.threshold {
        ThresholdMethod::Otsu => otsu_threshold(&gray),
        ThresholdMethod::AdaptiveMean => {
            adaptive_mean_threshold(&gray, config.adaptive_block_size, config.adaptive_offset)
        }
    }
}

/// Encode a preprocessed image as PNG for engines that take encoded bytes.
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}

/// Linear `|gain * p + bias|`, saturated to the u8 range.
fn scale_contrast(gray: &GrayImage, gain: f32, bias: f32) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = (gain * gray.get_pixel(x, y)[0] as f32 + bias).abs().round();
        Luma([value.min(255.0) as u8])
    })
}

/// Resize by an integer factor using Catmull-Rom (cubic) interpolation.
fn upscale(gray: GrayImage, factor: u32) -> GrayImage {
    let factor = factor.max(1);
    if factor == 1 {
        return gray;
    }
    imageops::resize(
        &gray,
        gray.width() * factor,
        gray.height() * factor,
        FilterType::CatmullRom,
    )
}

/// Global threshold at the level chosen by Otsu's method.
///
/// Pixels strictly above the level become white.
fn otsu_threshold(gray: &GrayImage) -> GrayImage {
    let level = imageproc::contrast::otsu_level(gray);
    binarize(gray, |_, _, value| value > level)
}

/// Local threshold against the mean of a `block_size` square window, less
/// `offset`. Windows are clipped at the image border.
fn adaptive_mean_threshold(gray: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let radius = block_size / 2;
    let integral = integral_image::<_, u64>(gray);

    binarize(gray, |x, y, value| {
        let left = x.saturating_sub(radius);
        let top = y.saturating_sub(radius);
        let right = (x + radius).min(width - 1);
        let bottom = (y + radius).min(height - 1);

        let sum = sum_image_pixels(&integral, left, top, right, bottom)[0];
        let count = ((right - left + 1) * (bottom - top + 1)) as f64;
        let mean = sum as f64 / count;

        value as f64 > mean - offset as f64
    })
}

fn binarize<F>(gray: &GrayImage, is_white: F) -> GrayImage
where
    F: Fn(u32, u32, u8) -> bool,
{
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if is_white(x, y, gray.get_pixel(x, y)[0]) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
