//! Decode, crop and resize helpers for frame images.

use image::{DynamicImage, Rgba, RgbaImage, imageops};

use crate::error::DecodeError;

/// Grey used when there is no photo at all.
const PLACEHOLDER_RGBA: Rgba<u8> = Rgba([128, 128, 128, 255]);

/// Decodes image bytes, sniffing the format from the data.
///
/// # Errors
/// Returns `DecodeError` if the format is unknown or the data is corrupt.
pub fn decode_photo(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    Ok(reader.decode()?)
}

/// Crops the largest centered square out of `img`.
pub fn crop_max_square(img: &DynamicImage) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let side = width.min(height);
    img.crop_imm((width - side) / 2, (height - side) / 2, side, side)
}

/// Center-crops `photo` to a square and scales it to `side x side`.
pub fn square_thumbnail(photo: &DynamicImage, side: u32) -> RgbaImage {
    let square = crop_max_square(photo);
    if square.width() == 0 {
        return RgbaImage::from_pixel(side, side, PLACEHOLDER_RGBA);
    }
    resize_rgba(&square.to_rgba8(), side, side)
}

/// Scales `src` to exactly `width x height` with a Lanczos3 filter.
pub fn resize_rgba(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    match resize_lanczos(src, width, height) {
        Ok(resized) => resized,
        Err(err) => {
            tracing::warn!(%err, "fast resize failed, using the slow path");
            imageops::resize(src, width, height, imageops::FilterType::Lanczos3)
        }
    }
}

fn resize_lanczos(src: &RgbaImage, dst_w: u32, dst_h: u32) -> Result<RgbaImage, String> {
    use fast_image_resize as fir;

    let src_image = fir::images::Image::from_vec_u8(
        src.width(),
        src.height(),
        src.as_raw().clone(),
        fir::PixelType::U8x4,
    )
    .map_err(|e| format!("resize: {e}"))?;

    let mut dst_image = fir::images::Image::new(dst_w, dst_h, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3));
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| format!("resize: {e}"))?;

    RgbaImage::from_raw(dst_w, dst_h, dst_image.into_vec())
        .ok_or_else(|| "resize: invalid output buffer".to_string())
}

/// A flat grey photo, used when no fallback image is configured.
pub fn placeholder_photo(side: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(side, side, PLACEHOLDER_RGBA))
}
