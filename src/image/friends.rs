//! Friends page image transform.
//!
//! Avatars and banners on the friends page are normalized to fixed sizes
//! (rendered at 3x for high-density screens) and re-encoded as JPEG.
//!
//! - `avatar.<ext>` (not SVG): cover-fit to 210×210, flattened onto white
//! - `banner[.<offset>].<ext>`: cover the 870×255 canvas, crop with the
//!   optional pixel offset along the overflowing axis, flattened onto white,
//!   renamed to `banner.jpg`
//! - anything else passes through untouched

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError, RgbImage};
use thiserror::Error;

/// Oversampling factor applied to every logical size.
pub const SCALE_FACTOR: u32 = 3;
pub const AVATAR_SIZE: u32 = 70 * SCALE_FACTOR;
pub const BANNER_WIDTH: u32 = 290 * SCALE_FACTOR;
pub const BANNER_HEIGHT: u32 = 85 * SCALE_FACTOR;
const JPEG_QUALITY: u8 = 60;

/// File name every banner is finalized to.
pub const BANNER_NAME: &str = "banner.jpg";

/// Image transform failures. These abort the build.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to decode image `{name}`")]
    Decode {
        name: String,
        #[source]
        source: ImageError,
    },

    #[error("failed to encode image `{name}`")]
    Encode {
        name: String,
        #[source]
        source: ImageError,
    },

    #[error("image `{0}` has no pixels")]
    Empty(String),

    #[error("invalid banner offset `{offset}` in `{name}`")]
    BannerOffset { name: String, offset: String },

    #[error("banner crop window ({left}, {top}) is outside the {width}x{height} resized image")]
    CropBounds {
        left: i64,
        top: i64,
        width: u32,
        height: u32,
    },
}

/// Transform a friends page image, returning the (possibly renamed) file
/// name and the new content.
pub fn process_friends_image(
    file_name: &str,
    content: Vec<u8>,
) -> Result<(String, Vec<u8>), TransformError> {
    if file_name.starts_with("avatar.") {
        if file_name.ends_with(".svg") {
            return Ok((file_name.to_string(), content));
        }
        let image = decode(file_name, &content)?;
        let avatar = flatten_white(&image.resize_to_fill(AVATAR_SIZE, AVATAR_SIZE, FilterType::Lanczos3));
        return Ok((file_name.to_string(), encode_jpeg(file_name, &avatar)?));
    }

    if file_name.starts_with("banner.") {
        let offset = banner_offset(file_name)?;
        let image = decode(file_name, &content)?;
        let banner = crop_banner(&image, offset)?;
        return Ok((BANNER_NAME.to_string(), encode_jpeg(file_name, &flatten_white(&banner))?));
    }

    Ok((file_name.to_string(), content))
}

/// Parse the logical pixel offset from `banner.<offset>.<ext>`.
///
/// `banner.png` has no offset segment and is equivalent to `banner.0.png`.
/// Offsets that overflow once scaled to device pixels are rejected.
fn banner_offset(file_name: &str) -> Result<i64, TransformError> {
    let segments: Vec<&str> = file_name.split('.').collect();
    if segments.len() < 3 {
        return Ok(0);
    }
    segments[1]
        .parse::<i64>()
        .ok()
        .filter(|offset| offset.checked_mul(i64::from(SCALE_FACTOR)).is_some())
        .ok_or_else(|| TransformError::BannerOffset {
            name: file_name.to_string(),
            offset: segments[1].to_string(),
        })
}

/// Scale `image` to cover the banner canvas and crop the canvas out of it.
///
/// `offset` is in logical pixels and shifts the crop window away from the
/// centre along the axis that overflows.
fn crop_banner(image: &DynamicImage, offset: i64) -> Result<DynamicImage, TransformError> {
    let (width, height) = image.dimensions();
    let (src_w, src_h) = (f64::from(width), f64::from(height));
    let (dst_w, dst_h) = (f64::from(BANNER_WIDTH), f64::from(BANNER_HEIGHT));
    let offset = (offset * i64::from(SCALE_FACTOR)) as f64;

    // Wider than the canvas: match height, crop width. Otherwise the reverse.
    let wider = src_w / src_h > dst_w / dst_h;
    let (exact_w, exact_h) = if wider {
        (src_w * dst_h / src_h, dst_h)
    } else {
        (dst_w, src_h * dst_w / src_w)
    };
    let resized_w = (exact_w.round() as u32).max(BANNER_WIDTH);
    let resized_h = (exact_h.round() as u32).max(BANNER_HEIGHT);
    let resized = image.resize_exact(resized_w, resized_h, FilterType::Lanczos3);

    let (left, top) = if wider {
        ((offset + (exact_w - dst_w) / 2.0).round() as i64, 0)
    } else {
        (0, (offset + (exact_h - dst_h) / 2.0).round() as i64)
    };

    let fits = left >= 0
        && top >= 0
        && left + i64::from(BANNER_WIDTH) <= i64::from(resized_w)
        && top + i64::from(BANNER_HEIGHT) <= i64::from(resized_h);
    if !fits {
        return Err(TransformError::CropBounds {
            left,
            top,
            width: resized_w,
            height: resized_h,
        });
    }

    Ok(resized.crop_imm(left as u32, top as u32, BANNER_WIDTH, BANNER_HEIGHT))
}

fn decode(name: &str, content: &[u8]) -> Result<DynamicImage, TransformError> {
    let image = image::load_from_memory(content).map_err(|source| TransformError::Decode {
        name: name.to_string(),
        source,
    })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(TransformError::Empty(name.to_string()));
    }
    Ok(image)
}

/// Composite the image over an opaque white background.
fn flatten_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_jpeg(name: &str, image: &RgbImage) -> Result<Vec<u8>, TransformError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(image)
        .map_err(|source| TransformError::Encode {
            name: name.to_string(),
            source,
        })?;
    Ok(out)
}
