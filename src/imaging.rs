use image::{imageops, GrayImage, Pixel, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;
use imageproc::map::{blue_channel, green_channel, map_colors, red_channel};

use crate::data::model::ImageParams;

// ---------------------------------------------------------------------------
// Full per-image transform
// ---------------------------------------------------------------------------

/// Low and high hysteresis thresholds of the edge overlay.
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;

/// Blend weights of the edge overlay: adjusted image, edge map.
pub const IMAGE_WEIGHT: f64 = 0.7;
pub const EDGE_WEIGHT: f64 = 0.3;

/// Blur → contrast/brightness → optional edge overlay.
///
/// `params` is expected to have been validated; an even or zero blur size
/// is treated as the next odd size up.
pub fn transform(img: &RgbImage, params: &ImageParams) -> RgbImage {
    let blurred = gaussian_blur(img, params.blur_size);
    let adjusted = adjust_contrast(&blurred, params.contrast_alpha, params.contrast_beta);

    if !params.edge_detection {
        return adjusted;
    }

    let edges = colour_edges(&adjusted, CANNY_LOW, CANNY_HIGH);
    blend_edges(&adjusted, &edges)
}

// ---------------------------------------------------------------------------
// Gaussian blur
// ---------------------------------------------------------------------------

/// Normalised 1-D Gaussian kernel of `size` taps. Sigma follows the usual
/// derivation from kernel size, `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;

    let mut taps: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// Separable Gaussian blur with a `size`×`size` kernel.
///
/// Borders mirror about the outermost pixel without repeating it
/// (`cb|abc|ba`).
pub fn gaussian_blur(img: &RgbImage, size: u32) -> RgbImage {
    let kernel = gaussian_kernel(size);
    let radius = (kernel.len() / 2) as u32;
    let (w, h) = img.dimensions();
    if radius == 0 || w == 0 || h == 0 {
        return img.clone();
    }

    let padded = reflect_pad(img, radius);
    let filtered = separable_filter_equal(&padded, kernel.as_slice());
    imageops::crop_imm(&filtered, radius, radius, w, h).to_image()
}

fn reflect_pad(img: &RgbImage, pad: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let shift = i64::from(pad);
    RgbImage::from_fn(w + 2 * pad, h + 2 * pad, |x, y| {
        *img.get_pixel(
            reflect_101(i64::from(x) - shift, w),
            reflect_101(i64::from(y) - shift, h),
        )
    })
}

/// Fold `i` into `0..len` by mirroring about the first and last index
/// without repeating them.
fn reflect_101(i: i64, len: u32) -> u32 {
    let last = i64::from(len) - 1;
    if last <= 0 {
        return 0;
    }
    let folded = i.rem_euclid(2 * last);
    (if folded > last { 2 * last - folded } else { folded }) as u32
}

fn saturate(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

// ---------------------------------------------------------------------------
// Contrast / brightness
// ---------------------------------------------------------------------------

/// `out = alpha * in + beta`, rounded and clamped to `0..=255`.
pub fn adjust_contrast(img: &RgbImage, alpha: f64, beta: i32) -> RgbImage {
    let beta = f64::from(beta);
    map_colors(img, |px| px.map(|c| saturate(alpha * f64::from(c) + beta)))
}

// ---------------------------------------------------------------------------
// Edge map
// ---------------------------------------------------------------------------

/// Binary edge map (0 or 255) of a colour image. Canny runs on each channel
/// and the maps are merged, so a step in any single channel is an edge.
pub fn colour_edges(img: &RgbImage, low: f32, high: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut edges = GrayImage::new(w, h);
    for channel in [red_channel(img), green_channel(img), blue_channel(img)] {
        let channel_edges = canny(&channel, low, high);
        for (merged, px) in edges.pixels_mut().zip(channel_edges.pixels()) {
            merged[0] = merged[0].max(px[0]);
        }
    }
    edges
}

// ---------------------------------------------------------------------------
// Edge overlay
// ---------------------------------------------------------------------------

/// Weighted sum of the image and the edge map replicated across channels.
pub fn blend_edges(img: &RgbImage, edges: &GrayImage) -> RgbImage {
    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let e = f64::from(edges.get_pixel(x, y)[0]);
        for c in px.0.iter_mut() {
            *c = saturate(IMAGE_WEIGHT * f64::from(*c) + EDGE_WEIGHT * e);
        }
    }
    out
}
