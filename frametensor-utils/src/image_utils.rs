//! Turn raw pixel buffers produced by the frame transforms into `image` types.
//!
//! The transforms themselves write into caller-owned `u32`/`f32` slices; these
//! helpers exist for previews and debugging only.

use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

/// Unpack `0xAARRGGBB` pixels in raster order into an RGBA image.
pub fn argb_to_rgba_image(width: u32, height: u32, pixels: &[u32]) -> Result<RgbaImage> {
    let expected = width as usize * height as usize;
    anyhow::ensure!(
        pixels.len() == expected,
        "ARGB buffer holds {} pixels, expected {expected} for {width}x{height}",
        pixels.len()
    );
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let argb = pixels[y as usize * width as usize + x as usize];
        let [a, r, g, b] = argb.to_be_bytes();
        Rgba([r, g, b, a])
    }))
}

/// Map a normalized `[-1, 1]` tensor value back to an 8-bit channel.
///
/// Inverse of `(c - 127.5) / 128.0`, rounded and clamped.
pub fn denormalize_channel(value: f32) -> u8 {
    (value * 128.0 + 127.5).round().clamp(0.0, 255.0) as u8
}

/// Build an RGB image from an interleaved `size x size x 3` tensor.
pub fn tensor_to_rgb_image(size: u32, tensor: &[f32]) -> Result<RgbImage> {
    let expected = size as usize * size as usize * 3;
    anyhow::ensure!(
        tensor.len() == expected,
        "tensor holds {} values, expected {expected} for {size}x{size}x3",
        tensor.len()
    );
    Ok(RgbImage::from_fn(size, size, |x, y| {
        let base = (y as usize * size as usize + x as usize) * 3;
        Rgb([
            denormalize_channel(tensor[base]),
            denormalize_channel(tensor[base + 1]),
            denormalize_channel(tensor[base + 2]),
        ])
    }))
}

/// Save an image as PNG, creating parent directories as needed.
pub fn save_png<P: AsRef<Path>>(path: P, image: impl Into<DynamicImage>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image
        .into()
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("failed to save PNG {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_unpacks_channels_in_order() {
        let pixels = [0xFF10_2030, 0x8040_5060];
        let image = argb_to_rgba_image(2, 1, &pixels).expect("image");
        assert_eq!(image.get_pixel(0, 0), &Rgba([0x10, 0x20, 0x30, 0xFF]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([0x40, 0x50, 0x60, 0x80]));
    }

    #[test]
    fn argb_rejects_wrong_length() {
        assert!(argb_to_rgba_image(2, 2, &[0; 3]).is_err());
    }

    #[test]
    fn denormalize_inverts_tensor_mapping() {
        for channel in [0u8, 1, 64, 127, 128, 200, 255] {
            let normalized = (channel as f32 - 127.5) / 128.0;
            assert_eq!(denormalize_channel(normalized), channel);
        }
        assert_eq!(denormalize_channel(-4.0), 0);
        assert_eq!(denormalize_channel(4.0), 255);
    }

    #[test]
    fn tensor_image_has_requested_size() {
        let tensor = vec![0.0f32; 4 * 4 * 3];
        let image = tensor_to_rgb_image(4, &tensor).expect("image");
        assert_eq!(image.dimensions(), (4, 4));
        assert!(tensor_to_rgb_image(5, &tensor).is_err());
    }
}
