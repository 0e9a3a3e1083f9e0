//! Color math shared by the frame transforms.
//!
//! Both transforms use the full-range BT.601 matrix below. Camera frames on
//! the capture path are full-range, so luma is not offset by 16.

/// `R = Y + V_TO_R * V`
pub const V_TO_R: f32 = 1.402;
/// `G = Y - U_TO_G * U - V_TO_G * V`
pub const U_TO_G: f32 = 0.344_136;
pub const V_TO_G: f32 = 0.714_136;
/// `B = Y + U_TO_B * U`
pub const U_TO_B: f32 = 1.772;

/// Normalized value = `(channel - NORMALIZE_MEAN) / NORMALIZE_SCALE`.
pub const NORMALIZE_MEAN: f32 = 127.5;
pub const NORMALIZE_SCALE: f32 = 128.0;

/// Full-range BT.601 YUV to unclamped RGB. `u` and `v` are already centred on 0.
#[inline]
pub fn yuv_to_rgb(y: f32, u: f32, v: f32) -> [f32; 3] {
    [
        y + V_TO_R * v,
        y - U_TO_G * u - V_TO_G * v,
        y + U_TO_B * u,
    ]
}

#[inline]
pub fn clamp_channel(value: f32) -> f32 {
    value.clamp(0.0, 255.0)
}

#[inline]
pub fn clamp_channel_int(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Clamp to `[0, 255]` and map into `[-1, 1]`.
#[inline]
pub fn normalize_channel(value: f32) -> f32 {
    (clamp_channel(value) - NORMALIZE_MEAN) / NORMALIZE_SCALE
}

#[inline]
pub fn pack_argb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Normalize raw `0..=255` RGB floats in place, e.g. a tensor filled from a
/// decoded bitmap rather than by the sampler.
pub fn normalize_pixels(values: &mut [f32]) {
    for value in values.iter_mut() {
        *value = normalize_channel(*value);
    }
}
