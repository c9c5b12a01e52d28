// src/preprocessing.rs

use crate::types::ImageFrame;

/// Enhancement pipeline applied before inference: resize to the model's
/// input resolution, then normalize contrast. Output is a same-shaped
/// RGBA raster; the input frame is never mutated.
pub fn enhance(frame: &ImageFrame, dst_width: usize, dst_height: usize) -> ImageFrame {
    let resized = resize_bilinear(
        &frame.data,
        frame.width,
        frame.height,
        dst_width,
        dst_height,
    );
    let data = normalize_contrast(&resized);
    ImageFrame::new(data, dst_width, dst_height)
}

/// Bilinear RGBA resize
fn resize_bilinear(src: &[u8], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<u8> {
    let mut dst = vec![0u8; dst_h * dst_w * 4];
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return dst;
    }

    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx as f32 * x_ratio;
            let sy = dy as f32 * y_ratio;

            let sx0 = sx.floor() as usize;
            let sy0 = sy.floor() as usize;
            let sx1 = (sx0 + 1).min(src_w - 1);
            let sy1 = (sy0 + 1).min(src_h - 1);

            let fx = sx - sx0 as f32;
            let fy = sy - sy0 as f32;

            for c in 0..4 {
                let p00 = src[(sy0 * src_w + sx0) * 4 + c] as f32;
                let p10 = src[(sy0 * src_w + sx1) * 4 + c] as f32;
                let p01 = src[(sy1 * src_w + sx0) * 4 + c] as f32;
                let p11 = src[(sy1 * src_w + sx1) * 4 + c] as f32;

                let val = p00 * (1.0 - fx) * (1.0 - fy)
                    + p10 * fx * (1.0 - fy)
                    + p01 * (1.0 - fx) * fy
                    + p11 * fx * fy;

                dst[(dy * dst_w + dx) * 4 + c] = val.round() as u8;
            }
        }
    }

    dst
}

/// Global contrast normalization over the RGB channels: shift to zero
/// mean, scale by the standard deviation, recenter at mid-gray. Alpha
/// passes through untouched.
fn normalize_contrast(src: &[u8]) -> Vec<u8> {
    let pixel_count = src.len() / 4;
    if pixel_count == 0 {
        return src.to_vec();
    }

    let mut sum = 0.0f64;
    for px in src.chunks_exact(4) {
        sum += (px[0] as f64 + px[1] as f64 + px[2] as f64) / 255.0;
    }
    let mean = sum / (pixel_count * 3) as f64;

    let mut var = 0.0f64;
    for px in src.chunks_exact(4) {
        for c in 0..3 {
            let v = px[c] as f64 / 255.0 - mean;
            var += v * v;
        }
    }
    let std = (var / (pixel_count * 3) as f64).sqrt();

    let mut dst = vec![0u8; src.len()];
    for (out, px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        for c in 0..3 {
            let v = px[c] as f64 / 255.0;
            let normalized = (v - mean) / (std + 1e-8) * 0.5 + 0.5;
            out[c] = (normalized.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        out[3] = px[3];
    }

    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_output_shape() {
        let frame = ImageFrame::new(vec![128u8; 64 * 48 * 4], 64, 48);
        let out = enhance(&frame, 32, 32);
        assert_eq!(out.width, 32);
        assert_eq!(out.height, 32);
        assert_eq!(out.data.len(), 32 * 32 * 4);
    }

    #[test]
    fn test_enhance_does_not_mutate_input() {
        let frame = ImageFrame::new(vec![200u8; 16 * 16 * 4], 16, 16);
        let original = frame.data.clone();
        let _ = enhance(&frame, 8, 8);
        assert_eq!(frame.data, original);
    }

    #[test]
    fn test_resize_shape() {
        let src = vec![255u8; 100 * 100 * 4];
        let dst = resize_bilinear(&src, 100, 100, 50, 50);
        assert_eq!(dst.len(), 50 * 50 * 4);
    }

    #[test]
    fn test_contrast_flat_image_maps_to_midgray() {
        // A flat image has zero variance; every channel lands on 0.5
        let src = vec![77u8, 77, 77, 255, 77, 77, 77, 255];
        let out = normalize_contrast(&src);
        assert_eq!(out[0], 128);
        assert_eq!(out[3], 255, "alpha untouched");
    }

    #[test]
    fn test_contrast_preserves_alpha() {
        let src = vec![10u8, 200, 30, 42, 250, 5, 90, 99];
        let out = normalize_contrast(&src);
        assert_eq!(out[3], 42);
        assert_eq!(out[7], 99);
    }
}
