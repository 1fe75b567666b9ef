use crate::error::{FrostError, FrostResult};

/// Separable Gaussian blur over an RGBA8 buffer.
///
/// Sigma may be fractional; the kernel extends `ceil(2*sigma)` pixels to each
/// side (at least one). Edges clamp to the nearest pixel, so a constant image
/// blurs to itself. Sigma 0 is the identity.
pub fn blur_rgba8(src: &[u8], width: u32, height: u32, sigma: f32) -> FrostResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FrostError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(FrostError::render(
            "blur_rgba8 expects src matching width*height*4",
        ));
    }
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(FrostError::validation("blur sigma must be finite and >= 0"));
    }
    if sigma == 0.0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel(sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    pass(src, &mut tmp, width, height, &kernel, Axis::Horizontal);
    pass(&tmp, &mut out, width, height, &kernel, Axis::Vertical);
    Ok(out)
}

fn gaussian_kernel(sigma: f32) -> FrostResult<Vec<f32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FrostError::validation("blur sigma must be > 0"));
    }

    let r = ((2.0 * sigma).ceil() as i32).max(1);
    let denom = 2.0 * sigma * sigma;
    let mut weights = Vec::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f32;
    for i in -r..=r {
        let x = i as f32;
        let w = (-x * x / denom).exp();
        weights.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(FrostError::render("gaussian kernel sum is zero"));
    }
    for w in &mut weights {
        *w /= sum;
    }
    Ok(weights)
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, kernel: &[f32], axis: Axis) {
    let radius = (kernel.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let d = ki as i32 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + d).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + d).clamp(0, h - 1)),
                };
                let idx = ((sy * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += kw * f32::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigma_0_is_identity() {
        let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let out = blur_rgba8(&src, 1, 2, 0.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn constant_image_is_unchanged() {
        let (w, h) = (4u32, 3u32);
        let px = [10u8, 20, 30, 255];
        let src = px.repeat((w * h) as usize);
        let out = blur_rgba8(&src, w, h, 1.5).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn spreads_energy_from_a_single_pixel() {
        let (w, h) = (5u32, 5u32);
        let mut src = vec![0u8; (w * h * 4) as usize];
        let center = ((2 * w + 2) * 4) as usize;
        src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

        let out = blur_rgba8(&src, w, h, 1.0).unwrap();
        let nonzero = out.chunks_exact(4).filter(|px| px[0] != 0).count();
        assert!(nonzero > 1);
        assert!(out[center] < 255);
    }

    #[test]
    fn fractional_sigma_still_blurs() {
        let (w, h) = (5u32, 1u32);
        let mut src = vec![0u8; (w * h * 4) as usize];
        src[2 * 4..2 * 4 + 4].copy_from_slice(&[255, 255, 255, 255]);

        let out = blur_rgba8(&src, w, h, 0.4).unwrap();
        assert_ne!(out, src);
        assert!(out[2 * 4] < 255);
        assert!(out[1 * 4] > 0);
    }

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(blur_rgba8(&[0u8; 7], 2, 2, 1.0).is_err());
    }

    #[test]
    fn rejects_bad_sigma() {
        let src = vec![0u8; 16];
        assert!(blur_rgba8(&src, 2, 2, -1.0).is_err());
        assert!(blur_rgba8(&src, 2, 2, f32::NAN).is_err());
    }
}
