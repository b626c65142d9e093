//! Canny edge detection on a luma plane.
//!
//! Gaussian smoothing, Sobel gradients, non-maximum suppression and
//! double-threshold hysteresis. Thresholds apply to the Sobel magnitude of
//! a 0–255 image. The one-pixel image border never carries edges.

use crate::edge_map::{EdgeMap, ON};
use crate::luma::LumaPlane;

/// Gaussian kernel extends to this many standard deviations.
const TRUNCATE: f32 = 4.0;

/// Canny detector settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canny {
    pub sigma: f32,
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Canny {
    pub fn new(sigma: f32, low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            sigma,
            low_threshold,
            high_threshold,
        }
    }

    /// Binary edge map of `luma`.
    pub fn detect(&self, luma: &LumaPlane) -> EdgeMap {
        let (w, h) = (luma.width, luma.height);
        let mut edges = EdgeMap::empty(w, h);
        if w < 3 || h < 3 {
            return edges;
        }

        let smoothed = gaussian_blur(&luma.data, w, h, self.sigma);
        let (gx, gy) = sobel(&smoothed, w, h);
        let magnitude: Vec<f32> = gx.iter().zip(&gy).map(|(x, y)| x.hypot(*y)).collect();
        let thin = non_max_suppression(&magnitude, &gx, &gy, w, h);

        // Hysteresis: grow strong pixels through 8-connected weak pixels.
        let mut stack = Vec::new();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let i = y * w + x;
                if thin[i] >= self.high_threshold && edges.data[i] == 0 {
                    edges.data[i] = ON;
                    stack.push(i);
                    while let Some(p) = stack.pop() {
                        let (px, py) = (p % w, p / w);
                        for ny in py - 1..=py + 1 {
                            for nx in px - 1..=px + 1 {
                                if nx == 0 || ny == 0 || nx >= w - 1 || ny >= h - 1 {
                                    continue;
                                }
                                let n = ny * w + nx;
                                if edges.data[n] == 0 && thin[n] >= self.low_threshold {
                                    edges.data[n] = ON;
                                    stack.push(n);
                                }
                            }
                        }
                    }
                }
            }
        }
        edges
    }
}

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (TRUNCATE * sigma).ceil().max(0.0) as i32;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|d| (-((d * d) as f32) / two_sigma_sq).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur with edge clamping.
fn gaussian_blur(data: &[f32], w: usize, h: usize, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return data.to_vec();
    }
    let kernel = gaussian_kernel(sigma);
    let r = (kernel.len() / 2) as isize;
    let (wi, hi) = (w as isize, h as isize);

    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - r).clamp(0, wi - 1) as usize;
                acc += data[y * w + sx] * weight;
            }
            tmp[y * w + x] = acc;
        }
    }

    let mut out = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - r).clamp(0, hi - 1) as usize;
                acc += tmp[sy * w + x] * weight;
            }
            out[y * w + x] = acc;
        }
    }
    out
}

/// Unnormalized 3×3 Sobel derivatives; zero on the border.
fn sobel(data: &[f32], w: usize, h: usize) -> (Vec<f32>, Vec<f32>) {
    let mut gx = vec![0.0f32; w * h];
    let mut gy = vec![0.0f32; w * h];
    let at = |x: usize, y: usize| data[y * w + x];

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            gx[y * w + x] = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
            gy[y * w + x] = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
        }
    }
    (gx, gy)
}

/// Keep magnitudes that are local maxima along the (quantized) gradient
/// direction; everything else becomes zero.
fn non_max_suppression(mag: &[f32], gx: &[f32], gy: &[f32], w: usize, h: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; w * h];
    // tan(22.5°) and tan(67.5°)
    const TAN_22: f32 = 0.414_213_6;
    const TAN_67: f32 = 2.414_213_6;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = mag[i];
            if m == 0.0 {
                continue;
            }
            let (dx, dy) = (gx[i], gy[i]);
            let slope = if dx == 0.0 { f32::INFINITY } else { (dy / dx).abs() };

            let (a, b) = if slope < TAN_22 {
                (mag[i - 1], mag[i + 1])
            } else if slope > TAN_67 {
                (mag[i - w], mag[i + w])
            } else if (dx > 0.0) == (dy > 0.0) {
                (mag[i - w - 1], mag[i + w + 1])
            } else {
                (mag[i - w + 1], mag[i + w - 1])
            };

            if m >= a && m >= b {
                out[i] = m;
            }
        }
    }
    out
}
