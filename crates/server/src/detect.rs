use std::collections::VecDeque;

use image::GrayImage;
use serde::Deserialize;

/// Tunables for blob extraction. A pixel participates when it sits
/// `threshold_sigmas` noise deviations above the estimated background; blobs
/// outside the area window or rounder-than `max_elongation` are dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub threshold_sigmas: f64,
    pub min_blob_area: usize,
    pub max_blob_area: usize,
    pub max_elongation: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            threshold_sigmas: 4.0,
            min_blob_area: 50,
            max_blob_area: 10_000,
            max_elongation: 3.0,
        }
    }
}

/// One detected star candidate: intensity-weighted centroid in pixel
/// coordinates and the background-subtracted flux that ranked it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedBlob {
    pub x: f64,
    pub y: f64,
    pub brightness: f64,
    pub area: usize,
}

/// Find star-like blobs in a grayscale frame, brightest first.
pub fn detect_stars(image: &GrayImage, settings: &DetectionSettings) -> Vec<DetectedBlob> {
    let (background, noise) = estimate_background(image);
    let threshold = background + settings.threshold_sigmas * noise;

    let mut stars: Vec<DetectedBlob> = label_blobs(image, threshold, background)
        .into_iter()
        .filter(|blob| blob.area >= settings.min_blob_area && blob.area <= settings.max_blob_area)
        .filter(|blob| blob.elongation() <= settings.max_elongation)
        .map(|blob| {
            let (x, y) = blob.centroid();
            DetectedBlob {
                x,
                y,
                brightness: blob.weight,
                area: blob.area,
            }
        })
        .collect();

    stars.sort_by(|a, b| b.brightness.total_cmp(&a.brightness));
    stars
}

/// Background level and noise from the pixel histogram. The noise estimate
/// only looks at pixels at or below the median so stars do not inflate it.
fn estimate_background(image: &GrayImage) -> (f64, f64) {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return (0.0, 1.0);
    }

    let mut seen = 0u64;
    let mut median = 0usize;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen * 2 >= total {
            median = value;
            break;
        }
    }

    let mut weight = 0u64;
    let mut sum_sq = 0.0f64;
    for (value, &count) in histogram.iter().enumerate().take(median + 1) {
        let delta = median as f64 - value as f64;
        sum_sq += delta * delta * count as f64;
        weight += count;
    }
    let noise = if weight > 0 {
        (sum_sq / weight as f64).sqrt()
    } else {
        0.0
    };

    // Floor keeps the threshold strictly above a perfectly flat background.
    (median as f64, noise.max(1.0))
}

#[derive(Debug, Default)]
struct BlobAccumulator {
    area: usize,
    weight: f64,
    sum_wx: f64,
    sum_wy: f64,
    sum_wxx: f64,
    sum_wyy: f64,
    sum_wxy: f64,
}

impl BlobAccumulator {
    fn add(&mut self, x: f64, y: f64, weight: f64) {
        let weight = weight.max(1e-6);
        self.area += 1;
        self.weight += weight;
        self.sum_wx += weight * x;
        self.sum_wy += weight * y;
        self.sum_wxx += weight * x * x;
        self.sum_wyy += weight * y * y;
        self.sum_wxy += weight * x * y;
    }

    fn centroid(&self) -> (f64, f64) {
        (self.sum_wx / self.weight, self.sum_wy / self.weight)
    }

    /// Ratio of the blob's principal axes, from the eigenvalues of the
    /// weighted covariance. 1.0 is a perfect disc.
    fn elongation(&self) -> f64 {
        if self.weight <= 0.0 {
            return 1.0;
        }
        let (cx, cy) = self.centroid();
        let mxx = self.sum_wxx / self.weight - cx * cx;
        let myy = self.sum_wyy / self.weight - cy * cy;
        let mxy = self.sum_wxy / self.weight - cx * cy;

        let mid = (mxx + myy) * 0.5;
        let det = mxx * myy - mxy * mxy;
        let disc = (mid * mid - det).max(0.0).sqrt();
        let major = (mid + disc).max(1e-9);
        let minor = (mid - disc).max(1e-9);
        (major / minor).sqrt()
    }
}

/// Flood-fill connected components of pixels above `threshold`
/// (4-connectivity), accumulating weighted moments as we go.
fn label_blobs(image: &GrayImage, threshold: f64, background: f64) -> Vec<BlobAccumulator> {
    let (width, height) = image.dimensions();
    let mut visited = vec![false; (width as usize) * (height as usize)];
    let mut blobs = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            let start = (y * width + x) as usize;
            if visited[start] || f64::from(image.get_pixel(x, y).0[0]) <= threshold {
                continue;
            }

            let mut blob = BlobAccumulator::default();
            visited[start] = true;
            queue.push_back((x, y));
            while let Some((px, py)) = queue.pop_front() {
                let value = f64::from(image.get_pixel(px, py).0[0]);
                blob.add(f64::from(px), f64::from(py), (value - background).max(0.0));
                for (nx, ny) in neighbors(px, py, width, height) {
                    let index = (ny * width + nx) as usize;
                    if !visited[index] && f64::from(image.get_pixel(nx, ny).0[0]) > threshold {
                        visited[index] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }
            blobs.push(blob);
        }
    }

    blobs
}

fn neighbors(x: u32, y: u32, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    let mut out = Vec::with_capacity(4);
    if x > 0 {
        out.push((x - 1, y));
    }
    if x + 1 < width {
        out.push((x + 1, y));
    }
    if y > 0 {
        out.push((x, y - 1));
    }
    if y + 1 < height {
        out.push((x, y + 1));
    }
    out.into_iter()
}

#[cfg(test)]
#[path = "tests/detect_tests.rs"]
mod tests;
