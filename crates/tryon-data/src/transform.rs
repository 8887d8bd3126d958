// Transform — image → normalized tensor
//
// Every image-like field goes through the same two steps:
//
//   1. to-tensor: HWC u8 → CHW f32 in [0, 1]
//   2. normalize: (x - mean) / std per channel; mean = std = 0.5 maps to [-1, 1]
//
// Masks skip step 2 (cloth_mask) or arrive as unit rasters and only take it.

use image::RgbImage;

use tryon_core::{Error, Result, Tensor};

/// Convert an RGB image from interleaved `[H, W, 3]` bytes to planar
/// `[3, H, W]` floats in [0, 1].
pub fn rgb_to_tensor(img: &RgbImage) -> Result<Tensor> {
    let (w, h) = img.dimensions();
    let raw = img.as_raw();
    let npix = (w * h) as usize;
    let mut data = vec![0.0f32; 3 * npix];
    for i in 0..npix {
        data[i] = raw[i * 3] as f32 / 255.0;
        data[npix + i] = raw[i * 3 + 1] as f32 / 255.0;
        data[2 * npix + i] = raw[i * 3 + 2] as f32 / 255.0;
    }
    Tensor::from_vec(data, (3, h as usize, w as usize))
}

/// Per-channel standardization `(x - mean) / std` over a `[C, H, W]` tensor.
///
/// A single mean/std pair applies to every channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalize {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl Default for Normalize {
    /// mean = std = 0.5: [0, 1] → [-1, 1].
    fn default() -> Self {
        Self::uniform(0.5, 0.5)
    }
}

impl Normalize {
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> Result<Self> {
        if mean.is_empty() || mean.len() != std.len() {
            return Err(Error::config(format!(
                "normalize: {} means vs {} stds",
                mean.len(),
                std.len()
            )));
        }
        if std.iter().any(|&s| s == 0.0) {
            return Err(Error::config("normalize: std must be non-zero"));
        }
        Ok(Self { mean, std })
    }

    /// Same mean and std for every channel.
    pub fn uniform(mean: f32, std: f32) -> Self {
        Self {
            mean: vec![mean],
            std: vec![std],
        }
    }

    pub fn apply(&self, t: &Tensor) -> Result<Tensor> {
        if t.rank() != 3 {
            return Err(Error::msg(format!(
                "normalize: expected [C, H, W], got {}",
                t.shape()
            )));
        }
        let channels = t.dims()[0];
        if self.mean.len() != 1 && self.mean.len() != channels {
            return Err(Error::msg(format!(
                "normalize: {} channel statistics for a {}-channel tensor",
                self.mean.len(),
                channels
            )));
        }
        let plane = t.dims()[1] * t.dims()[2];
        let mut data = t.to_vec();
        for (c, chunk) in data.chunks_mut(plane.max(1)).enumerate() {
            let k = if self.mean.len() == 1 { 0 } else { c };
            let (m, s) = (self.mean[k], self.std[k]);
            for v in chunk {
                *v = (*v - m) / s;
            }
        }
        Tensor::from_vec(data, t.shape().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rgb_to_tensor_planar() {
        let img = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([255, 0, 51])
            } else {
                Rgb([0, 255, 102])
            }
        });
        let t = rgb_to_tensor(&img).unwrap();
        assert_eq!(t.dims(), &[3, 1, 2]);
        assert_eq!(t.get(&[0, 0, 0]).unwrap(), 1.0);
        assert_eq!(t.get(&[1, 0, 1]).unwrap(), 1.0);
        assert!((t.get(&[2, 0, 0]).unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_default_maps_to_unit_interval() {
        let t = Tensor::from_vec(vec![0.0, 0.5, 1.0], (1, 1, 3)).unwrap();
        let n = Normalize::default().apply(&t).unwrap();
        assert_eq!(n.as_slice(), &[-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_per_channel() {
        let t = Tensor::full((2, 1, 1), 1.0);
        let n = Normalize::new(vec![0.0, 0.5], vec![1.0, 0.25])
            .unwrap()
            .apply(&t)
            .unwrap();
        assert_eq!(n.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_channel_count_mismatch() {
        let t = Tensor::zeros((3, 1, 1));
        let n = Normalize::new(vec![0.5, 0.5], vec![0.5, 0.5]).unwrap();
        assert!(n.apply(&t).is_err());
        assert!(Normalize::new(vec![0.5], vec![0.0]).is_err());
    }
}
