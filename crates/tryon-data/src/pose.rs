// Pose rendering — keypoints → heatmap stack and overlay image
//
// Each valid joint becomes a filled (2r+1)×(2r+1) square centred on its
// rounded coordinate:
//
//   heatmaps [18, H, W] — one channel per joint, [-1, 1] where a marker was
//                         drawn; channels of invalid or missing joints stay 0
//   overlay  [3, H, W]  — every marker on one canvas, [-1, 1], gray as RGB

use tryon_core::{Raster, Result, Tensor};

use crate::keypoints::{PoseJoint, PoseKeypoints};
use crate::transform::Normalize;

const MARKER: u8 = 255;

/// Rendered pose tensors of one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseMaps {
    pub heatmaps: Tensor,
    pub overlay: Tensor,
}

/// Rasterizes keypoints at a fixed output size.
#[derive(Debug, Clone)]
pub struct PoseRenderer {
    width: u32,
    height: u32,
    radius: u32,
    normalize: Normalize,
}

impl PoseRenderer {
    pub fn new(width: u32, height: u32, radius: u32) -> Self {
        Self {
            width,
            height,
            radius,
            normalize: Normalize::default(),
        }
    }

    pub fn render(&self, keypoints: &PoseKeypoints) -> Result<PoseMaps> {
        let (w, h) = (self.width as usize, self.height as usize);
        let plane = w * h;
        let mut heatmaps = vec![0.0f32; PoseJoint::COUNT * plane];
        let mut overlay = Raster::blank_gray8(self.width, self.height);

        for (i, point) in keypoints
            .points()
            .iter()
            .take(PoseJoint::COUNT)
            .enumerate()
        {
            if !point.is_valid() {
                continue;
            }
            // Far off-canvas centres clamp to just outside the border so the
            // square bounds cannot overflow.
            let r = self.radius as i64;
            let cx = point.x.round().min((w as i64 + r) as f64) as i64;
            let cy = point.y.round().min((h as i64 + r) as f64) as i64;

            let mut canvas = Raster::blank_gray8(self.width, self.height);
            canvas.fill_rect(cx - r, cy - r, cx + r, cy + r, MARKER)?;
            overlay.fill_rect(cx - r, cy - r, cx + r, cy + r, MARKER)?;

            let channel = self.normalize.apply(&canvas.to_unit()?.to_tensor()?)?;
            heatmaps[i * plane..(i + 1) * plane].copy_from_slice(channel.as_slice());
        }

        let heatmaps = Tensor::from_vec(heatmaps, (PoseJoint::COUNT, h, w))?;
        let overlay = self.normalize.apply(&overlay.to_unit()?.to_tensor()?)?;
        let overlay = Tensor::cat(&[overlay.clone(), overlay.clone(), overlay], 0)?;
        Ok(PoseMaps { heatmaps, overlay })
    }
}
