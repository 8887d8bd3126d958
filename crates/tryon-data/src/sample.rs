// Sample and batch records
//
// A sample holds every tensor one (person, garment) pair contributes, all
// sharing the output H×W:
//
//   cloth         [3, H, W]   garment image, [-1, 1]
//   cloth_mask    [1, H, W]   garment mask, {0, 1}
//   person_image  [3, H, W]   person image, [-1, 1]
//   agnostic      [22, H, W]  body_shape ++ head_crop ++ 18 pose heatmaps
//   parse_cloth   [3, H, W]   person pixels on the garment region, white elsewhere
//   body_shape    [1, H, W]   blurred silhouette, [-1, 1]
//   head_crop     [3, H, W]   person pixels on the head region, black elsewhere
//   pose_overlay  [3, H, W]   all keypoint markers on one canvas
//   grid_overlay  [3, H, W]   reference grid, garment-alignment stage only
//
// A batch stacks each field along a new leading axis.

use tryon_core::{bail, Result, Tensor};

use crate::dataset::Collate;

/// Tensor field names, in record order.
pub const FIELDS: [&str; 9] = [
    "cloth",
    "cloth_mask",
    "person_image",
    "agnostic",
    "parse_cloth",
    "body_shape",
    "head_crop",
    "pose_overlay",
    "grid_overlay",
];

/// Everything built for one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TryOnSample {
    pub person_name: String,
    pub garment_name: String,
    pub cloth: Tensor,
    pub cloth_mask: Tensor,
    pub person_image: Tensor,
    pub agnostic: Tensor,
    pub parse_cloth: Tensor,
    pub body_shape: Tensor,
    pub head_crop: Tensor,
    pub pose_overlay: Tensor,
    pub grid_overlay: Option<Tensor>,
}

impl TryOnSample {
    /// Look a tensor up by field name. `grid_overlay` is `None` when absent.
    pub fn tensor(&self, name: &str) -> Option<&Tensor> {
        match name {
            "cloth" => Some(&self.cloth),
            "cloth_mask" => Some(&self.cloth_mask),
            "person_image" => Some(&self.person_image),
            "agnostic" => Some(&self.agnostic),
            "parse_cloth" => Some(&self.parse_cloth),
            "body_shape" => Some(&self.body_shape),
            "head_crop" => Some(&self.head_crop),
            "pose_overlay" => Some(&self.pose_overlay),
            "grid_overlay" => self.grid_overlay.as_ref(),
            _ => None,
        }
    }
}

/// A collated batch; every tensor has a leading batch axis of `len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct TryOnBatch {
    pub person_names: Vec<String>,
    pub garment_names: Vec<String>,
    pub cloth: Tensor,
    pub cloth_mask: Tensor,
    pub person_image: Tensor,
    pub agnostic: Tensor,
    pub parse_cloth: Tensor,
    pub body_shape: Tensor,
    pub head_crop: Tensor,
    pub pose_overlay: Tensor,
    /// `None` for the stage without a reference grid.
    pub grid_overlay: Option<Tensor>,
}

impl TryOnBatch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.person_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.person_names.is_empty()
    }

    /// Look a batched tensor up by field name.
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        match name {
            "cloth" => Some(&self.cloth),
            "cloth_mask" => Some(&self.cloth_mask),
            "person_image" => Some(&self.person_image),
            "agnostic" => Some(&self.agnostic),
            "parse_cloth" => Some(&self.parse_cloth),
            "body_shape" => Some(&self.body_shape),
            "head_crop" => Some(&self.head_crop),
            "pose_overlay" => Some(&self.pose_overlay),
            "grid_overlay" => self.grid_overlay.as_ref(),
            _ => None,
        }
    }
}

fn stack_field<F>(samples: &[TryOnSample], field: F) -> Result<Tensor>
where
    F: Fn(&TryOnSample) -> &Tensor,
{
    let parts: Vec<Tensor> = samples.iter().map(|s| field(s).clone()).collect();
    Tensor::stack(&parts, 0)
}

impl Collate for TryOnSample {
    type Batch = TryOnBatch;

    fn collate(items: Vec<Self>) -> Result<TryOnBatch> {
        if items.is_empty() {
            bail!("collate: empty batch");
        }

        let with_grid = items.iter().filter(|s| s.grid_overlay.is_some()).count();
        let grid_overlay = match with_grid {
            0 => None,
            n if n == items.len() => {
                let parts: Vec<Tensor> = items
                    .iter()
                    .filter_map(|s| s.grid_overlay.clone())
                    .collect();
                Some(Tensor::stack(&parts, 0)?)
            }
            n => bail!(
                "collate: {} of {} samples carry a grid overlay",
                n,
                items.len()
            ),
        };

        Ok(TryOnBatch {
            cloth: stack_field(&items, |s| &s.cloth)?,
            cloth_mask: stack_field(&items, |s| &s.cloth_mask)?,
            person_image: stack_field(&items, |s| &s.person_image)?,
            agnostic: stack_field(&items, |s| &s.agnostic)?,
            parse_cloth: stack_field(&items, |s| &s.parse_cloth)?,
            body_shape: stack_field(&items, |s| &s.body_shape)?,
            head_crop: stack_field(&items, |s| &s.head_crop)?,
            pose_overlay: stack_field(&items, |s| &s.pose_overlay)?,
            grid_overlay,
            person_names: items.iter().map(|s| s.person_name.clone()).collect(),
            garment_names: items.into_iter().map(|s| s.garment_name).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy(value: f32, grid: bool) -> TryOnSample {
        let t3 = Tensor::full((3, 2, 2), value);
        let t1 = Tensor::full((1, 2, 2), value);
        TryOnSample {
            person_name: format!("p{value}"),
            garment_name: format!("g{value}"),
            cloth: t3.clone(),
            cloth_mask: t1.clone(),
            person_image: t3.clone(),
            agnostic: Tensor::full((22, 2, 2), value),
            parse_cloth: t3.clone(),
            body_shape: t1,
            head_crop: t3.clone(),
            pose_overlay: t3.clone(),
            grid_overlay: grid.then_some(t3),
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let s = toy(0.0, false);
        for name in &FIELDS[..8] {
            assert!(s.tensor(name).is_some(), "{name}");
        }
        assert!(s.tensor("grid_overlay").is_none());
        assert!(s.tensor("nope").is_none());
    }

    #[test]
    fn test_collate_stacks_in_order() {
        let b = TryOnSample::collate(vec![toy(0.0, true), toy(1.0, true)]).unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(b.agnostic.dims(), &[2, 22, 2, 2]);
        assert_eq!(b.cloth_mask.dims(), &[2, 1, 2, 2]);
        assert_eq!(b.cloth.get(&[1, 0, 0, 0]).unwrap(), 1.0);
        assert_eq!(b.person_names, vec!["p0", "p1"]);
        assert_eq!(b.garment_names, vec!["g0", "g1"]);
        assert_eq!(b.get("grid_overlay").unwrap().dims(), &[2, 3, 2, 2]);
    }

    #[test]
    fn test_collate_without_grid() {
        let b = TryOnSample::collate(vec![toy(0.0, false)]).unwrap();
        assert!(b.grid_overlay.is_none());
        assert!(b.get("grid_overlay").is_none());
    }

    #[test]
    fn test_collate_rejects_mixed_grid_and_empty() {
        assert!(TryOnSample::collate(vec![toy(0.0, true), toy(1.0, false)]).is_err());
        assert!(TryOnSample::collate(vec![]).is_err());
    }
}
