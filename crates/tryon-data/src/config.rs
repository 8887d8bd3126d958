// Configuration — dataset location, stage, resolution, and batching policy
//
// Two config structs follow the same builder style:
//
//   let ds = DatasetConfig::default()
//       .dataroot("data")
//       .subset("train")
//       .stage(Stage::GarmentAlignment)
//       .resolution(192, 256);
//   let loader = LoaderConfig::default().batch_size(8).shuffle(true);
//
// Both deserialize from JSON with every field optional, so a file only needs
// to name what differs from the defaults:
//
//   { "dataset": { "stage": "TOM", "fine_width": 96 }, "loader": { "shuffle": true } }

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use tryon_core::{Error, Result};

/// Smallest output size: the silhouette is shrunk 16× in each dimension
/// before being blown back up, so anything smaller has nothing left to resample.
pub const SHAPE_DOWNSAMPLE: u32 = 16;

/// Which half of the two-stage try-on pipeline the samples feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Stage {
    /// Geometric matching: raw garment + mask, plus the reference grid.
    GarmentAlignment,
    /// Try-on refinement: pre-warped garment + mask, no grid.
    GarmentRefinement,
}

impl Stage {
    /// Sub-folder holding the garment images for this stage.
    pub fn cloth_dir(self) -> &'static str {
        match self {
            Stage::GarmentAlignment => "cloth",
            Stage::GarmentRefinement => "warp-cloth",
        }
    }

    /// Sub-folder holding the garment masks for this stage.
    pub fn mask_dir(self) -> &'static str {
        match self {
            Stage::GarmentAlignment => "cloth-mask",
            Stage::GarmentRefinement => "warp-mask",
        }
    }

    /// Whether samples of this stage carry the reference grid image.
    pub fn uses_grid(self) -> bool {
        matches!(self, Stage::GarmentAlignment)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::GarmentAlignment => "garment-alignment",
            Stage::GarmentRefinement => "garment-refinement",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gmm" | "alignment" | "garment-alignment" => Ok(Stage::GarmentAlignment),
            "tom" | "refinement" | "garment-refinement" => Ok(Stage::GarmentRefinement),
            other => Err(Error::config(format!("unknown stage '{other}'"))),
        }
    }
}

impl TryFrom<String> for Stage {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.as_str().to_string()
    }
}

/// Where the assets live and how each sample is shaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Root data directory.
    pub dataroot: PathBuf,
    /// Subset sub-directory under the root (e.g. `train`, `test`).
    pub subset: String,
    /// Processing stage.
    pub stage: Stage,
    /// Pair list file, relative to `dataroot`.
    pub data_list: String,
    /// Output width W.
    pub fine_width: u32,
    /// Output height H.
    pub fine_height: u32,
    /// Half-width of the square drawn at each keypoint.
    pub radius: u32,
    /// Reference grid image (alignment stage only). Relative paths resolve
    /// against the working directory.
    pub grid_path: PathBuf,
    /// Extension of the segmentation-label rasters.
    pub label_extension: String,
    /// Suffix replacing the person image extension for keypoint records.
    pub keypoint_suffix: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataroot: PathBuf::from("data"),
            subset: "train".to_string(),
            stage: Stage::GarmentAlignment,
            data_list: "train_pairs.txt".to_string(),
            fine_width: 192,
            fine_height: 256,
            radius: 3,
            grid_path: PathBuf::from("grid.png"),
            label_extension: "png".to_string(),
            keypoint_suffix: "_keypoints.json".to_string(),
        }
    }
}

impl DatasetConfig {
    pub fn dataroot(mut self, p: impl Into<PathBuf>) -> Self {
        self.dataroot = p.into();
        self
    }

    pub fn subset(mut self, s: impl Into<String>) -> Self {
        self.subset = s.into();
        self
    }

    pub fn stage(mut self, s: Stage) -> Self {
        self.stage = s;
        self
    }

    pub fn data_list(mut self, name: impl Into<String>) -> Self {
        self.data_list = name.into();
        self
    }

    /// Output resolution as (width, height).
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.fine_width = width;
        self.fine_height = height;
        self
    }

    pub fn radius(mut self, r: u32) -> Self {
        self.radius = r;
        self
    }

    pub fn grid_path(mut self, p: impl Into<PathBuf>) -> Self {
        self.grid_path = p.into();
        self
    }

    /// `{dataroot}/{subset}`, the directory all per-sample assets hang off.
    pub fn data_path(&self) -> PathBuf {
        self.dataroot.join(&self.subset)
    }

    /// `{dataroot}/{data_list}`.
    pub fn pair_list_path(&self) -> PathBuf {
        self.dataroot.join(&self.data_list)
    }

    /// Reject configurations that cannot produce a valid sample.
    pub fn validate(&self) -> Result<()> {
        if self.fine_width == 0 || self.fine_height == 0 {
            return Err(Error::config(format!(
                "resolution must be positive, got {}x{}",
                self.fine_width, self.fine_height
            )));
        }
        if self.fine_width < SHAPE_DOWNSAMPLE || self.fine_height < SHAPE_DOWNSAMPLE {
            return Err(Error::config(format!(
                "resolution {}x{} is below the {}px silhouette downsampling factor",
                self.fine_width, self.fine_height, SHAPE_DOWNSAMPLE
            )));
        }
        if self.subset.is_empty() {
            return Err(Error::config("subset name must not be empty"));
        }
        if self.data_list.is_empty() {
            return Err(Error::config("pair list name must not be empty"));
        }
        if self.label_extension.is_empty() || self.keypoint_suffix.is_empty() {
            return Err(Error::config(
                "label extension and keypoint suffix must not be empty",
            ));
        }
        Ok(())
    }
}

/// How samples are ordered and grouped into batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Number of samples per batch.
    pub batch_size: usize,
    /// Random permutation per pass instead of list order.
    pub shuffle: bool,
    /// Number of samples built concurrently (0 = build on the calling thread).
    pub num_workers: usize,
    /// Advisory only; batches are plain host memory either way.
    pub pin_memory: bool,
    /// Optional random seed for reproducible shuffling.
    pub seed: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 4,
            shuffle: false,
            num_workers: 1,
            pin_memory: true,
            seed: None,
        }
    }
}

impl LoaderConfig {
    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn pin_memory(mut self, p: bool) -> Self {
        self.pin_memory = p;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::config("batch size must be at least 1"));
        }
        Ok(())
    }
}

/// Dataset and loader settings read together from one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dataset: DatasetConfig,
    pub loader: LoaderConfig,
}

impl PipelineConfig {
    /// Parse from a JSON string and validate both halves.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: PipelineConfig = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("invalid pipeline config: {e}")))?;
        cfg.dataset.validate()?;
        cfg.loader.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_options() {
        let c = DatasetConfig::default();
        assert_eq!(c.fine_width, 192);
        assert_eq!(c.fine_height, 256);
        assert_eq!(c.radius, 3);
        assert_eq!(c.stage, Stage::GarmentAlignment);
        assert_eq!(c.data_path(), PathBuf::from("data/train"));
        assert_eq!(c.pair_list_path(), PathBuf::from("data/train_pairs.txt"));
        assert!(c.validate().is_ok());

        let l = LoaderConfig::default();
        assert_eq!(l.batch_size, 4);
        assert!(!l.shuffle);
    }

    #[test]
    fn test_stage_parsing() {
        assert_eq!("GMM".parse::<Stage>().unwrap(), Stage::GarmentAlignment);
        assert_eq!("tom".parse::<Stage>().unwrap(), Stage::GarmentRefinement);
        assert_eq!(
            "garment-refinement".parse::<Stage>().unwrap(),
            Stage::GarmentRefinement
        );
        assert!(matches!("xyz".parse::<Stage>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_stage_dirs() {
        assert_eq!(Stage::GarmentAlignment.cloth_dir(), "cloth");
        assert_eq!(Stage::GarmentAlignment.mask_dir(), "cloth-mask");
        assert_eq!(Stage::GarmentRefinement.cloth_dir(), "warp-cloth");
        assert_eq!(Stage::GarmentRefinement.mask_dir(), "warp-mask");
        assert!(Stage::GarmentAlignment.uses_grid());
        assert!(!Stage::GarmentRefinement.uses_grid());
    }

    #[test]
    fn test_validate_rejects_bad_resolution() {
        let zero = DatasetConfig::default().resolution(0, 256);
        assert!(matches!(zero.validate(), Err(Error::Config(_))));
        let tiny = DatasetConfig::default().resolution(8, 256);
        assert!(matches!(tiny.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let l = LoaderConfig::default().batch_size(0);
        assert!(matches!(l.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_pipeline_from_json_partial() {
        let cfg = PipelineConfig::from_json_str(
            r#"{ "dataset": { "stage": "TOM", "fine_width": 96, "fine_height": 128 },
                 "loader": { "shuffle": true, "seed": 7 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.dataset.stage, Stage::GarmentRefinement);
        assert_eq!(cfg.dataset.fine_width, 96);
        assert_eq!(cfg.dataset.radius, 3);
        assert!(cfg.loader.shuffle);
        assert_eq!(cfg.loader.seed, Some(7));
        assert_eq!(cfg.loader.batch_size, 4);
    }

    #[test]
    fn test_pipeline_from_json_unknown_stage() {
        let err = PipelineConfig::from_json_str(r#"{ "dataset": { "stage": "warp" } }"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_pipeline_from_json_zero_batch() {
        let err = PipelineConfig::from_json_str(r#"{ "loader": { "batch_size": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
