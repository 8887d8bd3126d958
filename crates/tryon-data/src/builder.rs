// SampleBuilder — assembles one try-on sample from its source assets
//
// For pair (person, garment) under data_path = {dataroot}/{subset}:
//
//   {stage cloth dir}/{garment}     → cloth
//   {stage mask dir}/{garment}      → cloth_mask
//   image/{person}                  → person_image
//   image-parse/{stem}.{label ext}  → body_shape, parse_cloth, head_crop
//   pose/{stem}{keypoint suffix}    → 18 pose heatmaps, pose_overlay
//   grid_path (alignment only)      → grid_overlay
//
// Every asset must already be W×H. Building is pure reading: two calls with
// the same index give identical tensors.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::debug;

use tryon_core::{Error, Raster, Result, Tensor};

use crate::config::{DatasetConfig, SHAPE_DOWNSAMPLE};
use crate::dataset::Dataset;
use crate::keypoints::PoseKeypoints;
use crate::labels::{LabelMap, LabelTable};
use crate::pairs::{Pair, PairList};
use crate::pose::PoseRenderer;
use crate::sample::TryOnSample;
use crate::transform::{rgb_to_tensor, Normalize};

/// Fill for pixels outside the garment region of `parse_cloth` (white).
pub const GARMENT_FILL: f32 = 1.0;
/// Fill for pixels outside the head region of `head_crop` (black).
pub const HEAD_FILL: f32 = -1.0;
/// Intensity at or above which a garment-mask pixel counts as garment.
pub const MASK_THRESHOLD: u8 = 128;

/// Builds [`TryOnSample`]s for the pairs of one subset.
#[derive(Debug, Clone)]
pub struct SampleBuilder {
    config: DatasetConfig,
    pairs: PairList,
    data_path: PathBuf,
    labels: LabelTable,
    normalize: Normalize,
    renderer: PoseRenderer,
}

impl SampleBuilder {
    /// Validate `config` and read its pair list.
    pub fn new(config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        let pairs = PairList::load(config.pair_list_path())?;
        Ok(Self::from_parts(config, pairs))
    }

    /// Use an already-loaded pair list instead of reading `data_list`.
    pub fn with_pairs(config: DatasetConfig, pairs: PairList) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, pairs))
    }

    fn from_parts(config: DatasetConfig, pairs: PairList) -> Self {
        debug!(
            subset = %config.subset,
            stage = %config.stage,
            pairs = pairs.len(),
            "sample builder ready"
        );
        Self {
            data_path: config.data_path(),
            renderer: PoseRenderer::new(config.fine_width, config.fine_height, config.radius),
            labels: LabelTable::new(),
            normalize: Normalize::default(),
            pairs,
            config,
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn pairs(&self) -> &PairList {
        &self.pairs
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Build the sample for pair `index`.
    pub fn build(&self, index: usize) -> Result<TryOnSample> {
        let pair = self.pairs.get(index)?;
        debug!(index, person = %pair.person, garment = %pair.garment, "building sample");

        let stage = self.config.stage;
        let cloth_path = self.data_path.join(stage.cloth_dir()).join(&pair.garment);
        let mask_path = self.data_path.join(stage.mask_dir()).join(&pair.garment);

        let cloth = self.load_rgb(&cloth_path)?;
        let cloth_mask = self.load_mask(&mask_path)?;
        let person_image = self.load_rgb(&self.data_path.join("image").join(&pair.person))?;

        let parse_path = self.parse_path(pair);
        let parse = LabelMap::open(&parse_path)?;
        self.check_dims(&parse_path, parse.width(), parse.height())?;

        let body_shape = self.body_shape(&parse)?;
        let garment_mask = parse.garment_mask(&self.labels)?.to_tensor()?;
        let head_mask = parse.head_mask(&self.labels)?.to_tensor()?;
        let parse_cloth = person_image.composite(&garment_mask, GARMENT_FILL)?;
        let head_crop = person_image.composite(&head_mask, HEAD_FILL)?;

        let keypoints = PoseKeypoints::load(self.pose_path(pair))?;
        let pose = self.renderer.render(&keypoints)?;

        let agnostic = Tensor::cat(&[body_shape.clone(), head_crop.clone(), pose.heatmaps], 0)?;

        let grid_overlay = if stage.uses_grid() {
            Some(self.load_rgb(&self.config.grid_path)?)
        } else {
            None
        };

        Ok(TryOnSample {
            person_name: pair.person.clone(),
            garment_name: pair.garment.clone(),
            cloth,
            cloth_mask,
            person_image,
            agnostic,
            parse_cloth,
            body_shape,
            head_crop,
            pose_overlay: pose.overlay,
            grid_overlay,
        })
    }

    /// `image-parse/{person with extension replaced by label_extension}`.
    /// Sub-directories in the person name are kept.
    pub fn parse_path(&self, pair: &Pair) -> PathBuf {
        let name = Path::new(&pair.person).with_extension(&self.config.label_extension);
        self.data_path.join("image-parse").join(name)
    }

    /// `pose/{person with extension replaced by keypoint_suffix}`.
    pub fn pose_path(&self, pair: &Pair) -> PathBuf {
        let person = Path::new(&pair.person);
        let stem = person
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        let name = format!("{}{}", stem, self.config.keypoint_suffix);
        let dir = self.data_path.join("pose");
        match person.parent() {
            Some(parent) => dir.join(parent).join(name),
            None => dir.join(name),
        }
    }

    /// Silhouette → 8-bit → shrink 16× → grow back → [-1, 1], one channel.
    fn body_shape(&self, parse: &LabelMap) -> Result<Tensor> {
        let (w, h) = (self.config.fine_width, self.config.fine_height);
        let smooth = parse
            .shape_mask(&self.labels)?
            .to_gray8()?
            .resize_bilinear(w / SHAPE_DOWNSAMPLE, h / SHAPE_DOWNSAMPLE)?
            .resize_bilinear(w, h)?
            .to_unit()?;
        self.normalize.apply(&smooth.to_tensor()?)
    }

    fn open_image(&self, path: &Path) -> Result<DynamicImage> {
        let bytes = std::fs::read(path).map_err(|e| Error::from_io(path, e))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| Error::malformed(path, format!("cannot decode image: {e}")))?;
        self.check_dims(path, img.width(), img.height())?;
        Ok(img)
    }

    /// Colour image → [3, H, W] in [-1, 1].
    fn load_rgb(&self, path: &Path) -> Result<Tensor> {
        let img = self.open_image(path)?;
        self.normalize.apply(&rgb_to_tensor(&img.to_rgb8())?)
    }

    /// Grayscale mask → [1, H, W] in {0, 1}.
    fn load_mask(&self, path: &Path) -> Result<Tensor> {
        let img = self.open_image(path)?;
        Raster::from_gray8(img.to_luma8())
            .threshold(MASK_THRESHOLD)?
            .to_tensor()
    }

    fn check_dims(&self, path: &Path, width: u32, height: u32) -> Result<()> {
        let (w, h) = (self.config.fine_width, self.config.fine_height);
        if (width, height) != (w, h) {
            return Err(Error::malformed(
                path,
                format!("expected {w}x{h} pixels, got {width}x{height}"),
            ));
        }
        Ok(())
    }
}

impl Dataset for SampleBuilder {
    type Item = TryOnSample;

    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn get(&self, index: usize) -> Result<TryOnSample> {
        self.build(index)
    }

    fn name(&self) -> &str {
        self.config.stage.as_str()
    }
}
