//! # tryon-data
//!
//! Paired person/garment samples and batches for virtual try-on training.
//!
//! This crate provides:
//! - [`SampleBuilder`] — reads the assets of one (person, garment) pair and
//!   builds every tensor of a [`TryOnSample`], including the 22-channel
//!   person representation
//! - [`BatchSequencer`] — endless cyclic batching over any [`Dataset`], in
//!   list order or reshuffled every pass, with optional parallel workers
//! - [`DatasetConfig`] / [`LoaderConfig`] / [`PipelineConfig`] — builder-style
//!   configuration, loadable from JSON
//! - Readers for pair lists, parsing label maps and keypoint records, plus
//!   pose heatmap rendering and image normalization

pub mod builder;
pub mod config;
pub mod dataset;
pub mod keypoints;
pub mod labels;
pub mod loader;
pub mod pairs;
pub mod pose;
pub mod sample;
pub mod sampler;
pub mod transform;

pub use builder::SampleBuilder;
pub use config::{DatasetConfig, LoaderConfig, PipelineConfig, Stage};
pub use dataset::{Collate, Dataset};
pub use keypoints::{KeypointDetection, PoseJoint, PoseKeypoints};
pub use labels::{LabelClass, LabelMap, LabelTable};
pub use loader::BatchSequencer;
pub use pairs::{Pair, PairList};
pub use pose::{PoseMaps, PoseRenderer};
pub use sample::{TryOnBatch, TryOnSample, FIELDS};
pub use sampler::{PassCursor, RandomSampler, Sampler, SequentialSampler};
pub use transform::Normalize;
