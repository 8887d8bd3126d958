// BatchSequencer — endless, cyclic batching over a Dataset
//
// Each call to `next_batch` hands out the next `batch_size` indices of the
// current pass, builds those samples (in parallel when workers are
// configured) and collates them in index order. When a pass is used up a new
// one starts: list order, or a fresh permutation when shuffling.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use tryon_core::{Error, Result};

use crate::config::LoaderConfig;
use crate::dataset::{Collate, Dataset};
use crate::sampler::{PassCursor, RandomSampler, Sampler, SequentialSampler};

/// Wraps a dataset and produces collated batches forever.
pub struct BatchSequencer<D: Dataset> {
    dataset: D,
    config: LoaderConfig,
    sampler: Box<dyn Sampler>,
    cursor: PassCursor,
    rng: StdRng,
    pool: Option<ThreadPool>,
    passes: usize,
}

impl<D> BatchSequencer<D>
where
    D: Dataset,
    D::Item: Collate,
{
    /// Fails with `Error::Config` for a zero batch size, an empty dataset, or
    /// a worker pool that cannot be started.
    pub fn new(dataset: D, config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(Error::config(format!(
                "dataset '{}' has no samples",
                dataset.name()
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let sampler: Box<dyn Sampler> = if config.shuffle {
            Box::new(RandomSampler)
        } else {
            Box::new(SequentialSampler)
        };
        let pool = if config.num_workers > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(config.num_workers)
                .thread_name(|i| format!("tryon-worker-{i}"))
                .build()
                .map_err(|e| Error::config(format!("cannot start worker pool: {e}")))?;
            Some(pool)
        } else {
            None
        };

        info!(
            dataset = dataset.name(),
            samples = dataset.len(),
            batch_size = config.batch_size,
            shuffle = config.shuffle,
            workers = config.num_workers,
            pin_memory = config.pin_memory,
            "batch sequencer ready"
        );

        Ok(Self {
            dataset,
            config,
            sampler,
            cursor: PassCursor::new(),
            rng,
            pool,
            passes: 0,
        })
    }

    /// Build and collate the next batch.
    ///
    /// Never ends: after the last batch of a pass the next call starts a new
    /// pass. The last batch of a pass holds the leftover samples and may be
    /// shorter than `batch_size`.
    pub fn next_batch(&mut self) -> Result<<D::Item as Collate>::Batch> {
        let indices = self.next_indices();
        let items = self.fetch(&indices)?;
        <D::Item as Collate>::collate(items)
    }

    /// Indices of the next batch, advancing the pass cursor.
    pub fn next_indices(&mut self) -> Vec<usize> {
        let cursor = std::mem::take(&mut self.cursor);
        if cursor.is_exhausted() {
            self.passes += 1;
            debug!(pass = self.passes, "starting pass");
        }
        let (indices, cursor) = cursor.advance(
            self.dataset.len(),
            self.config.batch_size,
            self.sampler.as_ref(),
            &mut self.rng,
        );
        self.cursor = cursor;
        indices
    }

    fn fetch(&self, indices: &[usize]) -> Result<Vec<D::Item>> {
        match &self.pool {
            Some(pool) if indices.len() > 1 => pool.install(|| {
                indices
                    .par_iter()
                    .map(|&i| self.dataset.get(i))
                    .collect::<Result<Vec<_>>>()
            }),
            _ => indices.iter().map(|&i| self.dataset.get(i)).collect(),
        }
    }

    /// Batches per pass, counting a short final batch.
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.config.batch_size)
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Passes started so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }
}
