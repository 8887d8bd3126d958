// Dataset trait — indexed, fallible access to samples

use tryon_core::Result;

/// A dataset is an indexed collection of samples.
///
/// Implementations must be `Send + Sync` so the sequencer can build several
/// samples of a batch on worker threads.
pub trait Dataset: Send + Sync {
    /// The record produced for one index.
    type Item: Send;

    /// Total number of samples in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the sample at position `index`.
    ///
    /// Fails with `Error::IndexOutOfRange` if `index >= self.len()`, and with
    /// the asset error of whichever input could not be read otherwise.
    fn get(&self, index: usize) -> Result<Self::Item>;

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}

/// Merges the samples of one batch into a batch record.
pub trait Collate: Sized {
    type Batch;

    /// Collate `items`, kept in batch order.
    fn collate(items: Vec<Self>) -> Result<Self::Batch>;
}
