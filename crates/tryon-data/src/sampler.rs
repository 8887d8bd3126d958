// Samplers — visiting order of one pass, and the cursor that walks it
//
// A pass is one permutation of 0..len. `PassCursor::advance` hands it out in
// batch-sized slices and draws the next pass once the current one is used up.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Decides the order in which a pass visits dataset indices.
pub trait Sampler: Send + Sync {
    /// A permutation of `0..len`.
    fn sample(&self, len: usize, rng: &mut StdRng) -> Vec<usize>;
}

/// Visits indices in list order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialSampler;

impl Sampler for SequentialSampler {
    fn sample(&self, len: usize, _rng: &mut StdRng) -> Vec<usize> {
        (0..len).collect()
    }
}

/// Uniform random permutation, drawn fresh for every pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSampler;

impl Sampler for RandomSampler {
    fn sample(&self, len: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(rng);
        indices
    }
}

/// Position within the current pass: its visiting order and how much of it
/// has been handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassCursor {
    order: Vec<usize>,
    offset: usize,
}

impl PassCursor {
    /// A cursor with no pass in progress; the first `advance` starts one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of the current pass not yet handed out.
    pub fn remaining(&self) -> &[usize] {
        &self.order[self.offset.min(self.order.len())..]
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.order.len()
    }

    /// Next batch of indices and the cursor after it.
    ///
    /// An exhausted cursor first draws a new pass order from `sampler`. A batch
    /// never spans two passes, so the last batch of a pass may be short.
    pub fn advance(
        self,
        len: usize,
        batch_size: usize,
        sampler: &dyn Sampler,
        rng: &mut StdRng,
    ) -> (Vec<usize>, PassCursor) {
        let cursor = if self.is_exhausted() || self.order.len() != len {
            PassCursor {
                order: sampler.sample(len, rng),
                offset: 0,
            }
        } else {
            self
        };
        let end = (cursor.offset + batch_size).min(cursor.order.len());
        let batch = cursor.order[cursor.offset..end].to_vec();
        (
            batch,
            PassCursor {
                order: cursor.order,
                offset: end,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_sequential_order() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(SequentialSampler.sample(4, &mut rng), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_random_is_permutation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut order = RandomSampler.sample(50, &mut rng);
        assert_ne!(order, (0..50).collect::<Vec<_>>());
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_advance_short_tail_then_restart() {
        let mut rng = StdRng::seed_from_u64(0);
        let c = PassCursor::new();
        let (b0, c) = c.advance(5, 2, &SequentialSampler, &mut rng);
        let (b1, c) = c.advance(5, 2, &SequentialSampler, &mut rng);
        let (b2, c) = c.advance(5, 2, &SequentialSampler, &mut rng);
        assert!(c.is_exhausted());
        let (b3, _) = c.advance(5, 2, &SequentialSampler, &mut rng);
        assert_eq!(b0, vec![0, 1]);
        assert_eq!(b1, vec![2, 3]);
        assert_eq!(b2, vec![4]);
        assert_eq!(b3, vec![0, 1]);
    }

    #[test]
    fn test_advance_is_deterministic_for_a_seed() {
        let run = || {
            let mut rng = StdRng::seed_from_u64(42);
            let mut c = PassCursor::new();
            let mut out = Vec::new();
            for _ in 0..6 {
                let (b, next) = c.advance(7, 3, &RandomSampler, &mut rng);
                out.push(b);
                c = next;
            }
            out
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_remaining() {
        let mut rng = StdRng::seed_from_u64(0);
        let (_, c) = PassCursor::new().advance(3, 1, &SequentialSampler, &mut rng);
        assert_eq!(c.remaining(), &[1, 2]);
    }
}
