use crate::bail;
use crate::error::{Error, Result};
use crate::shape::Shape;

// Tensor — dense, contiguous, CPU-resident f32 array
//
// Every tensor a sample carries is produced once, read by collation, and then
// handed to the caller. There are no views and no autograd: a tensor owns its
// buffer outright, so cloning copies data and a sample never aliases another.
//
// LAYOUT:
//
//   Row-major, channel-first. Element (c, y, x) of a [C, H, W] tensor lives at
//   c * H * W + y * W + x.

/// An n-dimensional array of `f32` values in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Shape,
}

impl Tensor {
    /// Create a tensor filled with zeros.
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        Self::full(shape, 0.0)
    }

    /// Create a tensor filled with a constant value.
    pub fn full(shape: impl Into<Shape>, val: f32) -> Self {
        let shape = shape.into();
        Tensor {
            data: vec![val; shape.elem_count()],
            shape,
        }
    }

    /// Create a tensor from a flat row-major buffer.
    pub fn from_vec(data: Vec<f32>, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        let expected = shape.elem_count();
        if data.len() != expected {
            return Err(Error::ElementCountMismatch {
                shape,
                expected,
                got: data.len(),
            });
        }
        Ok(Tensor { data, shape })
    }

    /// The shape of this tensor.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Total number of elements.
    pub fn elem_count(&self) -> usize {
        self.data.len()
    }

    /// Borrow the underlying buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Copy the underlying buffer out.
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.clone()
    }

    /// Read a single element by its multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Result<f32> {
        if index.len() != self.rank() {
            return Err(Error::msg(format!(
                "get: index {:?} has rank {} but tensor has rank {}",
                index,
                index.len(),
                self.rank()
            )));
        }
        let strides = self.shape.stride_contiguous();
        let mut offset = 0;
        for (d, (&i, &size)) in index.iter().zip(self.dims()).enumerate() {
            if i >= size {
                return Err(Error::msg(format!(
                    "get: index {} out of bounds for dim {} of size {}",
                    i, d, size
                )));
            }
            offset += i * strides[d];
        }
        Ok(self.data[offset])
    }

    /// Apply `x * mul + add` element-wise.
    pub fn affine(&self, mul: f32, add: f32) -> Self {
        Tensor {
            data: self.data.iter().map(|&v| v * mul + add).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Smallest element, `None` for an empty tensor.
    pub fn min_value(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::min)
    }

    /// Largest element, `None` for an empty tensor.
    pub fn max_value(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::max)
    }

    /// Insert a size-1 dimension at `dim`.
    pub fn unsqueeze(&self, dim: usize) -> Result<Self> {
        if dim > self.rank() {
            return Err(Error::DimOutOfRange {
                dim,
                rank: self.rank() + 1,
            });
        }
        let mut dims = self.dims().to_vec();
        dims.insert(dim, 1);
        Ok(Tensor {
            data: self.data.clone(),
            shape: Shape::new(dims),
        })
    }

    /// Take `len` entries starting at `start` along `dim`.
    pub fn narrow(&self, dim: usize, start: usize, len: usize) -> Result<Self> {
        let rank = self.rank();
        if dim >= rank {
            return Err(Error::DimOutOfRange { dim, rank });
        }
        let dim_size = self.dims()[dim];
        if start + len > dim_size {
            return Err(Error::msg(format!(
                "narrow: start {} + len {} exceeds dim {} of size {}",
                start, len, dim, dim_size
            )));
        }
        let outer: usize = self.dims()[..dim].iter().product();
        let inner: usize = self.dims()[dim + 1..].iter().product();

        let mut data = Vec::with_capacity(outer * len * inner);
        for o in 0..outer {
            let base = (o * dim_size + start) * inner;
            data.extend_from_slice(&self.data[base..base + len * inner]);
        }

        let mut dims = self.dims().to_vec();
        dims[dim] = len;
        Ok(Tensor {
            data,
            shape: Shape::new(dims),
        })
    }

    /// Keep `self` where `mask` is 1 and `fill` where it is 0:
    /// `out = self * mask + fill * (1 - mask)`.
    ///
    /// `self` is `[C, H, W]`; `mask` is `[1, H, W]` and is broadcast over the
    /// channels.
    pub fn composite(&self, mask: &Tensor, fill: f32) -> Result<Self> {
        if self.rank() != 3 || mask.rank() != 3 || mask.dims()[0] != 1 {
            return Err(Error::msg(format!(
                "composite: expected [C, H, W] image and [1, H, W] mask, got {} and {}",
                self.shape, mask.shape
            )));
        }
        if self.dims()[1..] != mask.dims()[1..] {
            let mut expected = self.dims().to_vec();
            expected[0] = 1;
            return Err(Error::ShapeMismatch {
                expected: Shape::new(expected),
                got: mask.shape.clone(),
            });
        }
        let plane = mask.elem_count();
        let data = self
            .data
            .chunks(plane)
            .flat_map(|channel| {
                channel
                    .iter()
                    .zip(&mask.data)
                    .map(|(&x, &m)| x * m + fill * (1.0 - m))
            })
            .collect();
        Ok(Tensor {
            data,
            shape: self.shape.clone(),
        })
    }

    /// Concatenate tensors along a dimension.
    ///
    /// All tensors must have the same shape except in the concatenation dimension.
    pub fn cat(tensors: &[Self], dim: usize) -> Result<Self> {
        if tensors.is_empty() {
            bail!("cat: empty tensor list");
        }
        let first = &tensors[0];
        let rank = first.rank();
        if dim >= rank {
            return Err(Error::DimOutOfRange { dim, rank });
        }

        for (i, t) in tensors.iter().enumerate().skip(1) {
            if t.rank() != rank {
                return Err(Error::msg(format!(
                    "cat: tensor {} has rank {} but expected {}",
                    i,
                    t.rank(),
                    rank
                )));
            }
            for d in 0..rank {
                if d != dim && t.dims()[d] != first.dims()[d] {
                    return Err(Error::msg(format!(
                        "cat: tensor {} has size {} at dim {} but expected {}",
                        i,
                        t.dims()[d],
                        d,
                        first.dims()[d]
                    )));
                }
            }
        }

        let cat_size: usize = tensors.iter().map(|t| t.dims()[dim]).sum();
        let mut out_dims = first.dims().to_vec();
        out_dims[dim] = cat_size;
        let outer: usize = first.dims()[..dim].iter().product();
        let inner: usize = first.dims()[dim + 1..].iter().product();

        let mut data = Vec::with_capacity(outer * cat_size * inner);
        for o in 0..outer {
            for t in tensors {
                let chunk = t.dims()[dim] * inner;
                data.extend_from_slice(&t.data[o * chunk..(o + 1) * chunk]);
            }
        }

        Ok(Tensor {
            data,
            shape: Shape::new(out_dims),
        })
    }

    /// Stack tensors along a new dimension.
    ///
    /// All tensors must have the same shape. `stack([a, b], 0)` where a, b are
    /// `[3, H, W]` gives `[2, 3, H, W]`.
    pub fn stack(tensors: &[Self], dim: usize) -> Result<Self> {
        if tensors.is_empty() {
            bail!("stack: empty tensor list");
        }
        let first_shape = tensors[0].shape();
        for t in tensors.iter().skip(1) {
            if t.shape() != first_shape {
                return Err(Error::ShapeMismatch {
                    expected: first_shape.clone(),
                    got: t.shape().clone(),
                });
            }
        }
        if dim == 0 {
            let data = tensors.iter().flat_map(|t| t.data.iter().copied()).collect();
            return Ok(Tensor {
                data,
                shape: first_shape.with_leading(tensors.len()),
            });
        }
        let unsqueezed = tensors
            .iter()
            .map(|t| t.unsqueeze(dim))
            .collect::<Result<Vec<_>>>()?;
        Self::cat(&unsqueezed, dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(shape: impl Into<Shape>) -> Tensor {
        let shape = shape.into();
        let data = (0..shape.elem_count()).map(|v| v as f32).collect();
        Tensor::from_vec(data, shape).unwrap()
    }

    #[test]
    fn test_from_vec_checks_count() {
        let err = Tensor::from_vec(vec![1.0, 2.0, 3.0], (2, 2)).unwrap_err();
        assert!(matches!(err, Error::ElementCountMismatch { expected: 4, got: 3, .. }));
    }

    #[test]
    fn test_get_channel_first() {
        let t = seq((2, 3, 4));
        assert_eq!(t.get(&[1, 2, 3]).unwrap(), 23.0);
        assert_eq!(t.get(&[0, 1, 0]).unwrap(), 4.0);
        assert!(t.get(&[2, 0, 0]).is_err());
    }

    #[test]
    fn test_narrow_first_channel() {
        let t = seq((3, 2, 2));
        let c0 = t.narrow(0, 0, 1).unwrap();
        assert_eq!(c0.dims(), &[1, 2, 2]);
        assert_eq!(c0.as_slice(), &[0.0, 1.0, 2.0, 3.0]);
        let c12 = t.narrow(0, 1, 2).unwrap();
        assert_eq!(c12.as_slice()[0], 4.0);
        assert!(t.narrow(0, 2, 2).is_err());
    }

    #[test]
    fn test_cat_channels() {
        let a = Tensor::full((1, 2, 2), 1.0);
        let b = Tensor::full((3, 2, 2), 2.0);
        let c = Tensor::cat(&[a, b], 0).unwrap();
        assert_eq!(c.dims(), &[4, 2, 2]);
        assert_eq!(&c.as_slice()[..4], &[1.0; 4]);
        assert_eq!(&c.as_slice()[4..], &[2.0; 12]);
    }

    #[test]
    fn test_cat_inner_dim() {
        let a = seq((2, 1));
        let b = Tensor::full((2, 2), 9.0);
        let c = Tensor::cat(&[a, b], 1).unwrap();
        assert_eq!(c.as_slice(), &[0.0, 9.0, 9.0, 1.0, 9.0, 9.0]);
    }

    #[test]
    fn test_cat_rejects_mismatch() {
        let a = Tensor::zeros((1, 2, 2));
        let b = Tensor::zeros((1, 3, 2));
        assert!(Tensor::cat(&[a, b], 0).is_err());
    }

    #[test]
    fn test_stack_batch_axis() {
        let a = Tensor::full((1, 2, 2), 0.0);
        let b = Tensor::full((1, 2, 2), 1.0);
        let s = Tensor::stack(&[a, b], 0).unwrap();
        assert_eq!(s.dims(), &[2, 1, 2, 2]);
        assert_eq!(s.get(&[1, 0, 1, 1]).unwrap(), 1.0);
        assert_eq!(s.get(&[0, 0, 1, 1]).unwrap(), 0.0);
    }

    #[test]
    fn test_stack_inner_axis_matches_layout() {
        let a = seq((2, 3));
        let b = a.affine(1.0, 10.0);
        let s = Tensor::stack(&[a, b], 1).unwrap();
        assert_eq!(s.dims(), &[2, 2, 3]);
        assert_eq!(s.get(&[1, 1, 2]).unwrap(), 15.0);
        assert_eq!(s.get(&[1, 0, 2]).unwrap(), 5.0);
    }

    #[test]
    fn test_empty_lists_rejected() {
        assert!(matches!(Tensor::cat(&[], 0), Err(Error::Msg(_))));
        assert!(matches!(Tensor::stack(&[], 0), Err(Error::Msg(_))));
    }

    #[test]
    fn test_stack_rejects_different_shapes() {
        let a = Tensor::zeros((1, 2, 2));
        let b = Tensor::zeros((3, 2, 2));
        assert!(matches!(
            Tensor::stack(&[a, b], 0),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_composite_fill() {
        let img = Tensor::full((3, 1, 2), 0.25);
        let mask = Tensor::from_vec(vec![1.0, 0.0], (1, 1, 2)).unwrap();
        let white = img.composite(&mask, 1.0).unwrap();
        assert_eq!(white.as_slice(), &[0.25, 1.0, 0.25, 1.0, 0.25, 1.0]);
        let black = img.composite(&mask, -1.0).unwrap();
        assert_eq!(black.as_slice(), &[0.25, -1.0, 0.25, -1.0, 0.25, -1.0]);
    }

    #[test]
    fn test_affine() {
        let t = Tensor::from_vec(vec![0.0, 0.5, 1.0], 3).unwrap();
        assert_eq!(t.affine(2.0, -1.0).as_slice(), &[-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_min_max() {
        let t = Tensor::from_vec(vec![0.25, -1.0, 0.75, 1.0], (2, 2)).unwrap();
        assert_eq!(t.min_value(), Some(-1.0));
        assert_eq!(t.max_value(), Some(1.0));
        assert_eq!(Tensor::zeros((0, 3)).max_value(), None);
    }
}
