//! # tryon-core
//!
//! Numeric primitives shared by the try-on data pipeline.
//!
//! This crate provides:
//! - [`Tensor`] — dense channel-first `f32` array with cat / stack / composite
//! - [`Shape`] — dimension sizes and contiguous strides
//! - [`Raster`] / [`PixelFormat`] — single-channel pixel buffers whose format
//!   (8-bit or unit float) is explicit and checked
//! - [`Error`] / [`Result`] — the error taxonomy used across the workspace

pub mod error;
pub mod raster;
pub mod shape;
pub mod tensor;

pub use error::{Error, Result};
pub use raster::{PixelFormat, Raster};
pub use shape::Shape;
pub use tensor::Tensor;
