// Raster — single-channel pixel buffer with an explicit pixel format
//
// Masks move between two representations while a sample is assembled:
//
//   Gray8  — 8-bit intensities, what gets drawn on, resampled and thresholded
//   Unit   — f32 values in [0, 1], what gets turned into a tensor
//
// Each operation states which format it accepts. Handing it the other one is
// an `Error::PixelFormat`; conversions happen only through `to_gray8` and
// `to_unit`.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Storage format of a [`Raster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit grayscale, 0..=255.
    Gray8,
    /// 32-bit float, nominally in [0, 1].
    Unit,
}

#[derive(Debug, Clone, PartialEq)]
enum Pixels {
    Gray8(GrayImage),
    Unit(Vec<f32>),
}

/// A single-channel H×W pixel buffer tagged with its [`PixelFormat`].
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Pixels,
}

impl Raster {
    /// Wrap an 8-bit grayscale image.
    pub fn from_gray8(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Raster {
            width,
            height,
            pixels: Pixels::Gray8(image),
        }
    }

    /// A black 8-bit canvas.
    pub fn blank_gray8(width: u32, height: u32) -> Self {
        Self::from_gray8(GrayImage::new(width, height))
    }

    /// Wrap row-major float values.
    pub fn from_unit(width: u32, height: u32, values: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(Error::msg(format!(
                "raster: {}x{} needs {} values, got {}",
                width,
                height,
                expected,
                values.len()
            )));
        }
        Ok(Raster {
            width,
            height,
            pixels: Pixels::Unit(values),
        })
    }

    /// Build a {0, 1} raster from a boolean mask.
    pub fn from_mask<I>(width: u32, height: u32, mask: I) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        let values = mask
            .into_iter()
            .map(|on| if on { 1.0 } else { 0.0 })
            .collect();
        Self::from_unit(width, height, values)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        match self.pixels {
            Pixels::Gray8(_) => PixelFormat::Gray8,
            Pixels::Unit(_) => PixelFormat::Unit,
        }
    }

    /// Borrow the 8-bit image.
    pub fn as_gray8(&self) -> Result<&GrayImage> {
        match &self.pixels {
            Pixels::Gray8(img) => Ok(img),
            Pixels::Unit(_) => Err(self.expected(PixelFormat::Gray8)),
        }
    }

    /// Borrow the float values.
    pub fn as_unit(&self) -> Result<&[f32]> {
        match &self.pixels {
            Pixels::Unit(v) => Ok(v),
            Pixels::Gray8(_) => Err(self.expected(PixelFormat::Unit)),
        }
    }

    /// Unit → Gray8: scale by 255, saturate, truncate.
    pub fn to_gray8(&self) -> Result<Raster> {
        let values = self.as_unit()?;
        let bytes = values
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
            .collect();
        let img = GrayImage::from_raw(self.width, self.height, bytes)
            .ok_or_else(|| Error::msg("raster: buffer size does not match dimensions"))?;
        Ok(Raster::from_gray8(img))
    }

    /// Gray8 → Unit: divide by 255.
    pub fn to_unit(&self) -> Result<Raster> {
        let img = self.as_gray8()?;
        let values = img.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        Raster::from_unit(self.width, self.height, values)
    }

    /// Gray8 → Unit {0, 1}: pixels `>= level` become 1.
    pub fn threshold(&self, level: u8) -> Result<Raster> {
        let img = self.as_gray8()?;
        Raster::from_mask(
            self.width,
            self.height,
            img.as_raw().iter().map(|&v| v >= level),
        )
    }

    /// Resample a Gray8 raster with a triangle (bilinear) filter. When
    /// shrinking, the filter support widens with the scale factor so every
    /// source pixel contributes.
    pub fn resize_bilinear(&self, width: u32, height: u32) -> Result<Raster> {
        let img = self.as_gray8()?;
        if width == 0 || height == 0 {
            return Err(Error::msg(format!(
                "raster: cannot resize to {}x{}",
                width, height
            )));
        }
        Ok(Raster::from_gray8(imageops::resize(
            img,
            width,
            height,
            FilterType::Triangle,
        )))
    }

    /// Fill the inclusive rectangle `[x0, x1] × [y0, y1]` on a Gray8 raster,
    /// clipped to the canvas.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, value: u8) -> Result<()> {
        let (w, h) = (self.width as i64, self.height as i64);
        let img = match &mut self.pixels {
            Pixels::Gray8(img) => img,
            Pixels::Unit(_) => {
                return Err(Error::PixelFormat {
                    expected: PixelFormat::Gray8,
                    got: PixelFormat::Unit,
                })
            }
        };
        let (cx0, cx1) = (x0.max(0), x1.min(w - 1));
        let (cy0, cy1) = (y0.max(0), y1.min(h - 1));
        if cx0 > cx1 || cy0 > cy1 {
            return Ok(());
        }
        for y in cy0..=cy1 {
            for x in cx0..=cx1 {
                img.put_pixel(x as u32, y as u32, Luma([value]));
            }
        }
        Ok(())
    }

    /// Unit raster as a `[1, H, W]` tensor.
    pub fn to_tensor(&self) -> Result<Tensor> {
        let values = self.as_unit()?;
        Tensor::from_vec(
            values.to_vec(),
            (1, self.height as usize, self.width as usize),
        )
    }

    fn expected(&self, expected: PixelFormat) -> Error {
        Error::PixelFormat {
            expected,
            got: self.format(),
        }
    }
}
