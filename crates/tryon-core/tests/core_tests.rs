// Tests for tryon-core: Tensor assembly and Raster conversions as the sample
// builder chains them.

use image::{GrayImage, Luma};
use tryon_core::{Error, PixelFormat, Raster, Tensor};

#[test]
fn test_agnostic_style_concatenation() {
    let (h, w) = (4, 3);
    let shape = Tensor::full((1, h, w), -1.0);
    let head = Tensor::full((3, h, w), 0.5);
    let pose = Tensor::zeros((18, h, w));

    let agnostic = Tensor::cat(&[shape, head, pose], 0).unwrap();
    assert_eq!(agnostic.dims(), &[22, h, w]);
    assert_eq!(agnostic.get(&[0, 3, 2]).unwrap(), -1.0);
    assert_eq!(agnostic.get(&[3, 0, 0]).unwrap(), 0.5);
    assert_eq!(agnostic.get(&[21, 3, 2]).unwrap(), 0.0);
}

#[test]
fn test_silhouette_smoothing_chain() {
    // 32x32 silhouette: left half on.
    let (w, h) = (32u32, 32u32);
    let mask = (0..h).flat_map(|_| (0..w).map(|x| x < 16));
    let unit = Raster::from_mask(w, h, mask).unwrap();
    let gray = unit.to_gray8().unwrap();
    let smooth = gray
        .resize_bilinear(w / 16, h / 16)
        .unwrap()
        .resize_bilinear(w, h)
        .unwrap()
        .to_unit()
        .unwrap();
    assert_eq!(smooth.format(), PixelFormat::Unit);

    let t = smooth.to_tensor().unwrap().affine(2.0, -1.0);
    assert_eq!(t.dims(), &[1, 32, 32]);
    for &v in t.as_slice() {
        assert!((-1.0..=1.0).contains(&v));
    }
    // far left stays bright, far right stays dark
    assert!(t.get(&[0, 16, 0]).unwrap() > 0.0);
    assert!(t.get(&[0, 16, 31]).unwrap() < 0.0);
}

#[test]
fn test_unit_raster_cannot_be_resampled() {
    let unit = Raster::from_unit(2, 2, vec![0.0; 4]).unwrap();
    let err = unit.resize_bilinear(1, 1).unwrap_err();
    assert!(matches!(err, Error::PixelFormat { .. }));
}

#[test]
fn test_gray8_threshold_to_tensor() {
    let img = GrayImage::from_fn(3, 1, |x, _| Luma([[10u8, 128, 200][x as usize]]));
    let t = Raster::from_gray8(img)
        .threshold(128)
        .unwrap()
        .to_tensor()
        .unwrap();
    assert_eq!(t.as_slice(), &[0.0, 1.0, 1.0]);
}
