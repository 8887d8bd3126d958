// Segmentation labels — per-pixel body-part IDs and the regions derived from them
//
// The human-parsing rasters store one label ID per pixel (usually as a
// paletted PNG). Three binary regions are cut from them:
//
//   shape   — every non-background pixel (ID > 0)
//   head    — IDs {1, 2, 4, 13}: hat, hair, sunglasses, face
//   garment — IDs {5, 6, 7}:     upper clothes, dress, coat
//
// Rather than comparing every pixel against each ID in turn, the IDs are
// folded once into a 256-entry table of `LabelClass`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tryon_core::{Error, Raster, Result};

/// Label IDs belonging to the head region.
pub const HEAD_LABELS: [u8; 4] = [1, 2, 4, 13];
/// Label IDs belonging to the upper-body garment region.
pub const GARMENT_LABELS: [u8; 3] = [5, 6, 7];

/// Region a label ID falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelClass {
    Background,
    Head,
    Garment,
    /// Foreground that is neither head nor garment (arms, legs, skirt, ...).
    Other,
}

impl LabelClass {
    /// Part of the body silhouette.
    pub fn is_foreground(self) -> bool {
        self != LabelClass::Background
    }
}

/// Lookup from label ID to [`LabelClass`].
#[derive(Debug, Clone)]
pub struct LabelTable {
    classes: [LabelClass; 256],
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelTable {
    /// Table built from [`HEAD_LABELS`] and [`GARMENT_LABELS`]; ID 0 is
    /// background, every other ID is `Other`.
    pub fn new() -> Self {
        let mut classes = [LabelClass::Other; 256];
        classes[0] = LabelClass::Background;
        for &id in &HEAD_LABELS {
            classes[id as usize] = LabelClass::Head;
        }
        for &id in &GARMENT_LABELS {
            classes[id as usize] = LabelClass::Garment;
        }
        Self { classes }
    }

    #[inline]
    pub fn classify(&self, label: u8) -> LabelClass {
        self.classes[label as usize]
    }
}

/// A decoded label raster: raw IDs, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u8>,
}

impl LabelMap {
    pub fn new(width: u32, height: u32, labels: Vec<u8>) -> Result<Self> {
        if labels.len() != width as usize * height as usize {
            return Err(Error::msg(format!(
                "label map: {}x{} needs {} labels, got {}",
                width,
                height,
                width as usize * height as usize,
                labels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            labels,
        })
    }

    /// Read a label PNG from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::from_io(path, e))?;
        Self::decode(BufReader::new(file)).map_err(|reason| Error::malformed(path, reason))
    }

    /// Decode a label PNG without palette expansion: for indexed images the
    /// palette indices themselves are the labels. Only 8-bit indexed or
    /// 8-bit grayscale images are accepted.
    pub fn decode<R: Read>(reader: R) -> std::result::Result<Self, String> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::IDENTITY);
        let mut reader = decoder.read_info().map_err(|e| e.to_string())?;
        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).map_err(|e| e.to_string())?;

        match (info.color_type, info.bit_depth) {
            (png::ColorType::Indexed, png::BitDepth::Eight)
            | (png::ColorType::Grayscale, png::BitDepth::Eight) => {}
            (ct, bd) => {
                return Err(format!(
                    "label raster must be 8-bit indexed or grayscale, got {:?} {:?}",
                    ct, bd
                ))
            }
        }

        buf.truncate(info.buffer_size());
        Self::new(info.width, info.height, buf).map_err(|e| e.to_string())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// {0, 1} raster of the pixels whose class satisfies `pred`.
    pub fn region<F>(&self, table: &LabelTable, pred: F) -> Result<Raster>
    where
        F: Fn(LabelClass) -> bool,
    {
        Raster::from_mask(
            self.width,
            self.height,
            self.labels.iter().map(|&l| pred(table.classify(l))),
        )
    }

    /// Body silhouette: any label > 0.
    pub fn shape_mask(&self, table: &LabelTable) -> Result<Raster> {
        self.region(table, LabelClass::is_foreground)
    }

    pub fn head_mask(&self, table: &LabelTable) -> Result<Raster> {
        self.region(table, |c| c == LabelClass::Head)
    }

    pub fn garment_mask(&self, table: &LabelTable) -> Result<Raster> {
        self.region(table, |c| c == LabelClass::Garment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut enc = png::Encoder::new(&mut out, width, height);
            enc.set_color(color);
            enc.set_depth(png::BitDepth::Eight);
            if color == png::ColorType::Indexed {
                enc.set_palette((0..=255u8).flat_map(|v| [v, 255 - v, v / 2]).collect::<Vec<_>>());
            }
            let mut writer = enc.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn test_table_classes() {
        let t = LabelTable::new();
        assert_eq!(t.classify(0), LabelClass::Background);
        for id in [1, 2, 4, 13] {
            assert_eq!(t.classify(id), LabelClass::Head);
        }
        for id in [5, 6, 7] {
            assert_eq!(t.classify(id), LabelClass::Garment);
        }
        for id in [3, 8, 9, 12, 14, 19, 255] {
            assert_eq!(t.classify(id), LabelClass::Other);
        }
    }

    #[test]
    fn test_regions() {
        let map = LabelMap::new(4, 1, vec![0, 1, 5, 9]).unwrap();
        let t = LabelTable::new();
        assert_eq!(
            map.shape_mask(&t).unwrap().as_unit().unwrap(),
            &[0.0, 1.0, 1.0, 1.0]
        );
        assert_eq!(
            map.head_mask(&t).unwrap().as_unit().unwrap(),
            &[0.0, 1.0, 0.0, 0.0]
        );
        assert_eq!(
            map.garment_mask(&t).unwrap().as_unit().unwrap(),
            &[0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_decode_indexed_keeps_indices() {
        let bytes = encode_png(3, 1, png::ColorType::Indexed, &[13, 6, 0]);
        let map = LabelMap::decode(bytes.as_slice()).unwrap();
        assert_eq!((map.width(), map.height()), (3, 1));
        assert_eq!(map.labels(), &[13, 6, 0]);
    }

    #[test]
    fn test_decode_grayscale() {
        let bytes = encode_png(2, 2, png::ColorType::Grayscale, &[0, 1, 2, 5]);
        let map = LabelMap::decode(bytes.as_slice()).unwrap();
        assert_eq!(map.labels(), &[0, 1, 2, 5]);
    }

    #[test]
    fn test_decode_rejects_rgb() {
        let bytes = encode_png(1, 1, png::ColorType::Rgb, &[1, 2, 3]);
        assert!(LabelMap::decode(bytes.as_slice()).is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let err = LabelMap::open("/nonexistent/parse/x.png").unwrap_err();
        assert!(matches!(err, Error::AssetNotFound { .. }));
    }
}
