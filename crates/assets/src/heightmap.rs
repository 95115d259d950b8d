use crate::AssetError;
use heightfield_common::GridSize;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How texture coordinates outside `[0, 1]` sample the heightmap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressMode {
    #[default]
    Clamp,
    MirrorRepeat,
}

impl fmt::Display for AddressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressMode::Clamp => f.write_str("clamp"),
            AddressMode::MirrorRepeat => f.write_str("mirror-repeat"),
        }
    }
}

impl FromStr for AddressMode {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(AddressMode::Clamp),
            "mirror-repeat" | "mirror" => Ok(AddressMode::MirrorRepeat),
            other => Err(AssetError::UnknownAddressMode(other.to_string())),
        }
    }
}

/// A decoded heightmap image.
///
/// Rows are stored bottom-up (the decoded image is flipped vertically) so
/// that texture coordinate `v = 0` samples the bottom row of the file. Pixels
/// are tightly packed RGBA8; the red channel carries the height.
#[derive(Debug, Clone)]
pub struct Heightmap {
    pixels: RgbaImage,
    size: GridSize,
}

/// Load and decode a heightmap image from disk.
pub fn load_heightmap(path: impl AsRef<Path>) -> Result<Heightmap, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let heightmap = Heightmap::from_image(image)?;
    tracing::info!(
        "loaded heightmap {} ({}x{})",
        path.display(),
        heightmap.width(),
        heightmap.height()
    );
    Ok(heightmap)
}

impl Heightmap {
    /// Wrap an already decoded image, flipping it and converting to RGBA8.
    pub fn from_image(image: DynamicImage) -> Result<Self, AssetError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(AssetError::EmptyImage { width, height });
        }
        let size = GridSize::new(width, height)?;
        let pixels = image.flipv().into_rgba8();
        Ok(Self { pixels, size })
    }

    pub fn width(&self) -> u32 {
        self.size.width()
    }

    pub fn height(&self) -> u32 {
        self.size.height()
    }

    /// Grid with one cell per pixel.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Raw RGBA8 bytes, `4 * width` bytes per row, bottom row first.
    pub fn rgba(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn bytes_per_row(&self) -> u32 {
        4 * self.width()
    }

    /// Height in `[0, 1]` at texel `(x, y)`, where `y = 0` is the bottom row.
    pub fn height_at(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.pixels.get_pixel(x, y).0[0] as f32 / 255.0)
    }

    /// Minimum and maximum height over all texels.
    pub fn height_range(&self) -> (f32, f32) {
        let (min, max) = self
            .pixels
            .pixels()
            .map(|p| p.0[0])
            .fold((u8::MAX, u8::MIN), |(lo, hi), r| (lo.min(r), hi.max(r)));
        (min as f32 / 255.0, max as f32 / 255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// Gray ramp where the top row of the file is 0 and each row below adds 10.
    fn ramp(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |_, y| Luma([(y * 10) as u8]))
    }

    #[test]
    fn from_image_flips_rows() {
        let map = Heightmap::from_image(DynamicImage::ImageLuma8(ramp(2, 3))).unwrap();
        // Bottom row of the file (value 20) becomes y = 0.
        assert_eq!(map.height_at(0, 0), Some(20.0 / 255.0));
        assert_eq!(map.height_at(1, 2), Some(0.0));
    }

    #[test]
    fn gray_expands_to_rgba() {
        let map = Heightmap::from_image(DynamicImage::ImageLuma8(ramp(4, 2))).unwrap();
        assert_eq!(map.rgba().len(), 4 * 2 * 4);
        assert_eq!(map.bytes_per_row(), 16);
        assert_eq!(&map.rgba()[..4], &[10, 10, 10, 255]);
    }

    #[test]
    fn size_is_pixel_dimensions() {
        let map = Heightmap::from_image(DynamicImage::ImageLuma8(ramp(5, 7))).unwrap();
        assert_eq!(map.size(), GridSize::new(5, 7).unwrap());
        assert_eq!((map.width(), map.height()), (5, 7));
    }

    #[test]
    fn empty_image_rejected() {
        let err = Heightmap::from_image(DynamicImage::new_rgba8(0, 4)).unwrap_err();
        assert!(matches!(err, AssetError::EmptyImage { width: 0, height: 4 }));
    }

    #[test]
    fn height_at_out_of_bounds() {
        let map = Heightmap::from_image(DynamicImage::ImageLuma8(ramp(2, 2))).unwrap();
        assert_eq!(map.height_at(2, 0), None);
        assert_eq!(map.height_at(0, 2), None);
    }

    #[test]
    fn height_range_spans_ramp() {
        let map = Heightmap::from_image(DynamicImage::ImageLuma8(ramp(3, 4))).unwrap();
        assert_eq!(map.height_range(), (0.0, 30.0 / 255.0));
    }

    #[test]
    fn load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.png");
        ramp(8, 4).save(&path).unwrap();

        let map = load_heightmap(&path).unwrap();
        assert_eq!((map.width(), map.height()), (8, 4));
        assert_eq!(map.height_at(0, 3), Some(0.0));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_heightmap(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(
            load_heightmap(&path),
            Err(AssetError::Decode { .. })
        ));
    }

    #[test]
    fn address_mode_parsing() {
        assert_eq!("clamp".parse::<AddressMode>().unwrap(), AddressMode::Clamp);
        assert_eq!(
            "Mirror-Repeat".parse::<AddressMode>().unwrap(),
            AddressMode::MirrorRepeat
        );
        assert!("wrap".parse::<AddressMode>().is_err());
        assert_eq!(AddressMode::MirrorRepeat.to_string(), "mirror-repeat");
    }

    #[test]
    fn address_mode_serde_names() {
        let mode: AddressMode = serde_json::from_str("\"mirror-repeat\"").unwrap();
        assert_eq!(mode, AddressMode::MirrorRepeat);
        assert_eq!(serde_json::to_string(&AddressMode::Clamp).unwrap(), "\"clamp\"");
    }
}
