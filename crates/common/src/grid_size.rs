use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vertices emitted per grid cell.
pub const VERTICES_PER_CELL: u64 = 4;
/// Indices emitted per grid cell (two triangles).
pub const INDICES_PER_CELL: u64 = 6;

/// Errors from constructing or parsing a grid size.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("grid {width}x{height} needs {vertices} vertices, more than u32 indices can address")]
    TooLarge {
        width: u32,
        height: u32,
        vertices: u64,
    },
    #[error("invalid grid size {0:?}, expected WIDTHxHEIGHT or N")]
    Parse(String),
}

/// Width and height of a terrain grid, in cells.
///
/// Usually taken from the pixel dimensions of the heightmap, one cell per
/// pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGridSize", into = "RawGridSize")]
pub struct GridSize {
    width: u32,
    height: u32,
}

#[derive(Serialize, Deserialize)]
struct RawGridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension { width, height });
        }
        let vertices = width as u64 * height as u64 * VERTICES_PER_CELL;
        if vertices > u32::MAX as u64 {
            return Err(GridError::TooLarge {
                width,
                height,
                vertices,
            });
        }
        Ok(Self { width, height })
    }

    /// Square grid of `n` x `n` cells.
    pub fn square(n: u32) -> Result<Self, GridError> {
        Self::new(n, n)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of vertices in the unwelded tessellation (four per cell).
    pub fn vertex_count(&self) -> usize {
        self.cell_count() * VERTICES_PER_CELL as usize
    }

    /// Number of triangle-list indices (six per cell).
    pub fn index_count(&self) -> usize {
        self.cell_count() * INDICES_PER_CELL as usize
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for GridSize {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| GridError::Parse(s.to_string()))
        };
        match s.split_once(['x', 'X']) {
            Some((w, h)) => Self::new(parse(w)?, parse(h)?),
            None => Self::square(parse(s)?),
        }
    }
}

impl TryFrom<RawGridSize> for GridSize {
    type Error = GridError;

    fn try_from(raw: RawGridSize) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height)
    }
}

impl From<GridSize> for RawGridSize {
    fn from(size: GridSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_cell_count() {
        let size = GridSize::new(3, 2).unwrap();
        assert_eq!(size.cell_count(), 6);
        assert_eq!(size.vertex_count(), 24);
        assert_eq!(size.index_count(), 36);
    }

    #[test]
    fn zero_dimension_rejected() {
        assert_eq!(
            GridSize::new(0, 4),
            Err(GridError::ZeroDimension {
                width: 0,
                height: 4
            })
        );
        assert!(GridSize::new(4, 0).is_err());
    }

    #[test]
    fn vertex_count_must_fit_u32() {
        // 32768 * 32768 * 4 == 2^32, one past u32::MAX.
        assert!(matches!(
            GridSize::square(32768),
            Err(GridError::TooLarge { .. })
        ));
        assert!(GridSize::new(32768, 32767).is_ok());
    }

    #[test]
    fn parse_width_by_height() {
        let size: GridSize = "512x256".parse().unwrap();
        assert_eq!((size.width(), size.height()), (512, 256));

        let size: GridSize = " 8 X 4 ".parse().unwrap();
        assert_eq!((size.width(), size.height()), (8, 4));
    }

    #[test]
    fn parse_single_number_is_square() {
        let size: GridSize = "256".parse().unwrap();
        assert_eq!(size, GridSize::square(256).unwrap());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!("axb".parse::<GridSize>(), Err(GridError::Parse(_))));
        assert!(matches!("".parse::<GridSize>(), Err(GridError::Parse(_))));
        assert!(matches!(
            "0x3".parse::<GridSize>(),
            Err(GridError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn display_matches_parse_format() {
        let size = GridSize::new(7, 9).unwrap();
        assert_eq!(size.to_string(), "7x9");
        assert_eq!(size.to_string().parse::<GridSize>().unwrap(), size);
    }
}
