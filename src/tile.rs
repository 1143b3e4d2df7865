use crate::palette::{ColorIndex, Palette};
use image::{GenericImage, ImageResult, RgbaImage};

/// 8x8 pixels at 2 bits per pixel
pub const TILE_SIZE: usize = 16;

#[derive(Debug, Clone)]
pub struct Tile([ColorIndex; 64]);

#[derive(Debug, Clone)]
pub struct TileSet(Vec<Tile>);

impl TileSet {
    pub fn from_slice(data: &[u8]) -> Self {
        assert!(
            data.len() % TILE_SIZE == 0,
            "Tile data must be a multiple of 16 bytes"
        );

        let tiles = data.chunks_exact(TILE_SIZE).map(Tile::from_slice).collect();

        TileSet(tiles)
    }

    /// Like [`TileSet::from_slice`], but returns `None` for empty data or a
    /// trailing partial tile.
    pub fn try_from_slice(data: &[u8]) -> Option<Self> {
        if data.is_empty() || data.len() % TILE_SIZE != 0 {
            return None;
        }

        Some(Self::from_slice(data))
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lay all tiles out row by row, `columns` tiles wide.
    pub fn to_sheet(&self, columns: u32, palette: &Palette) -> ImageResult<RgbaImage> {
        let columns = columns.max(1);
        let rows = (self.0.len() as u32).div_ceil(columns).max(1);

        let mut image = RgbaImage::new(columns * 8, rows * 8);

        for (i, tile) in self.0.iter().enumerate() {
            let x = (i as u32 % columns) * 8;
            let y = (i as u32 / columns) * 8;

            image.copy_from(&tile.with_palette(palette), x, y)?;
        }

        Ok(image)
    }
}

impl Tile {
    pub fn data(&self) -> &[ColorIndex] {
        &self.0
    }

    pub fn from_slice(data: &[u8]) -> Self {
        assert!(data.len() == TILE_SIZE, "Tile data must be 16 bytes long");

        let mut tile = [ColorIndex::new(0); 64];

        for (row, planes) in data.chunks_exact(2).enumerate() {
            let (low, high) = (planes[0], planes[1]);

            for col in 0..8 {
                let shift = 7 - col;
                let color = ((high >> shift) & 1) << 1 | ((low >> shift) & 1);

                tile[row * 8 + col] = ColorIndex::new(color);
            }
        }

        Tile(tile)
    }

    pub fn with_palette(&self, palette: &Palette) -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| {
            let pixel_index = ((y * 8) + x) as usize;
            palette.get(self.0[pixel_index])
        })
    }
}
