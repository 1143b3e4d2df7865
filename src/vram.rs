use crate::compression::{DecompressError, Decompressor};
use crate::lcd::ModeOracle;
use crate::tile::TILE_SIZE;
use serde::Deserialize;

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_SIZE: usize = 0x2000;

/// Tile pattern memory spans 0x8000-0x97ff
pub const TILE_DATA_LEN: usize = 0x1800;

const SIGNED_BASE: u16 = 0x9000;
const SIGNED_HIGH_BASE: u16 = 0x8800;

/// Memory the timed writer delivers bytes to.
pub trait VideoMemory {
    fn write(&mut self, addr: u16, value: u8);
}

impl<T: VideoMemory + ?Sized> VideoMemory for &mut T {
    fn write(&mut self, addr: u16, value: u8) {
        (**self).write(addr, value)
    }
}

/// 8 KiB of emulated VRAM mapped at 0x8000
#[derive(Clone)]
pub struct Vram(Box<[u8; VRAM_SIZE]>);

impl Default for Vram {
    fn default() -> Self {
        Self(Box::new([0; VRAM_SIZE]))
    }
}

impl Vram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, addr: u16) -> Option<u8> {
        let index = addr.checked_sub(VRAM_START)? as usize;
        self.0.get(index).copied()
    }

    /// The three tile blocks at 0x8000, 0x8800 and 0x9000 (384 tiles)
    pub fn tile_data(&self) -> &[u8] {
        &self.0[..TILE_DATA_LEN]
    }

    pub fn tile(&self, table: TileTable, index: u8) -> &[u8] {
        let start = (table.tile_address(index) - VRAM_START) as usize;
        &self.0[start..start + TILE_SIZE]
    }
}

impl VideoMemory for Vram {
    fn write(&mut self, addr: u16, value: u8) {
        match addr
            .checked_sub(VRAM_START)
            .and_then(|index| self.0.get_mut(index as usize))
        {
            Some(byte) => *byte = value,
            None => log::warn!("Ignoring write outside of VRAM at {:#06x}", addr),
        }
    }
}

/// LCDC bit 4: where background and window tiles are fetched from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileAddressing {
    /// tiles 0-255 at 0x8000, shared with sprites
    Unsigned,
    /// tiles 0-127 at 0x9000, tiles 128-255 at 0x8800
    #[default]
    Signed,
}

impl TileAddressing {
    pub const fn from_lcdc(lcdc: u8) -> Self {
        if lcdc & 0x10 != 0 {
            Self::Unsigned
        } else {
            Self::Signed
        }
    }
}

/// Tile pattern table a write targets. Background and window share one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileTable {
    Background(TileAddressing),
    Sprite,
}

impl TileTable {
    pub const fn tile_address(self, index: u8) -> u16 {
        let index = index as u16;
        let size = TILE_SIZE as u16;

        match self {
            Self::Sprite | Self::Background(TileAddressing::Unsigned) => VRAM_START + index * size,
            Self::Background(TileAddressing::Signed) => {
                if index < 0x80 {
                    SIGNED_BASE + index * size
                } else {
                    SIGNED_HIGH_BASE + (index - 0x80) * size
                }
            }
        }
    }
}

/// Delivers decoded bytes to a tile table, waiting for a writable mode
/// before every single byte.
pub struct TimedWriter<'a, O: ModeOracle, M: VideoMemory> {
    oracle: &'a mut O,
    memory: &'a mut M,
    table: TileTable,

    tile: u8,
    /// offset inside the current tile
    offset: usize,
    written: usize,
}

impl<'a, O: ModeOracle, M: VideoMemory> TimedWriter<'a, O, M> {
    pub fn new(oracle: &'a mut O, memory: &'a mut M, table: TileTable, first_tile: u8) -> Self {
        Self {
            oracle,
            memory,
            table,
            tile: first_tile,
            offset: 0,
            written: 0,
        }
    }

    /// Address the next byte will be written to
    pub fn address(&self) -> u16 {
        self.table.tile_address(self.tile) + self.offset as u16
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Spin until the controller leaves modes 2 and 3, then write `value`.
    ///
    /// The tile index wraps from 255 back to 0, so data running past the
    /// last tile of a table continues at the start of that table rather than
    /// at the next linear address.
    pub fn write(&mut self, value: u8) {
        while !self.oracle.current_mode().allows_vram_access() {
            std::hint::spin_loop();
        }

        let addr = self.address();
        self.memory.write(addr, value);

        self.written += 1;
        self.offset += 1;
        if self.offset == TILE_SIZE {
            self.offset = 0;
            self.tile = self.tile.wrapping_add(1);
        }
    }

    /// Pull every byte out of `decompressor`. Errors stop the loop before
    /// the next write; whatever was written stays.
    pub fn drain(&mut self, decompressor: &mut Decompressor) -> Result<usize, DecompressError> {
        while let Some(value) = decompressor.decode_next()? {
            self.write(value);
        }

        Ok(self.written)
    }
}

/// The video hardware the tile entry points write through.
pub struct VideoPort<O: ModeOracle, M: VideoMemory> {
    pub oracle: O,
    pub memory: M,
    /// addressing used by the background and window layers
    pub bg_addressing: TileAddressing,
}

impl<O: ModeOracle, M: VideoMemory> VideoPort<O, M> {
    pub fn new(oracle: O, memory: M, bg_addressing: TileAddressing) -> Self {
        Self {
            oracle,
            memory,
            bg_addressing,
        }
    }

    /// Decompress background tiles starting at `first_tile`, avoiding
    /// writes during modes 2 and 3. Returns the number of bytes written.
    pub fn decompress_bkg_data(&mut self, first_tile: u8, src: &[u8]) -> Result<usize, DecompressError> {
        self.decompress_to(TileTable::Background(self.bg_addressing), first_tile, src)
    }

    /// Same as [`VideoPort::decompress_bkg_data`]: window and background
    /// layers share their tile pattern data.
    pub fn decompress_win_data(&mut self, first_tile: u8, src: &[u8]) -> Result<usize, DecompressError> {
        self.decompress_bkg_data(first_tile, src)
    }

    /// Decompress sprite tiles starting at `first_tile`, avoiding writes
    /// during modes 2 and 3.
    pub fn decompress_sprite_data(&mut self, first_tile: u8, src: &[u8]) -> Result<usize, DecompressError> {
        self.decompress_to(TileTable::Sprite, first_tile, src)
    }

    pub fn decompress_to(&mut self, table: TileTable, first_tile: u8, src: &[u8]) -> Result<usize, DecompressError> {
        let mut decompressor = Decompressor::new(src, 0);
        self.drain_into(table, first_tile, &mut decompressor)
    }

    /// Like [`VideoPort::decompress_to`] but with a decoder positioned by the
    /// caller, e.g. inside a ROM image.
    pub fn drain_into(
        &mut self,
        table: TileTable,
        first_tile: u8,
        decompressor: &mut Decompressor,
    ) -> Result<usize, DecompressError> {
        let mut writer = TimedWriter::new(&mut self.oracle, &mut self.memory, table, first_tile);
        let written = writer.drain(decompressor)?;

        log::debug!(
            "Wrote {} bytes ({} tiles) to {:?} starting at tile {}",
            written,
            written.div_ceil(TILE_SIZE),
            table,
            first_tile
        );

        Ok(written)
    }
}
