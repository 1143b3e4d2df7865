mod compression;
pub use compression::{decompress_into, DecompressError, Decompressed, Decompressor, Token};

pub mod lcd;
pub use lcd::{LcdMode, ModeOracle, SimulatedLcd};

pub mod vram;
pub use vram::{TileAddressing, TileTable, TimedWriter, VideoMemory, VideoPort, Vram};

mod palette;
pub use palette::{ColorIndex, Palette, PaletteSpec, DMG_SHADES, GRAYSCALE, GRAYSCALE_SHADES};

mod tile;
pub use tile::{Tile, TileSet, TILE_SIZE};

mod rom;
pub use rom::{AssetDefinition, AssetTarget, LoadedAsset, Rom, RomError, RomMap};
