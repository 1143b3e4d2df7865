use std::{fs, path::Path};
use thiserror::Error;

use crate::{
    compression::{DecompressError, Decompressor},
    lcd::ModeOracle,
    vram::{TileTable, VideoMemory, VideoPort},
};

mod map;
pub use map::{AssetDefinition, AssetTarget, RomMap};

/// A ROM image holding compressed assets
#[derive(Debug, Clone)]
pub struct Rom {
    data: Vec<u8>,
    crc: u32,
}

#[derive(Error, Debug)]
pub enum RomError {
    #[error("Failed to read ROM file")]
    Read(#[from] std::io::Error),
    #[error("Failed to decompress asset {name}")]
    Decompress {
        name: String,
        #[source]
        source: DecompressError,
    },
    #[error("Asset {name} starts at {offset:#x}, past the end of the ROM ({len:#x} bytes)")]
    OffsetOutOfRange { name: String, offset: usize, len: usize },
}

/// Result of loading one asset
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub name: String,
    pub target: AssetTarget,
    /// decompressed size
    pub len: usize,
    /// compressed bytes consumed
    pub bytes_read: usize,
    /// decompressed bytes of [`AssetTarget::Buffer`] assets
    pub data: Option<Vec<u8>>,
}

impl Rom {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        Ok(Self::from_bytes(fs::read(path.as_ref())?))
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        let crc = crc32fast::hash(&data);
        Self { data, crc }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn crc(&self) -> u32 {
        self.crc
    }

    /// Decompress every asset of `map`. Tile assets are written through
    /// `port`, buffer assets are returned.
    ///
    /// Stops at the first failing asset; earlier assets stay in VRAM.
    pub fn load_assets<O: ModeOracle, M: VideoMemory>(
        &self,
        map: &RomMap,
        port: &mut VideoPort<O, M>,
    ) -> Result<Vec<LoadedAsset>, RomError> {
        map.assets
            .iter()
            .map(|asset| self.load_asset(asset, port))
            .collect()
    }

    pub fn load_asset<O: ModeOracle, M: VideoMemory>(
        &self,
        asset: &AssetDefinition,
        port: &mut VideoPort<O, M>,
    ) -> Result<LoadedAsset, RomError> {
        if asset.offset >= self.data.len() {
            return Err(RomError::OffsetOutOfRange {
                name: asset.name.clone(),
                offset: asset.offset,
                len: self.data.len(),
            });
        }

        let decompress_error = |source: DecompressError| RomError::Decompress {
            name: asset.name.clone(),
            source,
        };

        let mut decompressor = Decompressor::new(&self.data, asset.offset);

        let table = match asset.target {
            AssetTarget::Buffer => {
                let result = decompressor.decompress().map_err(decompress_error)?;
                log::info!(
                    "Decompressed {} ({} -> {} bytes)",
                    asset.name,
                    result.bytes_read,
                    result.data.len()
                );

                return Ok(LoadedAsset {
                    name: asset.name.clone(),
                    target: asset.target,
                    len: result.data.len(),
                    bytes_read: result.bytes_read,
                    data: Some(result.data),
                });
            }
            AssetTarget::Bkg | AssetTarget::Win => TileTable::Background(port.bg_addressing),
            AssetTarget::Sprite => TileTable::Sprite,
        };

        let len = port
            .drain_into(table, asset.first_tile, &mut decompressor)
            .map_err(decompress_error)?;

        log::info!(
            "Loaded {} into {:?} tiles from {} ({} -> {} bytes)",
            asset.name,
            asset.target,
            asset.first_tile,
            decompressor.bytes_read(),
            len
        );

        Ok(LoadedAsset {
            name: asset.name.clone(),
            target: asset.target,
            len,
            bytes_read: decompressor.bytes_read(),
            data: None,
        })
    }
}
