use crate::palette::PaletteSpec;
use crate::vram::TileAddressing;
use serde::Deserialize;

use super::Rom;

/// Describes where GB-compressed assets live inside a ROM image
#[derive(Debug, Clone, Deserialize)]
pub struct RomMap {
    #[serde(default)]
    pub name: Option<String>,
    /// CRC-32 of the ROM this map was written for
    #[serde(default)]
    pub crc: Option<u32>,

    #[serde(default)]
    pub bg_addressing: TileAddressing,
    #[serde(default)]
    pub palette: PaletteSpec,

    #[serde(rename = "asset", default)]
    pub assets: Vec<AssetDefinition>,
}

impl RomMap {
    pub fn parse(map: &str) -> Result<RomMap, toml::de::Error> {
        toml::de::from_str(map)
    }

    /// Maps without a CRC are assumed to fit any ROM.
    pub fn is_compatible_with(&self, rom: &Rom) -> bool {
        self.crc.map_or(true, |crc| crc == rom.crc())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetDefinition {
    pub name: String,
    pub offset: usize,
    pub target: AssetTarget,

    #[serde(default)]
    pub first_tile: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetTarget {
    Buffer,
    #[serde(alias = "background")]
    Bkg,
    #[serde(alias = "window")]
    Win,
    Sprite,
}
