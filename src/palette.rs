use image::Rgba;
use serde::{
    de::{self, Visitor},
    Deserialize,
};

/// 2bpp color index, 0 being the lightest shade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorIndex(u8);

impl ColorIndex {
    pub const fn new(index: u8) -> Self {
        assert!(index < 4, "ColorIndex must be less than 4");

        ColorIndex(index)
    }

    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

/// Four shades, indexed by [`ColorIndex`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette([Rgba<u8>; 4]);

pub const GRAYSCALE_SHADES: [Rgba<u8>; 4] = [
    Rgba([0xff, 0xff, 0xff, 0xff]),
    Rgba([0xaa, 0xaa, 0xaa, 0xff]),
    Rgba([0x55, 0x55, 0x55, 0xff]),
    Rgba([0x00, 0x00, 0x00, 0xff]),
];

pub const DMG_SHADES: [Rgba<u8>; 4] = [
    Rgba([0x9b, 0xbc, 0x0f, 0xff]),
    Rgba([0x8b, 0xac, 0x0f, 0xff]),
    Rgba([0x30, 0x62, 0x30, 0xff]),
    Rgba([0x0f, 0x38, 0x0f, 0xff]),
];

/// Identity BGP value: color n maps to shade n
pub const IDENTITY_BGP: u8 = 0b11_10_01_00;

pub const GRAYSCALE: Palette = Palette(GRAYSCALE_SHADES);

impl Default for Palette {
    fn default() -> Self {
        GRAYSCALE
    }
}

impl Palette {
    pub const fn new(colors: [Rgba<u8>; 4]) -> Self {
        Palette(colors)
    }

    /// Build the palette a BGP/OBP register value selects from `shades`.
    pub fn from_bgp(bgp: u8, shades: &[Rgba<u8>; 4]) -> Self {
        let mut colors = [Rgba([0, 0, 0, 0]); 4];
        for (i, color) in colors.iter_mut().enumerate() {
            let shade = (bgp >> (i * 2)) & 0x03;
            *color = shades[shade as usize];
        }
        Palette(colors)
    }

    pub const fn get(&self, index: ColorIndex) -> Rgba<u8> {
        self.0[index.0 as usize]
    }
}

/// Palette as written in a ROM map: a preset name or a raw BGP value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSpec {
    pub shades: [Rgba<u8>; 4],
    pub bgp: u8,
}

impl Default for PaletteSpec {
    fn default() -> Self {
        Self {
            shades: GRAYSCALE_SHADES,
            bgp: IDENTITY_BGP,
        }
    }
}

impl PaletteSpec {
    pub fn palette(&self) -> Palette {
        Palette::from_bgp(self.bgp, &self.shades)
    }
}

impl<'de> Deserialize<'de> for PaletteSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(PaletteSpecVisitor)
    }
}

struct PaletteSpecVisitor;

impl<'de> Visitor<'de> for PaletteSpecVisitor {
    type Value = PaletteSpec;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("\"grayscale\", \"dmg\" or a BGP register value")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let shades = match value {
            "grayscale" | "gray" => GRAYSCALE_SHADES,
            "dmg" => DMG_SHADES,
            other => return Err(de::Error::unknown_variant(other, &["grayscale", "dmg"])),
        };

        Ok(PaletteSpec {
            shades,
            bgp: IDENTITY_BGP,
        })
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let bgp = u8::try_from(value).map_err(|_| de::Error::custom(format!("BGP value {} does not fit into a byte", value)))?;

        Ok(PaletteSpec {
            shades: GRAYSCALE_SHADES,
            bgp,
        })
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let value = i64::try_from(value).map_err(de::Error::custom)?;
        self.visit_i64(value)
    }
}
